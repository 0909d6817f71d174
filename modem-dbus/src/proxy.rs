// SPDX-License-Identifier: GPL-3.0-only

//! zbus proxy definitions for the bus daemon and the ModemManager object model.

use std::collections::HashMap;

use zbus::zvariant::{self, OwnedValue};
use zbus_macros::proxy;

/// Well-known bus name owned by the ModemManager daemon.
pub const MODEM_MANAGER_SERVICE: &str = "org.freedesktop.ModemManager1";

/// Root object carrying `org.freedesktop.DBus.ObjectManager`.
pub const MODEM_MANAGER_PATH: &str = "/org/freedesktop/ModemManager1";

/// Interface exported by every managed modem object.
pub const MODEM_INTERFACE: &str = "org.freedesktop.ModemManager1.Modem";

#[proxy(
    default_service = "org.freedesktop.DBus",
    default_path = "/org/freedesktop/DBus",
    interface = "org.freedesktop.DBus"
)]
pub trait BusDaemon {
    fn name_has_owner(&self, name: &str) -> zbus::Result<bool>;

    /// `new_owner` is the empty string when the name lost its owner.
    #[zbus(signal)]
    fn name_owner_changed(
        &self,
        name: String,
        old_owner: String,
        new_owner: String,
    ) -> zbus::Result<()>;
}

#[proxy(
    default_service = "org.freedesktop.ModemManager1",
    default_path = "/org/freedesktop/ModemManager1",
    interface = "org.freedesktop.DBus.ObjectManager"
)]
pub trait ModemObjectManager {
    fn get_managed_objects(
        &self,
    ) -> zbus::Result<
        HashMap<zvariant::OwnedObjectPath, HashMap<String, HashMap<String, OwnedValue>>>,
    >;

    #[zbus(signal)]
    fn interfaces_added(
        &self,
        object_path: zvariant::OwnedObjectPath,
        interfaces_and_properties: HashMap<String, HashMap<String, OwnedValue>>,
    ) -> zbus::Result<()>;

    #[zbus(signal)]
    fn interfaces_removed(
        &self,
        object_path: zvariant::OwnedObjectPath,
        interfaces: Vec<String>,
    ) -> zbus::Result<()>;
}

#[proxy(
    default_service = "org.freedesktop.ModemManager1",
    interface = "org.freedesktop.ModemManager1.Modem",
    assume_defaults = true
)]
pub trait Modem {
    #[zbus(property)]
    fn manufacturer(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn model(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn equipment_identifier(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn state(&self) -> zbus::Result<i32>;
}
