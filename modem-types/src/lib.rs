// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for the modem watcher.
//!
//! These types carry the attributes the watcher reads from a managed modem
//! object. The D-Bus layer (`modem-dbus`) produces them and the watcher
//! binary consumes them; neither side depends on the other's representation.

mod modem;

pub use modem::{ModemInfo, ModemState, modem_index};
