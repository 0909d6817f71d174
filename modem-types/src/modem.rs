// SPDX-License-Identifier: GPL-3.0-only

//! Modem data models

use serde::{Deserialize, Serialize};

/// Modem lifecycle state as reported by ModemManager.
///
/// Wire representation is the `State` property of the Modem interface, a
/// signed 32-bit value with `-1` reserved for failed devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModemState {
    Failed,
    #[default]
    Unknown,
    Initializing,
    Locked,
    Disabled,
    Disabling,
    Enabling,
    Enabled,
    Searching,
    Registered,
    Disconnecting,
    Connecting,
    Connected,
}

impl ModemState {
    /// Map the raw D-Bus property value; values this crate does not know
    /// about collapse to `Unknown`.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => Self::Failed,
            1 => Self::Initializing,
            2 => Self::Locked,
            3 => Self::Disabled,
            4 => Self::Disabling,
            5 => Self::Enabling,
            6 => Self::Enabled,
            7 => Self::Searching,
            8 => Self::Registered,
            9 => Self::Disconnecting,
            10 => Self::Connecting,
            11 => Self::Connected,
            _ => Self::Unknown,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::Failed => -1,
            Self::Unknown => 0,
            Self::Initializing => 1,
            Self::Locked => 2,
            Self::Disabled => 3,
            Self::Disabling => 4,
            Self::Enabling => 5,
            Self::Enabled => 6,
            Self::Searching => 7,
            Self::Registered => 8,
            Self::Disconnecting => 9,
            Self::Connecting => 10,
            Self::Connected => 11,
        }
    }

    pub fn is_failed(self) -> bool {
        self == Self::Failed
    }
}

/// Snapshot of a managed modem object's queryable attributes.
///
/// The remote object itself stays owned by ModemManager; this is what the
/// watcher captured at event time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModemInfo {
    /// Object path of the modem (e.g., "/org/freedesktop/ModemManager1/Modem/0")
    pub path: String,

    /// Manufacturer name
    pub manufacturer: String,

    /// Model name
    pub model: String,

    /// Equipment identifier (IMEI/ESN)
    pub equipment_id: String,

    /// Lifecycle state at event time
    pub state: ModemState,
}

impl ModemInfo {
    /// The modem index, i.e. the trailing component of the object path.
    pub fn index(&self) -> &str {
        modem_index(&self.path)
    }
}

/// Trailing component of a modem object path. ModemManager numbers modems
/// `.../Modem/<n>`; a path without separators is returned unchanged.
pub fn modem_index(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
