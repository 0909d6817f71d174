// SPDX-License-Identifier: GPL-3.0-only

//! D-Bus client layer for watching ModemManager.
//!
//! Connects to the system bus, follows the availability of the
//! `org.freedesktop.ModemManager1` name, and turns the daemon's
//! object-manager signals into a single [`WatchEventStream`] consumed by the
//! watcher binary. Presence transitions run through the explicit
//! [`PresenceTracker`] state machine so that add/remove signal subscriptions
//! exist exactly while the daemon owns its name.

// Error types
pub mod error;

pub mod manager;
pub mod presence;
mod proxy;

// Re-export modem-types models (canonical domain models)
pub use modem_types;

pub use error::WatchError;
pub use manager::{ModemManagerClient, WatchEvent, WatchEventStream};
pub use presence::{Action, Availability, PresenceTracker};
pub use proxy::{MODEM_INTERFACE, MODEM_MANAGER_PATH, MODEM_MANAGER_SERVICE};
