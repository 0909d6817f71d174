//! Error types for the modem-dbus layer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Zbus Error")]
    ZbusError(#[from] zbus::Error),
}
