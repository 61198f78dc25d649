// SPDX-License-Identifier: GPL-3.0-only

//! Error types for path resolution and drive teardown

use std::path::PathBuf;

use eject_types::TeardownStep;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EjectError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("D-Bus error: {0}")]
    DBusError(String),

    #[error("Could not find a drive for {}", .0.display())]
    DriveNotFound(PathBuf),

    #[error("{drive} is not removable, refusing to eject it")]
    NotRemovable { drive: String },

    #[error("Inconsistent device state: {0}")]
    Inconsistent(String),

    #[error("Failed to {step}: {message}")]
    ActionFailed { step: TeardownStep, message: String },
}

impl EjectError {
    /// Process exit code for this error: 2 for a refused drive, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            EjectError::NotRemovable { .. } => 2,
            _ => 1,
        }
    }

    /// Whether the service rejected the call because something still uses the device.
    pub fn is_device_busy(&self) -> bool {
        let msg = match self {
            EjectError::DBusError(msg) | EjectError::ActionFailed { message: msg, .. } => msg,
            _ => return false,
        };
        msg.contains("DeviceBusy")
            || msg.contains("Device or resource busy")
            || msg.contains("target is busy")
    }

    /// Service error text without our own prefix.
    pub(crate) fn into_message(self) -> String {
        match self {
            EjectError::DBusError(msg) => msg,
            other => other.to_string(),
        }
    }
}

impl From<zbus::Error> for EjectError {
    fn from(err: zbus::Error) -> Self {
        EjectError::DBusError(err.to_string())
    }
}

impl From<zbus::fdo::Error> for EjectError {
    fn from(err: zbus::fdo::Error) -> Self {
        EjectError::DBusError(err.to_string())
    }
}

impl From<zbus::zvariant::Error> for EjectError {
    fn from(err: zbus::zvariant::Error) -> Self {
        EjectError::DBusError(err.to_string())
    }
}

/// Only for `udisks2` property reads. `udisks2::Error` drops the service
/// message, so mutating calls keep the `zbus::Error` instead.
impl From<udisks2::Error> for EjectError {
    fn from(err: udisks2::Error) -> Self {
        EjectError::DBusError(err.to_string())
    }
}
