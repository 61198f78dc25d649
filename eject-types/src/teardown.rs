// SPDX-License-Identifier: GPL-3.0-only

//! Teardown actions issued against the device service

use std::fmt;

use serde::Serialize;

use crate::{BlockDeviceId, DriveId, DriveInfo};

/// Whether teardown issues mutating calls or only records them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TeardownMode {
    #[default]
    Execute,
    DryRun,
}

/// One mutating call of a teardown, in issue order
///
/// Every step carries the name shown to the operator: the device node for
/// block devices, [`DriveInfo::display_name`] for the drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum TeardownStep {
    Unmount { block: BlockDeviceId, device: String },
    Lock { block: BlockDeviceId, device: String },
    Eject { drive: DriveId, name: String },
    PowerOff { drive: DriveId, name: String },
}

impl TeardownStep {
    /// Final step for `drive`: eject removable media, power off otherwise.
    pub fn detach(drive: &DriveInfo) -> Self {
        let (drive_id, name) = (drive.id.clone(), drive.display_name());
        if drive.media_removable {
            TeardownStep::Eject {
                drive: drive_id,
                name,
            }
        } else {
            TeardownStep::PowerOff {
                drive: drive_id,
                name,
            }
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            TeardownStep::Unmount { .. } => "unmount",
            TeardownStep::Lock { .. } => "lock",
            TeardownStep::Eject { .. } => "eject",
            TeardownStep::PowerOff { .. } => "power off",
        }
    }

    /// Device node or drive name the step targets
    pub fn target(&self) -> &str {
        match self {
            TeardownStep::Unmount { device, .. } | TeardownStep::Lock { device, .. } => device,
            TeardownStep::Eject { name, .. } | TeardownStep::PowerOff { name, .. } => name,
        }
    }
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb(), self.target())
    }
}
