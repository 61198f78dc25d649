// SPDX-License-Identifier: GPL-3.0-only

//! Drive information needed to decide between eject and power off

use crate::DriveId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveInfo {
    /// UDisks2 drive object path
    pub id: DriveId,

    /// Vendor/manufacturer name
    pub vendor: String,

    /// Drive model name
    pub model: String,

    /// Whether the drive itself can be detached (USB sticks, card readers, ...)
    pub removable: bool,

    /// Whether the media can be taken out of the drive (optical discs, SD cards)
    pub media_removable: bool,
}

impl DriveInfo {
    /// Human-readable name for operator messages
    pub fn display_name(&self) -> String {
        match (self.vendor.trim(), self.model.trim()) {
            ("", "") => self.id.short_name().to_string(),
            ("", model) => model.to_string(),
            (vendor, "") => format!("{vendor} Drive"),
            (vendor, model) => format!("{vendor} {model}"),
        }
    }
}
