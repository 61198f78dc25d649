// SPDX-License-Identifier: GPL-3.0-only

//! Block device record with optional filesystem / encryption capabilities

use std::path::{Path, PathBuf};

use crate::{BlockDeviceId, DriveId};

/// Filesystem capability of a block device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilesystemView {
    /// Current mount points, in the order UDisks2 reports them
    pub mount_points: Vec<PathBuf>,
}

impl FilesystemView {
    pub fn is_mounted(&self) -> bool {
        !self.mount_points.is_empty()
    }
}

/// Encrypted-container capability of a block device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptedView {
    /// Unlocked cleartext device, `None` while locked
    pub cleartext_device: Option<BlockDeviceId>,
}

impl EncryptedView {
    pub fn is_unlocked(&self) -> bool {
        self.cleartext_device.is_some()
    }
}

/// Point-in-time properties of one block device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockDevice {
    /// Raw device node (e.g. "/dev/sdb1")
    pub device: Option<PathBuf>,

    /// Owning drive; `None` for derived devices such as unlocked cleartext volumes
    pub drive: Option<DriveId>,

    /// Encrypted device this one is the cleartext of
    pub crypto_backing_device: Option<BlockDeviceId>,

    pub(crate) filesystem: Option<FilesystemView>,
    pub(crate) encrypted: Option<EncryptedView>,
}

impl BlockDevice {
    pub fn new(device: Option<PathBuf>) -> Self {
        Self {
            device,
            ..Default::default()
        }
    }

    pub fn with_drive(mut self, drive: DriveId) -> Self {
        self.drive = Some(drive);
        self
    }

    pub fn with_crypto_backing_device(mut self, backing: BlockDeviceId) -> Self {
        self.crypto_backing_device = Some(backing);
        self
    }

    pub fn with_filesystem(mut self, filesystem: FilesystemView) -> Self {
        self.filesystem = Some(filesystem);
        self
    }

    pub fn with_encrypted(mut self, encrypted: EncryptedView) -> Self {
        self.encrypted = Some(encrypted);
        self
    }

    /// Filesystem view if the device exposes the filesystem interface.
    pub fn filesystem(&self) -> Option<&FilesystemView> {
        self.filesystem.as_ref()
    }

    /// Encrypted view if the device is a crypto container.
    pub fn encrypted(&self) -> Option<&EncryptedView> {
        self.encrypted.as_ref()
    }

    /// Mount points of the filesystem, empty when there is none.
    pub fn mount_points(&self) -> &[PathBuf] {
        self.filesystem
            .as_ref()
            .map(|fs| fs.mount_points.as_slice())
            .unwrap_or_default()
    }

    pub fn device_path(&self) -> Option<&Path> {
        self.device.as_deref()
    }

    /// Device node for messages, falling back to the object id.
    pub fn display_name(&self, id: &BlockDeviceId) -> String {
        match &self.device {
            Some(device) => device.display().to_string(),
            None => id.short_name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_views_are_absent_by_default() {
        let block = BlockDevice::new(Some(PathBuf::from("/dev/sdb")));
        assert!(block.filesystem().is_none());
        assert!(block.encrypted().is_none());
        assert!(block.mount_points().is_empty());
    }

    #[test]
    fn filesystem_view_tracks_mount_state() {
        let unmounted = BlockDevice::new(None).with_filesystem(FilesystemView::default());
        assert_eq!(unmounted.filesystem().map(FilesystemView::is_mounted), Some(false));

        let mounted = BlockDevice::new(None).with_filesystem(FilesystemView {
            mount_points: vec![PathBuf::from("/media/usb1")],
        });
        assert_eq!(mounted.filesystem().map(FilesystemView::is_mounted), Some(true));
        assert_eq!(mounted.mount_points(), &[PathBuf::from("/media/usb1")]);
    }

    #[test]
    fn display_name_falls_back_to_object_name() {
        let id = BlockDeviceId::new("/org/freedesktop/UDisks2/block_devices/dm_2d0");
        assert_eq!(BlockDevice::new(None).display_name(&id), "dm_2d0");
        assert_eq!(
            BlockDevice::new(Some(PathBuf::from("/dev/dm-0"))).display_name(&id),
            "/dev/dm-0"
        );
    }
}
