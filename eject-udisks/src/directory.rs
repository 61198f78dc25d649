// SPDX-License-Identifier: GPL-3.0-only

//! Block device directory: decodes UDisks2 managed objects into a
//! [`BlockDeviceSnapshot`].

use std::path::PathBuf;

use eject_types::{
    BlockDevice, BlockDeviceId, BlockDeviceSnapshot, DriveId, EncryptedView, FilesystemView,
};
use tracing::trace;

use crate::dbus::bytestring as bs;
use crate::dbus::property;
use crate::manager::{InterfaceMap, ManagedObjects};

pub const UDISKS2_SERVICE: &str = "org.freedesktop.UDisks2";
pub const BLOCK_DEVICES_PREFIX: &str = "/org/freedesktop/UDisks2/block_devices/";

pub const BLOCK_IFACE: &str = "org.freedesktop.UDisks2.Block";
pub const FILESYSTEM_IFACE: &str = "org.freedesktop.UDisks2.Filesystem";
pub const ENCRYPTED_IFACE: &str = "org.freedesktop.UDisks2.Encrypted";
pub const DRIVE_IFACE: &str = "org.freedesktop.UDisks2.Drive";

/// Build a block device record from one object's interfaces.
///
/// Returns `None` when the object does not implement the Block interface.
/// Filesystem and Encrypted views are present exactly when the object
/// implements those interfaces.
pub fn block_device_from_interfaces(interfaces: &InterfaceMap) -> Option<BlockDevice> {
    let block = interfaces.get(BLOCK_IFACE)?;

    let device = property::bytes(block, "Device")
        .map(|raw| bs::decode_c_string_bytes(&raw))
        .filter(|dev| !dev.is_empty())
        .map(PathBuf::from);

    let mut record = BlockDevice::new(device);

    if let Some(drive) = property::object_path(block, "Drive")
        .as_deref()
        .and_then(DriveId::from_reference)
    {
        record = record.with_drive(drive);
    }

    if let Some(backing) = property::object_path(block, "CryptoBackingDevice")
        .as_deref()
        .and_then(BlockDeviceId::from_reference)
    {
        record = record.with_crypto_backing_device(backing);
    }

    if let Some(fs) = interfaces.get(FILESYSTEM_IFACE) {
        let mount_points = property::byte_strings(fs, "MountPoints")
            .map(bs::decode_mount_points)
            .unwrap_or_default()
            .into_iter()
            .map(PathBuf::from)
            .collect();
        record = record.with_filesystem(FilesystemView { mount_points });
    }

    if let Some(encrypted) = interfaces.get(ENCRYPTED_IFACE) {
        let cleartext_device = property::object_path(encrypted, "CleartextDevice")
            .as_deref()
            .and_then(BlockDeviceId::from_reference);
        record = record.with_encrypted(EncryptedView { cleartext_device });
    }

    Some(record)
}

/// Keep the objects under the block device namespace and decode them.
pub fn snapshot_from_managed_objects(objects: &ManagedObjects) -> BlockDeviceSnapshot {
    objects
        .iter()
        .filter(|(path, _)| path.as_str().starts_with(BLOCK_DEVICES_PREFIX))
        .filter_map(|(path, interfaces)| {
            let record = block_device_from_interfaces(interfaces)?;
            trace!(block = path.as_str(), ?record, "decoded block device");
            Some((BlockDeviceId::new(path.as_str()), record))
        })
        .collect()
}
