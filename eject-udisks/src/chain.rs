// SPDX-License-Identifier: GPL-3.0-only

//! Walk crypto backing links: up from a block device to its drive, and down
//! from a drive to every block device that depends on it.

use std::collections::HashSet;

use eject_types::{BlockDeviceId, BlockDeviceSnapshot, DriveId};
use tracing::debug;

use crate::backend::DeviceBackend;
use crate::error::EjectError;

/// Follow `CryptoBackingDevice` from `start` until an unencrypted device and
/// return its drive.
///
/// Each hop re-reads the live object rather than a snapshot. Returns `None`
/// when the chain ends at a device without a drive (loop devices) or a
/// device along it disappeared; a chain that revisits a device is an error.
pub async fn find_drive<B: DeviceBackend + ?Sized>(
    backend: &B,
    start: &BlockDeviceId,
) -> Result<Option<DriveId>, EjectError> {
    let mut visited = HashSet::new();
    let mut current = start.clone();

    loop {
        if !visited.insert(current.clone()) {
            return Err(EjectError::Inconsistent(format!(
                "crypto backing devices of {start} loop back to {current}"
            )));
        }

        let Some(block) = backend.block_device(current.clone()).await? else {
            debug!(block = %current, "block device disappeared while looking for its drive");
            return Ok(None);
        };

        match block.crypto_backing_device {
            Some(backing) => {
                debug!(block = %current, backing = %backing, "following crypto backing device");
                current = backing;
            }
            None => {
                debug!(block = %current, drive = ?block.drive, "reached backing block device");
                return Ok(block.drive);
            }
        }
    }
}

/// Every block device of `drive`, including cleartext devices stacked on
/// them at any depth, in teardown order (innermost first).
pub fn find_dependents(snapshot: &BlockDeviceSnapshot, drive: &DriveId) -> Vec<BlockDeviceId> {
    let mut found: Vec<BlockDeviceId> = snapshot.on_drive(drive).map(|(id, _)| id.clone()).collect();
    let mut members: HashSet<BlockDeviceId> = found.iter().cloned().collect();

    // Repeat until a full scan adds nothing; the snapshot is not sorted by
    // nesting depth.
    loop {
        let mut grew = false;
        for (id, block) in snapshot {
            if members.contains(id) {
                continue;
            }
            if let Some(backing) = &block.crypto_backing_device
                && members.contains(backing)
            {
                debug!(block = %id, backing = %backing, "found dependent cleartext device");
                members.insert(id.clone());
                found.push(id.clone());
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }

    found.reverse();
    debug!(drive = %drive, devices = ?found, "dependent block devices");
    found
}
