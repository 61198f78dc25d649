// SPDX-License-Identifier: GPL-3.0-only

//! Point-in-time directory of all block devices

use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::{BlockDevice, BlockDeviceId, DriveId};

/// Immutable map from block device id to its properties, ordered by object path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockDeviceSnapshot {
    devices: BTreeMap<BlockDeviceId, BlockDevice>,
}

impl BlockDeviceSnapshot {
    pub fn get(&self, id: &BlockDeviceId) -> Option<&BlockDevice> {
        self.devices.get(id)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, BlockDeviceId, BlockDevice> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Devices whose owning drive is `drive`
    pub fn on_drive<'a>(
        &'a self,
        drive: &'a DriveId,
    ) -> impl Iterator<Item = (&'a BlockDeviceId, &'a BlockDevice)> + 'a {
        self.devices
            .iter()
            .filter(move |(_, block)| block.drive.as_ref() == Some(drive))
    }
}

impl FromIterator<(BlockDeviceId, BlockDevice)> for BlockDeviceSnapshot {
    fn from_iter<T: IntoIterator<Item = (BlockDeviceId, BlockDevice)>>(iter: T) -> Self {
        Self {
            devices: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BlockDeviceSnapshot {
    type Item = (&'a BlockDeviceId, &'a BlockDevice);
    type IntoIter = btree_map::Iter<'a, BlockDeviceId, BlockDevice>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}
