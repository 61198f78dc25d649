// SPDX-License-Identifier: GPL-3.0-only

//! In-memory [`DeviceBackend`] that records mutating calls.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use eject_types::{
    BlockDevice, BlockDeviceId, BlockDeviceSnapshot, DriveId, DriveInfo, EncryptedView,
    FilesystemView,
};
use futures::future::BoxFuture;
use zbus::Message;

use crate::backend::DeviceBackend;
use crate::error::EjectError;

pub(crate) fn block_id(name: &str) -> BlockDeviceId {
    BlockDeviceId::new(format!("/org/freedesktop/UDisks2/block_devices/{name}"))
}

pub(crate) fn drive_id(name: &str) -> DriveId {
    DriveId::new(format!("/org/freedesktop/UDisks2/drives/{name}"))
}

pub(crate) fn drive(name: &str, removable: bool, media_removable: bool) -> DriveInfo {
    DriveInfo {
        id: drive_id(name),
        vendor: String::new(),
        model: name.replace('_', " "),
        removable,
        media_removable,
    }
}

/// The error zbus returns when the service answers a call with an error reply.
pub(crate) fn method_error(name: &str, detail: &str) -> zbus::Error {
    let call = Message::method_call("/org/freedesktop/UDisks2/block_devices/sdb1", "Unmount")
        .unwrap()
        .build(&())
        .unwrap();
    let reply = Message::error(&call.header(), name)
        .unwrap()
        .build(&detail)
        .unwrap();
    zbus::Error::from(reply)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Call {
    Unmount(BlockDeviceId),
    Lock(BlockDeviceId),
    Eject(DriveId),
    PowerOff(DriveId),
}

#[derive(Default)]
struct State {
    blocks: BTreeMap<BlockDeviceId, BlockDevice>,
    drives: HashMap<DriveId, DriveInfo>,
    calls: Vec<Call>,
    failures: HashMap<Call, zbus::Error>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub(crate) fn with_block(self, id: BlockDeviceId, block: BlockDevice) -> Self {
        self.state.lock().unwrap().blocks.insert(id, block);
        self
    }

    pub(crate) fn with_drive(self, drive: DriveInfo) -> Self {
        self.state
            .lock()
            .unwrap()
            .drives
            .insert(drive.id.clone(), drive);
        self
    }

    /// Make `call` fail with a service error reply.
    pub(crate) fn fail(&self, call: Call, name: &str, detail: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(call, method_error(name, detail));
    }

    pub(crate) fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.state.lock().unwrap().calls)
    }

    pub(crate) fn current(&self, id: &BlockDeviceId) -> Option<BlockDevice> {
        self.state.lock().unwrap().blocks.get(id).cloned()
    }

    fn record(&self, call: Call) -> Result<(), EjectError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.clone());
        if let Some(err) = state.failures.get(&call) {
            return Err(err.clone().into());
        }

        match &call {
            Call::Unmount(id) => {
                if let Some(block) = state.blocks.get_mut(id) {
                    *block = block.clone().with_filesystem(FilesystemView::default());
                }
            }
            Call::Lock(id) => {
                let cleartext = state
                    .blocks
                    .get(id)
                    .and_then(|b| b.encrypted())
                    .and_then(|e| e.cleartext_device.clone());
                if let Some(cleartext) = cleartext {
                    state.blocks.remove(&cleartext);
                }
                if let Some(block) = state.blocks.get_mut(id) {
                    *block = block.clone().with_encrypted(EncryptedView::default());
                }
            }
            Call::Eject(_) | Call::PowerOff(_) => {}
        }
        Ok(())
    }
}

impl DeviceBackend for FakeBackend {
    fn block_devices(&self) -> BoxFuture<'_, Result<BlockDeviceSnapshot, EjectError>> {
        let snapshot: BlockDeviceSnapshot =
            self.state.lock().unwrap().blocks.clone().into_iter().collect();
        Box::pin(async move { Ok(snapshot) })
    }

    fn block_device(
        &self,
        id: BlockDeviceId,
    ) -> BoxFuture<'_, Result<Option<BlockDevice>, EjectError>> {
        let block = self.current(&id);
        Box::pin(async move { Ok(block) })
    }

    fn drive(&self, id: DriveId) -> BoxFuture<'_, Result<DriveInfo, EjectError>> {
        let res = self
            .state
            .lock()
            .unwrap()
            .drives
            .get(&id)
            .cloned()
            .ok_or_else(|| EjectError::DBusError(format!("No such object: {id}")));
        Box::pin(async move { res })
    }

    fn unmount(&self, id: BlockDeviceId) -> BoxFuture<'_, Result<(), EjectError>> {
        let res = self.record(Call::Unmount(id));
        Box::pin(async move { res })
    }

    fn lock(&self, id: BlockDeviceId) -> BoxFuture<'_, Result<(), EjectError>> {
        let res = self.record(Call::Lock(id));
        Box::pin(async move { res })
    }

    fn eject(&self, id: DriveId) -> BoxFuture<'_, Result<(), EjectError>> {
        let res = self.record(Call::Eject(id));
        Box::pin(async move { res })
    }

    fn power_off(&self, id: DriveId) -> BoxFuture<'_, Result<(), EjectError>> {
        let res = self.record(Call::PowerOff(id));
        Box::pin(async move { res })
    }
}
