// SPDX-License-Identifier: GPL-3.0-only

//! The whole eject operation: path -> block device -> drive -> teardown.

use std::path::PathBuf;

use eject_types::{BlockDeviceId, DriveInfo, TeardownMode, TeardownStep};
use tracing::debug;

use crate::backend::DeviceBackend;
use crate::chain::{find_dependents, find_drive};
use crate::error::EjectError;
use crate::resolve::resolve;
use crate::teardown::teardown;

#[derive(Debug, Clone)]
pub struct EjectRequest {
    /// Device node, mount point, or a path inside a mount point
    pub path: PathBuf,

    /// Also match `path` against mount points (not just device nodes)
    pub search_mount_points: bool,

    pub mode: TeardownMode,
}

#[derive(Debug, Clone)]
pub struct EjectReport {
    /// Block device `path` resolved to
    pub block: BlockDeviceId,

    pub drive: DriveInfo,

    /// Steps issued (or planned, in dry-run mode), in order
    pub steps: Vec<TeardownStep>,
}

pub async fn eject<B: DeviceBackend + ?Sized>(
    backend: &B,
    request: &EjectRequest,
) -> Result<EjectReport, EjectError> {
    let snapshot = backend.block_devices().await?;

    let block = resolve(&snapshot, &request.path, request.search_mount_points)?
        .ok_or_else(|| EjectError::DriveNotFound(request.path.clone()))?;

    let drive_id = find_drive(backend, &block)
        .await?
        .ok_or_else(|| EjectError::DriveNotFound(request.path.clone()))?;

    let drive = backend.drive(drive_id).await?;
    debug!(
        drive = %drive.id,
        removable = drive.removable,
        media_removable = drive.media_removable,
        "found drive"
    );

    if !drive.removable {
        return Err(EjectError::NotRemovable {
            drive: drive.display_name(),
        });
    }

    let devices = find_dependents(&snapshot, &drive.id);
    let steps = teardown(backend, &drive, &devices, request.mode).await?;

    Ok(EjectReport {
        block,
        drive,
        steps,
    })
}
