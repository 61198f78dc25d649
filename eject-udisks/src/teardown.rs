// SPDX-License-Identifier: GPL-3.0-only

//! Unmount, lock, then eject or power off a drive.

use eject_types::{BlockDeviceId, DriveInfo, TeardownMode, TeardownStep};
use tracing::{debug, info, warn};

use crate::backend::DeviceBackend;
use crate::error::EjectError;

/// Tear down `devices` in the given order, then detach `drive`.
///
/// Each device is re-read from the service right before it is handled:
/// mounted filesystems are unmounted, unlocked containers are locked, and
/// anything already unmounted/locked (or gone) is skipped. The drive is
/// ejected if its media is removable and powered off otherwise.
///
/// The first service error stops the sequence; earlier steps are not undone.
/// The caller must have checked that the drive is removable.
pub async fn teardown<B: DeviceBackend + ?Sized>(
    backend: &B,
    drive: &DriveInfo,
    devices: &[BlockDeviceId],
    mode: TeardownMode,
) -> Result<Vec<TeardownStep>, EjectError> {
    let mut steps = Vec::new();

    for id in devices {
        let Some(block) = backend.block_device(id.clone()).await? else {
            debug!(block = %id, "block device is gone, skipping");
            continue;
        };
        let device = block.display_name(id);

        if let Some(fs) = block.filesystem() {
            if fs.is_mounted() {
                let step = TeardownStep::Unmount {
                    block: id.clone(),
                    device: device.clone(),
                };
                run_step(backend, step, mode, &mut steps).await?;
            } else {
                debug!(%device, "filesystem not mounted");
            }
        }

        if let Some(encrypted) = block.encrypted() {
            if encrypted.is_unlocked() {
                let step = TeardownStep::Lock {
                    block: id.clone(),
                    device,
                };
                run_step(backend, step, mode, &mut steps).await?;
            } else {
                debug!(%device, "encrypted device already locked");
            }
        }
    }

    run_step(backend, TeardownStep::detach(drive), mode, &mut steps).await?;

    Ok(steps)
}

async fn run_step<B: DeviceBackend + ?Sized>(
    backend: &B,
    step: TeardownStep,
    mode: TeardownMode,
    steps: &mut Vec<TeardownStep>,
) -> Result<(), EjectError> {
    if mode == TeardownMode::DryRun {
        debug!(%step, "dry run, not issuing call");
        steps.push(step);
        return Ok(());
    }

    info!(%step, "issuing teardown call");
    let result = match &step {
        TeardownStep::Unmount { block, .. } => backend.unmount(block.clone()).await,
        TeardownStep::Lock { block, .. } => backend.lock(block.clone()).await,
        TeardownStep::Eject { drive, .. } => backend.eject(drive.clone()).await,
        TeardownStep::PowerOff { drive, .. } => backend.power_off(drive.clone()).await,
    };

    if let Err(err) = result {
        if err.is_device_busy() {
            warn!(
                "{} is busy. Close any applications using it and try again.",
                step.target()
            );
        }
        return Err(EjectError::ActionFailed {
            step,
            message: err.into_message(),
        });
    }

    steps.push(step);
    Ok(())
}
