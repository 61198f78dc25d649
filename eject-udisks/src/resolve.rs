// SPDX-License-Identifier: GPL-3.0-only

//! Resolve a device node, mount point, or path inside a mount point to the
//! block device backing it.

use std::fs;
use std::path::{Component, Path, PathBuf};

use eject_types::{BlockDeviceId, BlockDeviceSnapshot};
use tracing::debug;

use crate::error::EjectError;

/// Resolve symlinks in `path`, tolerating paths that do not exist.
///
/// The path is made absolute and normalized lexically first. If it does not
/// exist, the deepest existing ancestor is canonicalized and the remaining
/// components are appended unchanged.
pub fn canonicalize_best_effort(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    let normalized: PathBuf = absolute
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if let Ok(real) = fs::canonicalize(&normalized) {
        return real;
    }

    let mut missing = Vec::new();
    let mut current = normalized.as_path();
    while let Some(parent) = current.parent() {
        // `..` below a missing directory cannot be resolved without it.
        let Some(name) = current.file_name() else {
            return normalized;
        };
        missing.push(name.to_os_string());
        if let Ok(real) = fs::canonicalize(parent) {
            return missing.iter().rev().fold(real, |acc, name| acc.join(name));
        }
        current = parent;
    }

    normalized
}

/// Find the block device for `path`.
///
/// An exact device node match always wins. Otherwise, with
/// `search_mount_points`, the device whose mount point is the deepest
/// ancestor of (or equal to) the path is returned. Mount points are
/// canonicalized the same way as the path before comparing.
pub fn resolve(
    snapshot: &BlockDeviceSnapshot,
    path: &Path,
    search_mount_points: bool,
) -> Result<Option<BlockDeviceId>, EjectError> {
    let canonical = canonicalize_best_effort(path);
    debug!(
        path = %path.display(),
        canonical = %canonical.display(),
        search_mount_points,
        "resolving path"
    );
    resolve_canonical(snapshot, &canonical, search_mount_points)
}

/// [`resolve`] for a path that is already canonical.
pub fn resolve_canonical(
    snapshot: &BlockDeviceSnapshot,
    canonical: &Path,
    search_mount_points: bool,
) -> Result<Option<BlockDeviceId>, EjectError> {
    if let Some(id) = by_device_node(snapshot, canonical)? {
        debug!(block = %id, "matched device node");
        return Ok(Some(id));
    }

    if !search_mount_points {
        debug!("no device node match, mount point search disabled");
        return Ok(None);
    }

    let found = by_mount_point(snapshot, canonical)?;
    match &found {
        Some(id) => debug!(block = %id, "matched by mount point"),
        None => debug!("no mount point contains the path"),
    }
    Ok(found)
}

fn by_device_node(
    snapshot: &BlockDeviceSnapshot,
    path: &Path,
) -> Result<Option<BlockDeviceId>, EjectError> {
    let mut matches = snapshot
        .iter()
        .filter(|(_, block)| block.device_path() == Some(path))
        .map(|(id, _)| id);

    let Some(first) = matches.next() else {
        return Ok(None);
    };
    if let Some(second) = matches.next() {
        return Err(EjectError::Inconsistent(format!(
            "{} is the device node of both {first} and {second}",
            path.display()
        )));
    }
    Ok(Some(first.clone()))
}

fn by_mount_point(
    snapshot: &BlockDeviceSnapshot,
    path: &Path,
) -> Result<Option<BlockDeviceId>, EjectError> {
    // Deepest containing mount point so far, and another device tied with it.
    let mut best: Option<(usize, &BlockDeviceId, PathBuf)> = None;
    let mut conflict: Option<&BlockDeviceId> = None;

    for (id, block) in snapshot {
        for reported in block.mount_points() {
            let mount_point = canonicalize_best_effort(reported);
            // Component-wise: "/mnt/foo" does not contain "/mnt/foo2".
            if !path.starts_with(&mount_point) {
                continue;
            }
            let depth = mount_point.components().count();
            let leader = best.as_ref().map(|(d, leader_id, _)| (*d, *leader_id));
            match leader {
                Some((best_depth, _)) if depth < best_depth => {}
                Some((best_depth, best_id)) if depth == best_depth => {
                    if best_id != id {
                        conflict = Some(id);
                    }
                }
                _ => {
                    best = Some((depth, id, mount_point));
                    conflict = None;
                }
            }
        }
    }

    match (best, conflict) {
        (Some((_, id, mount_point)), Some(other)) => Err(EjectError::Inconsistent(format!(
            "{} is mounted from both {id} and {other}",
            mount_point.display()
        ))),
        (Some((_, id, _)), None) => Ok(Some(id.clone())),
        (None, _) => Ok(None),
    }
}
