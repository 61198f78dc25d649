// SPDX-License-Identifier: GPL-3.0-only

//! Domain models for resolving a path to its drive and tearing it down
//!
//! These types are plain views over UDisks2 state and carry no bus handles:
//!
//! - **eject-udisks**: Decodes UDisks2 objects into these types and drives the teardown
//! - **eject-cli**: Prints them (error messages, dry-run plans)
//!
//! Absent object references (UDisks2 uses `"/"` for them) are always `None`.

pub mod block;
pub mod drive;
pub mod id;
pub mod snapshot;
pub mod teardown;

pub use block::{BlockDevice, EncryptedView, FilesystemView};
pub use drive::DriveInfo;
pub use id::{BlockDeviceId, DriveId, NO_OBJECT};
pub use snapshot::BlockDeviceSnapshot;
pub use teardown::{TeardownMode, TeardownStep};
