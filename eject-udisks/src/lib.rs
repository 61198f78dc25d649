// SPDX-License-Identifier: GPL-3.0-only

//! Find the drive behind a path and tear it down through UDisks2
//!
//! The flow is linear: [`directory`] snapshots every block device, [`resolve`]
//! maps the path to one of them, [`chain`] walks up to the drive and back down
//! to every dependent device, and [`teardown`] unmounts, locks and finally
//! ejects or powers off the drive. [`eject()`] strings these together.

mod dbus;

pub mod backend;
pub mod chain;
pub mod directory;
pub mod eject;
pub mod error;
pub mod manager;
pub mod resolve;
pub mod teardown;

#[cfg(test)]
pub(crate) mod testing;

pub use eject_types;

pub use backend::{DeviceBackend, UDisksBackend};
pub use chain::{find_dependents, find_drive};
pub use eject::{EjectReport, EjectRequest, eject};
pub use error::EjectError;
pub use resolve::{canonicalize_best_effort, resolve, resolve_canonical};
pub use teardown::teardown;
