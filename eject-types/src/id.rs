// SPDX-License-Identifier: GPL-3.0-only

//! Object identifiers for block devices and drives

use std::fmt;

use serde::Serialize;

/// Object path UDisks2 uses for "no object" (e.g. an unencrypted device's backing device)
pub const NO_OBJECT: &str = "/";

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(path: impl Into<String>) -> Self {
                Self(path.into())
            }

            /// Build an id from an object path reference, mapping the `"/"` sentinel to `None`.
            pub fn from_reference(path: &str) -> Option<Self> {
                if path.is_empty() || path == NO_OBJECT {
                    None
                } else {
                    Some(Self(path.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Last object path segment, e.g. "sdb1" for ".../block_devices/sdb1"
            pub fn short_name(&self) -> &str {
                self.0.rsplit('/').next().unwrap_or(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(path: &str) -> Self {
                Self::new(path)
            }
        }
    };
}

object_id!(
    /// UDisks2 object path of a block device (plain, filesystem or crypto container)
    BlockDeviceId
);

object_id!(
    /// UDisks2 object path of a physical drive
    DriveId
);
