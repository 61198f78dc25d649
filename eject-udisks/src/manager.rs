// SPDX-License-Identifier: GPL-3.0-only

//! UDisks2 root object proxies not covered by the `udisks2` crate

use std::collections::HashMap;

use zbus::zvariant::{OwnedObjectPath, OwnedValue};
use zbus_macros::proxy;

/// Property name -> value of one interface
pub type PropertyMap = HashMap<String, OwnedValue>;

/// Interface name -> property map of one managed object
pub type InterfaceMap = HashMap<String, PropertyMap>;

/// Everything `GetManagedObjects` returns
pub type ManagedObjects = HashMap<OwnedObjectPath, InterfaceMap>;

#[proxy(
    default_service = "org.freedesktop.UDisks2",
    default_path = "/org/freedesktop/UDisks2/Manager",
    interface = "org.freedesktop.UDisks2.Manager"
)]
pub trait UDisks2Manager {
    #[zbus(property)]
    fn version(&self) -> zbus::Result<String>;
}

#[proxy(
    default_service = "org.freedesktop.UDisks2",
    default_path = "/org/freedesktop/UDisks2",
    interface = "org.freedesktop.DBus.ObjectManager"
)]
pub trait UDisks2ObjectManager {
    fn get_managed_objects(&self) -> zbus::Result<ManagedObjects>;
}
