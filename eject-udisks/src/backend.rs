// SPDX-License-Identifier: GPL-3.0-only

//! Device service seam: everything the resolver, walker and orchestrator ask
//! of UDisks2 goes through [`DeviceBackend`].

use std::collections::HashMap;

use eject_types::{BlockDevice, BlockDeviceId, BlockDeviceSnapshot, DriveId, DriveInfo};
use futures::future::BoxFuture;
use tracing::debug;
use udisks2::drive::DriveProxy;
use zbus::fdo::{self, PropertiesProxy};
use zbus::names::InterfaceName;
use zbus::zvariant::{OwnedObjectPath, Value};
use zbus::{Connection, Proxy};

use crate::directory::{
    self, BLOCK_IFACE, DRIVE_IFACE, ENCRYPTED_IFACE, FILESYSTEM_IFACE, UDISKS2_SERVICE,
};
use crate::error::EjectError;
use crate::manager::{
    InterfaceMap, ManagedObjects, PropertyMap, UDisks2ManagerProxy, UDisks2ObjectManagerProxy,
};

pub trait DeviceBackend: Send + Sync {
    /// Fresh snapshot of every block device.
    fn block_devices(&self) -> BoxFuture<'_, Result<BlockDeviceSnapshot, EjectError>>;

    /// Live properties of one block device, `None` if it no longer exists.
    fn block_device(
        &self,
        id: BlockDeviceId,
    ) -> BoxFuture<'_, Result<Option<BlockDevice>, EjectError>>;

    fn drive(&self, id: DriveId) -> BoxFuture<'_, Result<DriveInfo, EjectError>>;

    fn unmount(&self, id: BlockDeviceId) -> BoxFuture<'_, Result<(), EjectError>>;
    fn lock(&self, id: BlockDeviceId) -> BoxFuture<'_, Result<(), EjectError>>;
    fn eject(&self, id: DriveId) -> BoxFuture<'_, Result<(), EjectError>>;
    fn power_off(&self, id: DriveId) -> BoxFuture<'_, Result<(), EjectError>>;
}

/// [`DeviceBackend`] over one system bus connection to UDisks2.
#[derive(Clone)]
pub struct UDisksBackend {
    connection: Connection,
}

impl UDisksBackend {
    /// Open the system bus connection used for the rest of the run.
    pub async fn connect() -> Result<Self, EjectError> {
        let connection = Connection::system()
            .await
            .map_err(|e| EjectError::ConnectionFailed(e.to_string()))?;

        match UDisks2ManagerProxy::new(&connection).await {
            Ok(manager) => match manager.version().await {
                Ok(version) => debug!(%version, "connected to UDisks2"),
                Err(e) => debug!("could not read UDisks2 version: {e}"),
            },
            Err(e) => debug!("could not create UDisks2 manager proxy: {e}"),
        }

        Ok(Self { connection })
    }

    pub async fn close(self) -> Result<(), EjectError> {
        self.connection.close().await?;
        Ok(())
    }

    async fn managed_objects(&self) -> Result<ManagedObjects, EjectError> {
        let object_manager = UDisks2ObjectManagerProxy::new(&self.connection).await?;
        Ok(object_manager.get_managed_objects().await?)
    }

    /// Properties of one interface on `properties`' object, `None` when the
    /// object or the interface is not there.
    async fn interface_properties(
        properties: &PropertiesProxy<'_>,
        interface: &'static str,
    ) -> Result<Option<PropertyMap>, EjectError> {
        match properties
            .get_all(InterfaceName::from_static_str_unchecked(interface))
            .await
        {
            Ok(props) => Ok(Some(props)),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn drive_proxy(&self, id: &DriveId) -> Result<DriveProxy<'static>, EjectError> {
        let path = OwnedObjectPath::try_from(id.as_str())?;
        Ok(DriveProxy::builder(&self.connection)
            .path(path)?
            .build()
            .await?)
    }

    /// Issue a mutating UDisks2 method with an empty option map.
    ///
    /// Goes through a raw proxy so a failure stays a `zbus::Error::MethodError`
    /// carrying the service's error name and message.
    async fn call_action(
        &self,
        path: &str,
        interface: &'static str,
        method: &'static str,
    ) -> Result<(), EjectError> {
        let proxy = Proxy::new(&self.connection, UDISKS2_SERVICE, path, interface).await?;
        let options: HashMap<&str, Value<'_>> = HashMap::new();
        proxy.call::<_, _, ()>(method, &(options)).await?;
        Ok(())
    }
}

/// Errors GDBus answers `GetAll` with for a missing object or interface.
fn is_absent(err: &fdo::Error) -> bool {
    matches!(
        err,
        fdo::Error::UnknownObject(_)
            | fdo::Error::UnknownInterface(_)
            | fdo::Error::UnknownMethod(_)
            | fdo::Error::InvalidArgs(_)
    )
}

impl DeviceBackend for UDisksBackend {
    fn block_devices(&self) -> BoxFuture<'_, Result<BlockDeviceSnapshot, EjectError>> {
        Box::pin(async move {
            let objects = self.managed_objects().await?;
            let snapshot = directory::snapshot_from_managed_objects(&objects);
            debug!(
                objects = objects.len(),
                block_devices = snapshot.len(),
                "fetched block device snapshot"
            );
            Ok(snapshot)
        })
    }

    fn block_device(
        &self,
        id: BlockDeviceId,
    ) -> BoxFuture<'_, Result<Option<BlockDevice>, EjectError>> {
        Box::pin(async move {
            let properties = PropertiesProxy::builder(&self.connection)
                .destination(UDISKS2_SERVICE)?
                .path(id.as_str())?
                .build()
                .await?;

            let Some(block) = Self::interface_properties(&properties, BLOCK_IFACE).await? else {
                return Ok(None);
            };
            let mut interfaces = InterfaceMap::from([(BLOCK_IFACE.to_string(), block)]);
            for interface in [FILESYSTEM_IFACE, ENCRYPTED_IFACE] {
                if let Some(props) = Self::interface_properties(&properties, interface).await? {
                    interfaces.insert(interface.to_string(), props);
                }
            }

            Ok(directory::block_device_from_interfaces(&interfaces))
        })
    }

    fn drive(&self, id: DriveId) -> BoxFuture<'_, Result<DriveInfo, EjectError>> {
        Box::pin(async move {
            let proxy = self.drive_proxy(&id).await?;
            Ok(DriveInfo {
                vendor: proxy.vendor().await?,
                model: proxy.model().await?,
                removable: proxy.removable().await?,
                media_removable: proxy.media_removable().await?,
                id,
            })
        })
    }

    fn unmount(&self, id: BlockDeviceId) -> BoxFuture<'_, Result<(), EjectError>> {
        Box::pin(async move {
            self.call_action(id.as_str(), FILESYSTEM_IFACE, "Unmount")
                .await
        })
    }

    fn lock(&self, id: BlockDeviceId) -> BoxFuture<'_, Result<(), EjectError>> {
        Box::pin(async move { self.call_action(id.as_str(), ENCRYPTED_IFACE, "Lock").await })
    }

    fn eject(&self, id: DriveId) -> BoxFuture<'_, Result<(), EjectError>> {
        Box::pin(async move { self.call_action(id.as_str(), DRIVE_IFACE, "Eject").await })
    }

    fn power_off(&self, id: DriveId) -> BoxFuture<'_, Result<(), EjectError>> {
        Box::pin(async move { self.call_action(id.as_str(), DRIVE_IFACE, "PowerOff").await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::method_error;

    #[test]
    fn missing_object_or_interface_reads_as_absent() {
        let gone = fdo::Error::from(method_error(
            "org.freedesktop.DBus.Error.UnknownMethod",
            "No such interface 'org.freedesktop.DBus.Properties' on object at path /org/freedesktop/UDisks2/block_devices/dm_2d0",
        ));
        assert!(is_absent(&gone));

        let no_interface = fdo::Error::from(method_error(
            "org.freedesktop.DBus.Error.InvalidArgs",
            "No such interface 'org.freedesktop.UDisks2.Encrypted'",
        ));
        assert!(is_absent(&no_interface));

        let denied = fdo::Error::from(method_error(
            "org.freedesktop.DBus.Error.AccessDenied",
            "Rejected send message",
        ));
        assert!(!is_absent(&denied));
    }

    #[test]
    fn service_errors_keep_their_text_through_the_action_path() {
        let err: EjectError = method_error(
            "org.freedesktop.UDisks2.Error.DeviceBusy",
            "Error locking /dev/sdb2: Device or resource busy",
        )
        .into();
        assert_eq!(
            err.to_string(),
            "D-Bus error: org.freedesktop.UDisks2.Error.DeviceBusy: Error locking /dev/sdb2: Device or resource busy"
        );
        assert!(err.is_device_busy());
    }
}
