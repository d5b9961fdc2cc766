//! Power management abstraction over management API clients.

use crate::client::ManagementClient;
use crate::Result;
use async_trait::async_trait;
use tracing::debug;

/// Power and boot-mode operations on a single machine.
///
/// Implemented by [`ManagementClient`]; orchestrators hold it as
/// `Arc<dyn PowerManager>` so the transport can be replaced in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PowerManager: Send + Sync {
    /// Power on the machine
    async fn power_on(&self) -> Result<()>;

    /// Power off the machine
    async fn power_off(&self) -> Result<()>;

    /// Power off, then power on if power-off succeeded
    async fn power_cycle(&self) -> Result<()>;

    /// Make the next boot a network boot
    async fn set_pxe(&self) -> Result<()>;

    /// Query the current power state
    async fn is_powered_on(&self) -> Result<bool>;
}

#[async_trait]
impl PowerManager for ManagementClient {
    async fn power_on(&self) -> Result<()> {
        ManagementClient::power_on(self).await
    }

    async fn power_off(&self) -> Result<()> {
        ManagementClient::power_off(self).await
    }

    async fn power_cycle(&self) -> Result<()> {
        ManagementClient::power_cycle(self).await
    }

    async fn set_pxe(&self) -> Result<()> {
        ManagementClient::set_pxe(self).await
    }

    async fn is_powered_on(&self) -> Result<bool> {
        ManagementClient::is_powered_on(self).await
    }
}

/// Reboot a machine into PXE.
///
/// Selects network boot, then power cycles a running machine or powers on a
/// stopped one. The first failing step aborts the sequence.
pub async fn boot_from_network(manager: &dyn PowerManager) -> Result<()> {
    manager.set_pxe().await?;

    if manager.is_powered_on().await? {
        debug!("machine running, power cycling into PXE");
        manager.power_cycle().await
    } else {
        debug!("machine stopped, powering on into PXE");
        manager.power_on().await
    }
}
