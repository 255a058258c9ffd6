//! Device client construction from configuration.

use std::sync::Arc;

use cozyhub_adapter_cozylife_tcp::TcpDeviceClient;
use cozyhub_adapter_virtual::{VirtualDevice, VirtualIntegration};
use cozyhub_app::ports::DeviceClient;
use cozyhub_domain::device::DeviceIdentity;
use cozyhub_domain::error::CozyHubError;
use cozyhub_domain::state::StatePayload;

use crate::config::Config;

/// Any device client the daemon knows how to build.
pub enum DeviceHandle {
    Tcp(TcpDeviceClient),
    Virtual(Arc<VirtualDevice>),
}

impl DeviceClient for DeviceHandle {
    fn identity(&self) -> &DeviceIdentity {
        match self {
            Self::Tcp(client) => client.identity(),
            Self::Virtual(device) => device.identity(),
        }
    }

    async fn query(&self) -> Result<serde_json::Value, CozyHubError> {
        match self {
            Self::Tcp(client) => client.query().await,
            Self::Virtual(device) => device.query().await,
        }
    }

    async fn control(&self, fields: &StatePayload) -> Result<bool, CozyHubError> {
        match self {
            Self::Tcp(client) => client.control(fields).await,
            Self::Virtual(device) => device.control(fields).await,
        }
    }
}

/// Build a client for every configured device.
///
/// Devices that cannot be identified are logged and left out; the rest of
/// the daemon keeps running without them.
pub async fn build(config: &Config) -> Vec<Arc<DeviceHandle>> {
    let mut clients = Vec::new();

    for device in &config.devices {
        match TcpDeviceClient::connect(device.clone()).await {
            Ok(client) => {
                tracing::info!(
                    device = %client.identity().id,
                    addr = %device.addr(),
                    "tcp device registered"
                );
                clients.push(Arc::new(DeviceHandle::Tcp(client)));
            }
            Err(err) => {
                tracing::error!(addr = %device.addr(), error = %err, "failed to set up tcp device");
            }
        }
    }

    if config.integrations.virtual_enabled {
        match VirtualIntegration::new() {
            Ok(integration) => {
                let devices = integration.devices();
                tracing::info!(
                    integration = integration.name(),
                    count = devices.len(),
                    "virtual devices registered"
                );
                clients.extend(
                    devices
                        .into_iter()
                        .map(|device| Arc::new(DeviceHandle::Virtual(device))),
                );
            }
            Err(err) => tracing::error!(error = %err, "failed to set up virtual devices"),
        }
    }

    clients
}
