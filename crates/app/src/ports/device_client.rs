//! Device client port — the wire-level conversation with one device.
//!
//! A device client bridges a transport (CozyLife TCP, a simulated device, …)
//! into cozyhub. Clients are built by the composition root and shared with
//! the switch adapters through an `Arc`; adapters never construct, reconnect,
//! or tear down a client.

use std::future::Future;
use std::sync::Arc;

use cozyhub_domain::device::DeviceIdentity;
use cozyhub_domain::error::CozyHubError;
use cozyhub_domain::state::StatePayload;

/// Query and control a single device.
///
/// Both async methods may wait on network IO; implementations own their
/// timeouts. Callers must not issue concurrent calls on the same client
/// unless the implementation documents otherwise.
pub trait DeviceClient: Send + Sync {
    /// Static identity (id, model name, type code).
    fn identity(&self) -> &DeviceIdentity;

    /// Read the current raw device state.
    ///
    /// The reply is returned as-is; judging whether it is a usable state is
    /// up to the caller.
    fn query(&self) -> impl Future<Output = Result<serde_json::Value, CozyHubError>> + Send;

    /// Send one or more field updates.
    ///
    /// Returns `Ok(false)` when the device answered but did not accept the
    /// command.
    fn control(
        &self,
        fields: &StatePayload,
    ) -> impl Future<Output = Result<bool, CozyHubError>> + Send;
}

impl<T: DeviceClient> DeviceClient for Arc<T> {
    fn identity(&self) -> &DeviceIdentity {
        (**self).identity()
    }

    fn query(&self) -> impl Future<Output = Result<serde_json::Value, CozyHubError>> + Send {
        (**self).query()
    }

    fn control(
        &self,
        fields: &StatePayload,
    ) -> impl Future<Output = Result<bool, CozyHubError>> + Send {
        (**self).control(fields)
    }
}
