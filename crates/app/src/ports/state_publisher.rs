//! State publisher port — broadcast switch snapshots to interested parties.

use std::future::Future;

use cozyhub_domain::error::CozyHubError;
use cozyhub_domain::switch::SwitchSnapshot;

/// Publishes switch snapshots to subscribers.
pub trait StatePublisher {
    /// Publish a snapshot to all current subscribers.
    fn publish(
        &self,
        snapshot: SwitchSnapshot,
    ) -> impl Future<Output = Result<(), CozyHubError>> + Send;
}

impl<T: StatePublisher + Send + Sync> StatePublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        snapshot: SwitchSnapshot,
    ) -> impl Future<Output = Result<(), CozyHubError>> + Send {
        (**self).publish(snapshot)
    }
}
