//! In-process state bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use cozyhub_domain::error::CozyHubError;
use cozyhub_domain::switch::SwitchSnapshot;

use crate::ports::StatePublisher;

/// In-process state bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the snapshot is simply dropped).
#[derive(Clone)]
pub struct InProcessStateBus {
    sender: broadcast::Sender<SwitchSnapshot>,
}

impl InProcessStateBus {
    /// Create a new state bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to snapshots on this bus.
    ///
    /// Returns a receiver that will get all snapshots published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SwitchSnapshot> {
        self.sender.subscribe()
    }
}

impl StatePublisher for InProcessStateBus {
    fn publish(
        &self,
        snapshot: SwitchSnapshot,
    ) -> impl Future<Output = Result<(), CozyHubError>> + Send {
        // send only fails with zero receivers
        let _ = self.sender.send(snapshot);
        async { Ok(()) }
    }
}
