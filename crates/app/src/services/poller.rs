//! Poller — the host-side driver for a set of switch entities.
//!
//! The poller owns every entity, calls their polling hook on a fixed
//! schedule, and publishes a snapshot whenever what a host would display
//! changes. Host commands arrive through a [`PollerHandle`] and run on the
//! poller task, so calls to one entity never overlap.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use cozyhub_domain::id::DeviceId;
use cozyhub_domain::switch::SwitchSnapshot;

use crate::ports::{StatePublisher, SwitchEntity};

/// Default time between two polling rounds.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

const COMMAND_BUFFER: usize = 32;

enum Command {
    SetPower {
        unique_id: DeviceId,
        on: bool,
        options: serde_json::Value,
        reply: oneshot::Sender<Option<SwitchSnapshot>>,
    },
    Snapshots {
        reply: oneshot::Sender<Vec<SwitchSnapshot>>,
    },
    Shutdown,
}

/// Cloneable handle for sending commands to a running [`Poller`].
#[derive(Clone)]
pub struct PollerHandle {
    tx: mpsc::Sender<Command>,
}

impl PollerHandle {
    /// Turn an entity on. Returns its snapshot afterwards, or `None` when
    /// the id is unknown or the poller has stopped.
    pub async fn turn_on(
        &self,
        unique_id: DeviceId,
        options: serde_json::Value,
    ) -> Option<SwitchSnapshot> {
        self.set_power(unique_id, true, options).await
    }

    /// Turn an entity off. Same return contract as [`turn_on`](Self::turn_on).
    pub async fn turn_off(
        &self,
        unique_id: DeviceId,
        options: serde_json::Value,
    ) -> Option<SwitchSnapshot> {
        self.set_power(unique_id, false, options).await
    }

    /// Current snapshots of every entity, without touching any device.
    pub async fn snapshots(&self) -> Vec<SwitchSnapshot> {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Snapshots { reply }).await.is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Ask the poller to stop after the command currently running.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }

    async fn set_power(
        &self,
        unique_id: DeviceId,
        on: bool,
        options: serde_json::Value,
    ) -> Option<SwitchSnapshot> {
        let (reply, rx) = oneshot::channel();
        let command = Command::SetPower {
            unique_id,
            on,
            options,
            reply,
        };
        self.tx.send(command).await.ok()?;
        rx.await.ok().flatten()
    }
}

/// Drives the polling hook of a set of entities.
pub struct Poller<E, P> {
    entities: Vec<E>,
    publisher: P,
    poll_interval: Duration,
    commands: mpsc::Receiver<Command>,
    last_published: HashMap<DeviceId, SwitchSnapshot>,
}

impl<E, P> Poller<E, P>
where
    E: SwitchEntity + Send,
    P: StatePublisher + Send + Sync,
{
    /// Create a poller and the handle used to command it.
    pub fn new(entities: Vec<E>, publisher: P, poll_interval: Duration) -> (Self, PollerHandle) {
        let (tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let poller = Self {
            entities,
            publisher,
            poll_interval,
            commands,
            last_published: HashMap::new(),
        };
        (poller, PollerHandle { tx })
    }

    /// Run until shut down or until every handle is dropped, then hand the
    /// entities back.
    ///
    /// The first round runs immediately and publishes every entity.
    pub async fn run(mut self) -> Vec<E> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            entities = self.entities.len(),
            interval_secs = self.poll_interval.as_secs(),
            "poller started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.poll_all().await,
                command = self.commands.recv() => match command {
                    Some(Command::SetPower { unique_id, on, options, reply }) => {
                        let snapshot = self.set_power(&unique_id, on, options).await;
                        let _ = reply.send(snapshot);
                    }
                    Some(Command::Snapshots { reply }) => {
                        let _ = reply.send(self.entities.iter().map(SwitchEntity::snapshot).collect());
                    }
                    Some(Command::Shutdown) | None => break,
                },
            }
        }

        tracing::info!("poller stopped");
        self.entities
    }

    async fn poll_all(&mut self) {
        for idx in 0..self.entities.len() {
            self.entities[idx].update().await;
            let snapshot = self.entities[idx].snapshot();
            self.publish_if_changed(snapshot).await;
        }
    }

    async fn set_power(
        &mut self,
        unique_id: &DeviceId,
        on: bool,
        options: serde_json::Value,
    ) -> Option<SwitchSnapshot> {
        let Some(entity) = self
            .entities
            .iter_mut()
            .find(|entity| entity.unique_id() == unique_id)
        else {
            tracing::warn!(device = %unique_id, "power command for unknown switch");
            return None;
        };

        if on {
            entity.turn_on(options).await;
        } else {
            entity.turn_off(options).await;
        }
        let snapshot = entity.snapshot();
        self.publish_if_changed(snapshot.clone()).await;
        Some(snapshot)
    }

    async fn publish_if_changed(&mut self, snapshot: SwitchSnapshot) {
        let changed = self
            .last_published
            .get(&snapshot.unique_id)
            .is_none_or(|previous| previous.visibly_differs(&snapshot));
        if !changed {
            return;
        }

        tracing::info!(
            device = %snapshot.unique_id,
            name = %snapshot.name,
            state = %snapshot.state(),
            "switch state changed"
        );
        self.last_published
            .insert(snapshot.unique_id.clone(), snapshot.clone());
        if let Err(err) = self.publisher.publish(snapshot).await {
            tracing::warn!(error = %err, "failed to publish switch snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::ports::SystemClock;
    use crate::services::switch_adapter::SwitchAdapter;
    use crate::state_bus::InProcessStateBus;
    use crate::test_support::{FakeClient, QueryReply};
    use serde_json::json;

    type Adapter = SwitchAdapter<FakeClient, SystemClock>;

    fn adapter(client: &Arc<FakeClient>) -> Adapter {
        SwitchAdapter::with_interval(Arc::clone(client), SystemClock, Duration::ZERO)
    }

    #[tokio::test(start_paused = true)]
    async fn should_publish_every_entity_on_first_round() {
        let a = Arc::new(FakeClient::switch("plug-0001"));
        let b = Arc::new(FakeClient::switch("plug-0002"));
        b.push_state(json!({"1": 255}));
        let bus = InProcessStateBus::new(16);
        let mut rx = bus.subscribe();

        let (poller, handle) = Poller::new(vec![adapter(&a), adapter(&b)], bus, Duration::from_secs(10));
        let task = tokio::spawn(poller.run());

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.unique_id.as_str(), "plug-0001");
        assert!(!first.is_on);
        assert_eq!(second.unique_id.as_str(), "plug-0002");
        assert!(second.is_on);

        handle.shutdown().await;
        let entities = task.await.unwrap();
        assert_eq!(entities.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_publish_only_when_visible_state_changes() {
        let client = Arc::new(FakeClient::switch("plug-0001"));
        client.push_state(json!({"1": 0}));
        client.push_state(json!({"1": 0}));
        client.push_query(QueryReply::Fault);
        let bus = InProcessStateBus::new(16);
        let mut rx = bus.subscribe();

        let (poller, handle) = Poller::new(vec![adapter(&client)], bus, Duration::from_secs(10));
        let task = tokio::spawn(poller.run());

        let initial = rx.recv().await.unwrap();
        assert!(initial.available);

        let next = rx.recv().await.unwrap();
        assert!(!next.available);
        assert!(client.query_count() >= 3);

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn should_forward_power_commands_to_matching_entity() {
        let client = Arc::new(FakeClient::switch("plug-0001"));
        client.push_state(json!({"1": 0}));
        client.push_state(json!({"1": 255}));
        let bus = InProcessStateBus::new(16);
        let mut rx = bus.subscribe();

        let (poller, handle) =
            Poller::new(vec![adapter(&client)], bus, Duration::from_secs(3600));
        let task = tokio::spawn(poller.run());
        let _ = rx.recv().await.unwrap();

        let id = DeviceId::new("plug-0001").unwrap();
        let snapshot = handle.turn_on(id, json!({})).await.unwrap();

        assert!(snapshot.is_on);
        assert!(snapshot.available);
        assert!(rx.recv().await.unwrap().is_on);

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn should_return_none_for_unknown_entity() {
        let client = Arc::new(FakeClient::switch("plug-0001"));
        let (poller, handle) = Poller::new(
            vec![adapter(&client)],
            InProcessStateBus::new(16),
            Duration::from_secs(3600),
        );
        let task = tokio::spawn(poller.run());

        let id = DeviceId::new("missing").unwrap();
        assert!(handle.turn_off(id, json!({})).await.is_none());
        assert!(client.controls().is_empty());

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_snapshots_without_querying() {
        let client = Arc::new(FakeClient::switch("plug-0001"));
        let bus = InProcessStateBus::new(16);
        let mut rx = bus.subscribe();
        let (poller, handle) = Poller::new(vec![adapter(&client)], bus, Duration::from_secs(3600));
        let task = tokio::spawn(poller.run());
        let _ = rx.recv().await.unwrap();

        let snapshots = handle.snapshots().await;
        let before = client.query_count();
        let again = handle.snapshots().await;

        assert_eq!(snapshots.len(), 1);
        assert_eq!(again.len(), 1);
        assert_eq!(client.query_count(), before);

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_when_all_handles_dropped() {
        let client = Arc::new(FakeClient::switch("plug-0001"));
        let (poller, handle) = Poller::new(
            vec![adapter(&client)],
            InProcessStateBus::new(16),
            Duration::from_secs(10),
        );
        let task = tokio::spawn(poller.run());
        drop(handle);

        let entities = task.await.unwrap();
        assert_eq!(entities.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_return_empty_snapshots_after_shutdown() {
        let client = Arc::new(FakeClient::switch("plug-0001"));
        let (poller, handle) = Poller::new(
            vec![adapter(&client)],
            InProcessStateBus::new(16),
            Duration::from_secs(10),
        );
        let task = tokio::spawn(poller.run());
        handle.shutdown().await;
        task.await.unwrap();

        assert!(handle.snapshots().await.is_empty());
    }
}
