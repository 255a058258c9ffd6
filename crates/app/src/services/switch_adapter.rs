//! Switch adapter — presents one device client as a [`SwitchEntity`].
//!
//! The adapter is a rate-limited cache of the device's on/off state. Reads
//! refresh from the device at most once per `update_interval`; between
//! refreshes the last-known value is served. Every device fault degrades to
//! `available = false` and is never propagated to the host.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cozyhub_domain::device::DeviceIdentity;
use cozyhub_domain::error::CozyHubError;
use cozyhub_domain::id::DeviceId;
use cozyhub_domain::state::StatePayload;
use cozyhub_domain::switch::SwitchSnapshot;
use cozyhub_domain::time::{self, Timestamp};

use crate::ports::{Clock, DeviceClient, SwitchEntity};

/// Minimum time between two device queries.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(30);

/// Cached on/off view of a single switch device.
pub struct SwitchAdapter<C, K> {
    client: Arc<C>,
    clock: K,
    identity: DeviceIdentity,
    name: String,
    cached_state: StatePayload,
    is_on: bool,
    available: bool,
    last_attempt: Option<Instant>,
    last_update: Option<Timestamp>,
    update_interval: Duration,
}

impl<C: DeviceClient, K: Clock> SwitchAdapter<C, K> {
    /// Create an adapter with the default 30 s update interval.
    ///
    /// Nothing is queried yet; the first read or [`refresh`](Self::refresh)
    /// goes to the device.
    pub fn new(client: Arc<C>, clock: K) -> Self {
        Self::with_interval(client, clock, DEFAULT_UPDATE_INTERVAL)
    }

    /// Create an adapter with a custom update interval.
    pub fn with_interval(client: Arc<C>, clock: K, update_interval: Duration) -> Self {
        let identity = client.identity().clone();
        let name = identity.display_name();
        Self {
            client,
            clock,
            identity,
            name,
            cached_state: StatePayload::new(),
            is_on: false,
            available: false,
            last_attempt: None,
            last_update: None,
            update_interval,
        }
    }

    /// Last accepted raw state; empty until the first successful refresh.
    #[must_use]
    pub fn cached_state(&self) -> &StatePayload {
        &self.cached_state
    }

    /// Wall-clock time of the last refresh attempt.
    #[must_use]
    pub fn last_update(&self) -> Option<Timestamp> {
        self.last_update
    }

    /// Query the device unless the last attempt is younger than the update
    /// interval.
    ///
    /// The attempt time is recorded whatever the outcome, so a failing
    /// device is not queried more often than a healthy one.
    #[tracing::instrument(skip(self), fields(device = %self.identity.id))]
    pub async fn refresh(&mut self) {
        let now = self.clock.instant();
        if !time::is_due(self.last_attempt, now, self.update_interval) {
            return;
        }
        self.last_attempt = Some(now);
        self.last_update = Some(self.clock.now());

        let result = match self.client.query().await {
            Ok(raw) => StatePayload::parse_switch_state(raw).map_err(CozyHubError::from),
            Err(err) => Err(err),
        };

        match result {
            Ok((payload, on)) => {
                self.cached_state = payload;
                self.is_on = on;
                self.available = true;
                tracing::debug!(is_on = on, "switch state refreshed");
            }
            Err(err) => self.mark_unavailable(&err),
        }
    }

    /// Send an on/off command, then reconcile with the device right away.
    ///
    /// On acknowledgement the requested state is applied optimistically and
    /// the interval guard is bypassed for one refresh. On rejection or fault
    /// only availability changes.
    #[tracing::instrument(skip(self), fields(device = %self.identity.id))]
    pub async fn set_power(&mut self, on: bool) {
        let command = StatePayload::power(on);
        match self.client.control(&command).await {
            Ok(true) => {
                self.cached_state.merge(&command);
                self.is_on = on;
                self.available = true;
                self.last_attempt = None;
                self.refresh().await;
            }
            Ok(false) => {
                tracing::error!(requested = on, "device rejected power command");
                self.available = false;
            }
            Err(err) => {
                tracing::error!(
                    requested = on,
                    kind = err.kind(),
                    error = %err,
                    "failed to send power command"
                );
                self.available = false;
            }
        }
    }

    fn mark_unavailable(&mut self, err: &CozyHubError) {
        self.available = false;
        match err {
            CozyHubError::InvalidResponse(reason) => {
                tracing::warn!(%reason, "no valid state from device, marking unavailable");
            }
            other => {
                tracing::error!(
                    kind = other.kind(),
                    transient = other.is_transient(),
                    error = %other,
                    "error refreshing switch state"
                );
            }
        }
    }
}

impl<C, K> SwitchEntity for SwitchAdapter<C, K>
where
    C: DeviceClient,
    K: Clock,
{
    fn unique_id(&self) -> &DeviceId {
        &self.identity.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn is_on(&mut self) -> impl Future<Output = bool> + Send {
        async move {
            self.refresh().await;
            self.is_on
        }
    }

    fn turn_on(&mut self, options: serde_json::Value) -> impl Future<Output = ()> + Send {
        tracing::debug!(%options, "turning switch on");
        self.set_power(true)
    }

    fn turn_off(&mut self, options: serde_json::Value) -> impl Future<Output = ()> + Send {
        tracing::debug!(%options, "turning switch off");
        self.set_power(false)
    }

    fn update(&mut self) -> impl Future<Output = ()> + Send {
        self.refresh()
    }

    fn snapshot(&self) -> SwitchSnapshot {
        SwitchSnapshot {
            unique_id: self.identity.id.clone(),
            name: self.name.clone(),
            is_on: self.is_on,
            available: self.available,
            updated_at: self.last_update,
        }
    }
}
