//! Simulated CozyLife device — answers queries from an in-memory state map.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use cozyhub_app::ports::DeviceClient;
use cozyhub_domain::device::{DeviceIdentity, LIGHT_TYPE_CODE, SWITCH_TYPE_CODE};
use cozyhub_domain::error::{CozyHubError, ValidationError};
use cozyhub_domain::state::{POWER_FIELD, POWER_OFF_VALUE, StatePayload};

/// A simulated device that keeps its state in memory.
///
/// It can be taken offline to exercise the unavailable path: queries then
/// fail with [`CozyHubError::Unreachable`] and commands are rejected.
pub struct VirtualDevice {
    identity: DeviceIdentity,
    state: Mutex<StatePayload>,
    offline: AtomicBool,
    queries: AtomicUsize,
}

impl VirtualDevice {
    /// A simulated plug, initially off.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `id` is blank.
    pub fn switch(id: &str) -> Result<Self, ValidationError> {
        Self::new(id, "Virtual Plug", SWITCH_TYPE_CODE)
    }

    /// A simulated bulb, initially off. Setup does not adopt it as a switch.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `id` is blank.
    pub fn light(id: &str) -> Result<Self, ValidationError> {
        Self::new(id, "Virtual Bulb", LIGHT_TYPE_CODE)
    }

    fn new(id: &str, model_name: &str, type_code: &str) -> Result<Self, ValidationError> {
        let identity = DeviceIdentity::builder()
            .id(id)
            .model_name(model_name)
            .type_code(type_code)
            .build()?;
        Ok(Self {
            identity,
            state: Mutex::new(StatePayload::new().with_field(POWER_FIELD, POWER_OFF_VALUE)),
            offline: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
        })
    }

    /// Simulate the device dropping off (or coming back to) the network.
    pub fn set_offline(&self, offline: bool) {
        tracing::debug!(device = %self.identity.id, offline, "virtual device connectivity changed");
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Change the state as if someone pressed the physical button.
    pub fn press(&self, on: bool) {
        self.lock_state().merge(&StatePayload::power(on));
    }

    /// Copy of the current state map.
    #[must_use]
    pub fn state(&self) -> StatePayload {
        self.lock_state().clone()
    }

    /// Number of queries answered or refused so far.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> MutexGuard<'_, StatePayload> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceClient for VirtualDevice {
    fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    fn query(&self) -> impl Future<Output = Result<serde_json::Value, CozyHubError>> + Send {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let result = if self.is_offline() {
            Err(CozyHubError::Unreachable(
                format!("virtual device {} is offline", self.identity.id).into(),
            ))
        } else {
            Ok(serde_json::Value::from(self.state()))
        };
        async { result }
    }

    fn control(
        &self,
        fields: &StatePayload,
    ) -> impl Future<Output = Result<bool, CozyHubError>> + Send {
        let accepted = !self.is_offline();
        if accepted {
            self.lock_state().merge(fields);
        }
        async move { Ok(accepted) }
    }
}
