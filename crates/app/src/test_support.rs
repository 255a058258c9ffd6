//! In-memory fakes shared by the service tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use cozyhub_domain::device::DeviceIdentity;
use cozyhub_domain::error::CozyHubError;
use cozyhub_domain::state::StatePayload;
use cozyhub_domain::time::Timestamp;
use serde_json::Value;

use crate::ports::{Clock, DeviceClient};

/// Scripted outcome of one `query` call.
#[derive(Debug, Clone)]
pub enum QueryReply {
    State(Value),
    Fault,
}

/// Scripted outcome of one `control` call.
#[derive(Debug, Clone, Copy)]
pub enum ControlReply {
    Ack,
    Nack,
    Fault,
}

/// Device client that replays scripted replies.
///
/// Once the query script runs out, the last reply repeats.
pub struct FakeClient {
    identity: DeviceIdentity,
    queries: Mutex<VecDeque<QueryReply>>,
    last_query: Mutex<QueryReply>,
    control_reply: Mutex<ControlReply>,
    query_count: AtomicUsize,
    controls: Mutex<Vec<StatePayload>>,
}

impl FakeClient {
    pub fn switch(id: &str) -> Self {
        Self::with_type(id, "00")
    }

    pub fn with_type(id: &str, type_code: &str) -> Self {
        Self {
            identity: DeviceIdentity::builder()
                .id(id)
                .model_name("Fake Plug")
                .type_code(type_code)
                .build()
                .unwrap(),
            queries: Mutex::new(VecDeque::new()),
            last_query: Mutex::new(QueryReply::State(serde_json::json!({"1": 0}))),
            control_reply: Mutex::new(ControlReply::Ack),
            query_count: AtomicUsize::new(0),
            controls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_query(&self, reply: QueryReply) {
        self.queries.lock().unwrap().push_back(reply);
    }

    pub fn push_state(&self, state: Value) {
        self.push_query(QueryReply::State(state));
    }

    pub fn set_control_reply(&self, reply: ControlReply) {
        *self.control_reply.lock().unwrap() = reply;
    }

    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    pub fn controls(&self) -> Vec<StatePayload> {
        self.controls.lock().unwrap().clone()
    }
}

impl DeviceClient for FakeClient {
    fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    fn query(&self) -> impl Future<Output = Result<Value, CozyHubError>> + Send {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        let reply = {
            let mut last = self.last_query.lock().unwrap();
            if let Some(next) = self.queries.lock().unwrap().pop_front() {
                *last = next;
            }
            last.clone()
        };
        let result = match reply {
            QueryReply::State(value) => Ok(value),
            QueryReply::Fault => Err(CozyHubError::Timeout),
        };
        async { result }
    }

    fn control(
        &self,
        fields: &StatePayload,
    ) -> impl Future<Output = Result<bool, CozyHubError>> + Send {
        self.controls.lock().unwrap().push(fields.clone());
        let result = match *self.control_reply.lock().unwrap() {
            ControlReply::Ack => Ok(true),
            ControlReply::Nack => Ok(false),
            ControlReply::Fault => Err(CozyHubError::Unreachable(Box::new(
                std::io::Error::from(std::io::ErrorKind::ConnectionReset),
            ))),
        };
        async { result }
    }
}

/// Clock that only moves when told to.
///
/// The wall clock can be stepped on its own to mimic NTP corrections; the
/// monotonic clock only ever moves forward.
#[derive(Clone)]
pub struct ManualClock {
    origin: Instant,
    state: Arc<Mutex<ManualTime>>,
}

struct ManualTime {
    wall: Timestamp,
    elapsed: Duration,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            state: Arc::new(Mutex::new(ManualTime {
                wall: cozyhub_domain::time::now(),
                elapsed: Duration::ZERO,
            })),
        }
    }
}

impl ManualClock {
    /// Let `secs` seconds pass on both clocks.
    pub fn advance_secs(&self, secs: u64) {
        let mut state = self.state.lock().unwrap();
        state.wall += chrono::TimeDelta::seconds(i64::try_from(secs).unwrap());
        state.elapsed += Duration::from_secs(secs);
    }

    /// Step the wall clock alone, forwards or backwards.
    pub fn step_wall_secs(&self, secs: i64) {
        self.state.lock().unwrap().wall += chrono::TimeDelta::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.state.lock().unwrap().wall
    }

    fn instant(&self) -> Instant {
        self.origin + self.state.lock().unwrap().elapsed
    }
}
