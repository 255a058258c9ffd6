//! # cozyhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceClient` — query and control one physical device
//!   - `Clock` — current time, injectable for tests
//!   - `StatePublisher` — broadcast switch snapshots
//! - Define the **driving/inbound port** a host talks to:
//!   - `SwitchEntity` — availability, on/off state, turn on/off, poll
//! - Implement the use-cases:
//!   - `SwitchAdapter` — rate-limited, stale-on-failure state cache
//!   - `setup_switches` — one adapter per switch-type client
//!   - `Poller` — drives the polling hook and serializes host commands
//! - Provide **in-process infrastructure** (state bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `cozyhub-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod state_bus;

#[cfg(test)]
pub(crate) mod test_support;
