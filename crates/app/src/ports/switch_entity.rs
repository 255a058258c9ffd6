//! Switch entity port — the capability set a host integrates against.
//!
//! A host (the daemon, or a bridge to another home-automation system) only
//! sees this trait. It never reaches into the adapter's cache.

use std::future::Future;

use cozyhub_domain::id::DeviceId;
use cozyhub_domain::switch::SwitchSnapshot;

/// A controllable on/off entity.
///
/// None of the methods fail: device faults surface only through
/// [`is_available`](Self::is_available).
pub trait SwitchEntity {
    /// Stable unique identifier.
    fn unique_id(&self) -> &DeviceId;

    /// Display name.
    fn name(&self) -> &str;

    /// Outcome of the most recent device interaction. No side effect.
    fn is_available(&self) -> bool;

    /// Current on/off state; may refresh from the device first.
    fn is_on(&mut self) -> impl Future<Output = bool> + Send;

    /// Turn on. `options` is an open bag the host may pass through.
    fn turn_on(&mut self, options: serde_json::Value) -> impl Future<Output = ()> + Send;

    /// Turn off. `options` is an open bag the host may pass through.
    fn turn_off(&mut self, options: serde_json::Value) -> impl Future<Output = ()> + Send;

    /// Polling hook, called periodically by the host.
    fn update(&mut self) -> impl Future<Output = ()> + Send;

    /// Visible state without touching the device.
    fn snapshot(&self) -> SwitchSnapshot;
}
