//! # cozyhub-adapter-virtual
//!
//! Virtual/demo adapter that provides simulated CozyLife devices for testing
//! and demonstration purposes.
//!
//! ## Provided devices
//!
//! | Device | Device ID | Type code | Behaviour |
//! |--------|-----------|-----------|-----------|
//! | Virtual Plug | `virtual-plug-0001` | `00` | Switch, initially off |
//! | Virtual Plug | `virtual-plug-0002` | `00` | Switch, initially off |
//! | Virtual Bulb | `virtual-bulb-0001` | `01` | Light; ignored by switch setup |
//!
//! ## Dependency rule
//!
//! Depends on `cozyhub-app` (port traits) and `cozyhub-domain` only.

mod device;

use std::sync::Arc;

pub use device::VirtualDevice;

use cozyhub_domain::error::ValidationError;

/// Fixed set of simulated devices.
pub struct VirtualIntegration {
    devices: Vec<Arc<VirtualDevice>>,
}

impl VirtualIntegration {
    /// Build the demo device set.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a built-in identity is invalid.
    pub fn new() -> Result<Self, ValidationError> {
        let devices = vec![
            Arc::new(VirtualDevice::switch("virtual-plug-0001")?),
            Arc::new(VirtualDevice::switch("virtual-plug-0002")?),
            Arc::new(VirtualDevice::light("virtual-bulb-0001")?),
        ];
        tracing::debug!(count = devices.len(), "virtual devices created");
        Ok(Self { devices })
    }

    /// Unique name identifying this integration.
    #[must_use]
    pub fn name(&self) -> &'static str {
        "virtual"
    }

    /// Shared handles to every simulated device.
    #[must_use]
    pub fn devices(&self) -> Vec<Arc<VirtualDevice>> {
        self.devices.clone()
    }
}
