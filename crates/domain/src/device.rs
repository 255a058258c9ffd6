//! Device identity — who a device is and what category it belongs to.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{DeviceId, TypeCode};

/// Type code CozyLife devices report for plugs and switches.
pub const SWITCH_TYPE_CODE: &str = "00";
/// Type code CozyLife devices report for lights.
pub const LIGHT_TYPE_CODE: &str = "01";

/// Device category derived from a [`TypeCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    Switch,
    Light,
    Other(String),
}

impl From<&TypeCode> for DeviceKind {
    fn from(code: &TypeCode) -> Self {
        match code.as_str() {
            SWITCH_TYPE_CODE => Self::Switch,
            LIGHT_TYPE_CODE => Self::Light,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Static identity of a device, fixed for the lifetime of its client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub id: DeviceId,
    pub model_name: String,
    pub type_code: TypeCode,
}

impl DeviceIdentity {
    /// Start building an identity.
    #[must_use]
    pub fn builder() -> DeviceIdentityBuilder {
        DeviceIdentityBuilder::default()
    }

    /// Category of the device.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        DeviceKind::from(&self.type_code)
    }

    /// Human-readable name: model name followed by the id's last four characters.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.model_name, self.id.short_suffix())
    }
}

/// Builder for [`DeviceIdentity`]; validation happens in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct DeviceIdentityBuilder {
    id: Option<String>,
    model_name: Option<String>,
    type_code: Option<String>,
}

impl DeviceIdentityBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn type_code(mut self, code: impl Into<String>) -> Self {
        self.type_code = Some(code.into());
        self
    }

    /// Validate and build the identity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the id, model name, or type code
    /// is missing or blank.
    pub fn build(self) -> Result<DeviceIdentity, ValidationError> {
        let id = DeviceId::new(self.id.unwrap_or_default())?;
        let model_name = self.model_name.unwrap_or_default();
        if model_name.trim().is_empty() {
            return Err(ValidationError::EmptyModelName);
        }
        let type_code = TypeCode::new(self.type_code.unwrap_or_default())?;
        Ok(DeviceIdentity {
            id,
            model_name,
            type_code,
        })
    }
}
