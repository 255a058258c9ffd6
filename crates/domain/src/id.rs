//! Typed string newtypes for identifiers reported by devices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_str_id {
    ($(#[doc = $doc:expr])* $name:ident, $empty:expr) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw value, rejecting empty or whitespace-only input.
            ///
            /// # Errors
            ///
            /// Returns a [`ValidationError`] if `value` is blank.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err($empty);
                }
                Ok(Self(value))
            }

            /// Borrow the inner string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_str_id!(
    /// Stable identifier a device reports for itself (CozyLife `did`).
    DeviceId,
    ValidationError::EmptyDeviceId
);

define_str_id!(
    /// Two-character CozyLife device category code (e.g. `"00"` for switches).
    TypeCode,
    ValidationError::EmptyTypeCode
);

impl DeviceId {
    /// Last four characters of the id, used to tell devices of the same
    /// model apart in display names.
    #[must_use]
    pub fn short_suffix(&self) -> &str {
        let start = self
            .0
            .char_indices()
            .rev()
            .nth(3)
            .map_or(0, |(idx, _)| idx);
        &self.0[start..]
    }
}
