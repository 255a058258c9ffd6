//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`CozyHubError`] at port boundaries via `From`.

/// Boxed source error carried across port boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for everything that crosses a port boundary.
#[derive(Debug, thiserror::Error)]
pub enum CozyHubError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The device could not be reached (connect refused, reset, …).
    #[error("device unreachable")]
    Unreachable(#[source] BoxError),

    /// The device did not answer within the allotted time.
    #[error("device timed out")]
    Timeout,

    /// The device answered with something that is not a usable state.
    #[error("invalid device response")]
    InvalidResponse(#[from] InvalidResponseError),

    /// The conversation with the device broke its framing rules.
    #[error("protocol error")]
    Protocol(#[source] BoxError),
}

impl CozyHubError {
    /// Short, stable label for the fault kind, used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Unreachable(_) => "unreachable",
            Self::Timeout => "timeout",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Protocol(_) => "protocol",
        }
    }

    /// Whether the fault is expected to clear on its own (network blips,
    /// devices rebooting) as opposed to a persistent misbehaviour.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Timeout)
    }
}

/// Domain invariant violations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A device id must not be empty or whitespace.
    #[error("device id must not be empty")]
    EmptyDeviceId,

    /// A model name must not be empty or whitespace.
    #[error("model name must not be empty")]
    EmptyModelName,

    /// A type code must not be empty or whitespace.
    #[error("type code must not be empty")]
    EmptyTypeCode,
}

/// Why a device reply could not be used as a state payload.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidResponseError {
    /// The reply was not a JSON object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The reply was an empty object.
    #[error("state payload is empty")]
    Empty,

    /// The reply did not contain the field this device needs.
    #[error("state payload has no field {0:?}")]
    MissingField(&'static str),
}
