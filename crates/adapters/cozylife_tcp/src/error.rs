//! TCP adapter error types.

use cozyhub_domain::error::{CozyHubError, InvalidResponseError, ValidationError};

/// Errors specific to the CozyLife TCP adapter.
#[derive(Debug, thiserror::Error)]
pub enum TcpError {
    /// Opening the TCP connection failed.
    #[error("failed to connect to {addr}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to an open connection failed.
    #[error("device connection error")]
    Io(#[from] std::io::Error),

    /// The device closed the connection mid-conversation.
    #[error("device closed the connection")]
    ConnectionClosed,

    /// The device did not answer in time.
    #[error("device did not answer within {0:?}")]
    Timeout(std::time::Duration),

    /// A reply line was not valid JSON.
    #[error("failed to decode device reply")]
    Decode(#[source] serde_json::Error),

    /// A request could not be serialized.
    #[error("failed to encode request")]
    Encode(#[source] serde_json::Error),

    /// A command field key is not an integer attribute id.
    #[error("field key {0:?} is not a numeric attribute")]
    NonNumericField(String),

    /// The reply matched our request but carried no `msg` body.
    #[error("device reply has no message body")]
    MissingBody,

    /// The info reply did not include a device id.
    #[error("device info reply has no device id")]
    MissingDeviceId,

    /// A domain-level error (validation, …).
    #[error("domain error")]
    Domain(#[source] CozyHubError),
}

impl TcpError {
    /// Convert into the matching [`CozyHubError`] kind for propagation across
    /// port boundaries.
    #[must_use]
    pub fn into_domain(self) -> CozyHubError {
        match self {
            Self::Domain(err) => err,
            Self::Timeout(_) => CozyHubError::Timeout,
            Self::MissingBody => InvalidResponseError::Empty.into(),
            Self::MissingDeviceId => InvalidResponseError::MissingField("did").into(),
            Self::Connect { .. } | Self::Io(_) | Self::ConnectionClosed => {
                CozyHubError::Unreachable(Box::new(self))
            }
            other => CozyHubError::Protocol(Box::new(other)),
        }
    }
}

impl From<TcpError> for CozyHubError {
    fn from(err: TcpError) -> Self {
        err.into_domain()
    }
}

impl From<ValidationError> for TcpError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}
