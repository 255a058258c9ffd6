//! CozyLife local protocol framing.
//!
//! Each message is one compact JSON object terminated by `\r\n`:
//!
//! ```text
//! {"pv":0,"cmd":2,"sn":"1718000000000","msg":{"attr":[0]}}
//! ```
//!
//! | Command | `cmd` | Request `msg` | Reply `msg` |
//! |---------|-------|---------------|-------------|
//! | Info | 0 | `{}` | `{"did": …, "pid": …}` |
//! | Query | 2 | `{"attr":[0]}` | `{"attr": […], "data": {…}}` |
//! | Set | 3 | `{"attr":[1],"data":{"1":255}}` | optional, may carry `res` |
//!
//! Replies echo the request's `sn`; devices also push unsolicited state
//! lines that carry other serial numbers.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use cozyhub_domain::state::StatePayload;

use crate::error::TcpError;

/// TCP port CozyLife devices listen on.
pub const DEFAULT_PORT: u16 = 5555;

const PROTOCOL_VERSION: u8 = 0;
const LINE_END: &[u8] = b"\r\n";

/// Protocol command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Info,
    Query,
    Set,
}

impl Command {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Info => 0,
            Self::Query => 2,
            Self::Set => 3,
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    pv: u8,
    cmd: u8,
    sn: &'a str,
    msg: Value,
}

/// Build the request body for `command`.
///
/// # Errors
///
/// Returns [`TcpError::NonNumericField`] if a set command carries a key that
/// is not an integer attribute id.
pub fn request_body(command: Command, fields: Option<&StatePayload>) -> Result<Value, TcpError> {
    match command {
        Command::Info => Ok(json!({})),
        Command::Query => Ok(json!({"attr": [0]})),
        Command::Set => {
            let fields = fields.cloned().unwrap_or_default();
            let attr = fields
                .iter()
                .map(|(key, _)| {
                    key.parse::<u32>()
                        .map_err(|_| TcpError::NonNumericField(key.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(json!({"attr": attr, "data": Value::from(fields)}))
        }
    }
}

/// Serialize a request line, terminator included.
///
/// # Errors
///
/// Returns [`TcpError::Encode`] if serialization fails.
pub fn encode(command: Command, sn: &str, msg: Value) -> Result<Vec<u8>, TcpError> {
    let envelope = Envelope {
        pv: PROTOCOL_VERSION,
        cmd: command.code(),
        sn,
        msg,
    };
    let mut line = serde_json::to_vec(&envelope).map_err(TcpError::Encode)?;
    line.extend_from_slice(LINE_END);
    Ok(line)
}

/// A device line that answers one of our requests.
#[derive(Debug, Clone, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub msg: Option<Value>,
    #[serde(default)]
    pub res: Option<i64>,
}

impl Reply {
    /// Whether the device reported success (a missing `res` counts as success).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.res.unwrap_or(0) == 0
    }

    /// The state map of a query reply; `Null` when the body has no `data`.
    ///
    /// # Errors
    ///
    /// Returns [`TcpError::MissingBody`] when the reply has no `msg`.
    pub fn into_data(self) -> Result<Value, TcpError> {
        let msg = self.msg.ok_or(TcpError::MissingBody)?;
        Ok(msg.get("data").cloned().unwrap_or(Value::Null))
    }

    /// The device id of an info reply.
    ///
    /// # Errors
    ///
    /// Returns [`TcpError::MissingBody`] or [`TcpError::MissingDeviceId`].
    pub fn device_id(&self) -> Result<String, TcpError> {
        let msg = self.msg.as_ref().ok_or(TcpError::MissingBody)?;
        msg.get("did")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(TcpError::MissingDeviceId)
    }
}

/// Decode one line (terminator already stripped) if it answers request `sn`.
///
/// Returns `None` for lines that are not JSON or carry another serial; those
/// are never validated further. Devices echo the serial as a string or, on
/// some firmware, a number.
///
/// # Errors
///
/// Returns [`TcpError::Decode`] if the matching line is not a valid reply.
pub fn decode_reply(line: &str, sn: &str) -> Option<Result<Reply, TcpError>> {
    let value: Value = serde_json::from_str(line).ok()?;
    let matches = match value.get("sn") {
        Some(Value::String(s)) => s == sn,
        Some(Value::Number(n)) => n.to_string() == sn,
        _ => false,
    };
    matches.then(|| serde_json::from_value(value).map_err(TcpError::Decode))
}
