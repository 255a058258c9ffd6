//! Raw device state payloads and the switch's primary on/off field.
//!
//! CozyLife devices report their state as a flat JSON object keyed by small
//! integers rendered as strings (`{"1": 255, "2": 0}`). A switch only cares
//! about the primary field `"1"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvalidResponseError;

/// Key of the field a switch treats as its on/off value.
pub const POWER_FIELD: &str = "1";
/// Value written to the primary field to turn a switch on.
pub const POWER_ON_VALUE: u8 = 255;
/// Value written to the primary field to turn a switch off.
pub const POWER_OFF_VALUE: u8 = 0;

/// Last-known raw state of a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatePayload(BTreeMap<String, Value>);

impl StatePayload {
    /// An empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload that sets only the primary field for the requested power state.
    #[must_use]
    pub fn power(on: bool) -> Self {
        let value = if on { POWER_ON_VALUE } else { POWER_OFF_VALUE };
        Self::new().with_field(POWER_FIELD, value)
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `other` into `self`, overwriting existing keys.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// On/off value of the primary field, or `None` when the field is absent.
    ///
    /// Numbers are on when non-zero and booleans map directly; any other
    /// present value counts as on.
    #[must_use]
    pub fn power_state(&self) -> Option<bool> {
        self.field(POWER_FIELD).map(|value| match value {
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::Bool(b) => *b,
            _ => true,
        })
    }

    /// Accept a raw device reply as a switch state.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidResponseError`] when `value` is not a JSON object,
    /// is empty, or lacks the primary field.
    pub fn parse_switch_state(value: Value) -> Result<(Self, bool), InvalidResponseError> {
        let payload = Self::try_from(value)?;
        if payload.is_empty() {
            return Err(InvalidResponseError::Empty);
        }
        let on = payload
            .power_state()
            .ok_or(InvalidResponseError::MissingField(POWER_FIELD))?;
        Ok((payload, on))
    }
}

impl TryFrom<Value> for StatePayload {
    type Error = InvalidResponseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map.into_iter().collect())),
            Value::Null => Err(InvalidResponseError::NotAnObject("null")),
            Value::Bool(_) => Err(InvalidResponseError::NotAnObject("bool")),
            Value::Number(_) => Err(InvalidResponseError::NotAnObject("number")),
            Value::String(_) => Err(InvalidResponseError::NotAnObject("string")),
            Value::Array(_) => Err(InvalidResponseError::NotAnObject("array")),
        }
    }
}

impl From<StatePayload> for Value {
    fn from(payload: StatePayload) -> Self {
        Value::Object(payload.0.into_iter().collect())
    }
}
