//! Switch snapshot — the host-visible view of one switch.

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;
use crate::time::Timestamp;

/// Discrete state a host shows for a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchState {
    On,
    Off,
    Unavailable,
}

impl std::fmt::Display for SwitchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Point-in-time copy of a switch's visible state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchSnapshot {
    pub unique_id: DeviceId,
    pub name: String,
    pub is_on: bool,
    pub available: bool,
    /// Time of the last refresh attempt, if any.
    pub updated_at: Option<Timestamp>,
}

impl SwitchSnapshot {
    /// Collapse the two flags into what a host UI would display.
    #[must_use]
    pub fn state(&self) -> SwitchState {
        match (self.available, self.is_on) {
            (false, _) => SwitchState::Unavailable,
            (true, true) => SwitchState::On,
            (true, false) => SwitchState::Off,
        }
    }

    /// Whether `other` differs in anything a host would display.
    #[must_use]
    pub fn visibly_differs(&self, other: &Self) -> bool {
        self.is_on != other.is_on || self.available != other.available
    }
}
