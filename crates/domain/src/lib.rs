//! # cozyhub-domain
//!
//! Pure domain model for the cozyhub switch bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **device identity** (stable id, model name, type code)
//! - Define the **state payload** reported by a device and how its primary
//!   field maps to an on/off value
//! - Define **switch snapshots** (what the host sees for one switch)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod state;
pub mod switch;
