//! # cozyhub-adapter-cozylife-tcp
//!
//! Talks to CozyLife plugs and switches over their local TCP protocol.
//!
//! ## How it works
//!
//! Each device listens on TCP port 5555 and speaks newline-delimited JSON.
//! A [`TcpDeviceClient`] keeps one connection per device, pairs replies with
//! requests by serial number, and maps transport failures onto the domain
//! fault kinds so the switch adapter can degrade to "unavailable".
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `cozyhub-app` and `cozyhub-domain`.

mod client;
mod config;
mod error;
pub mod protocol;

pub use client::TcpDeviceClient;
pub use config::TcpDeviceConfig;
pub use error::TcpError;
