//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod clock;
pub mod device_client;
pub mod switch_entity;
pub mod state_publisher;

pub use clock::{Clock, SystemClock};
pub use device_client::DeviceClient;
pub use state_publisher::StatePublisher;
pub use switch_entity::SwitchEntity;
