//! Device facades over a shared `SalusClient`.
//!
//! One iT500 unit exposes a heating zone and a hot water channel. Both
//! facades read the same telemetry endpoint and post to the same set
//! endpoint, so they share one client (and one session) per unit.

pub mod thermostat;
pub mod water_heater;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::SalusClient;

pub use thermostat::Thermostat;
pub use water_heater::WaterHeater;

/// A client shared between the facades of one unit. The mutex keeps a
/// single request in flight per session.
pub type SharedClient = Arc<Mutex<SalusClient>>;

pub fn shared(client: SalusClient) -> SharedClient {
    Arc::new(Mutex::new(client))
}
