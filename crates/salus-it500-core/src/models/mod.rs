//! Data models for Salus iT500 telemetry and commands.
//!
//! - `DeviceValues`: raw telemetry map as returned by the portal
//! - `ThermostatState`, `HvacMode`, `HvacAction`: heating zone state
//! - `WaterHeaterState`, `WaterHeaterOperation`: hot water state
//! - `Command`: typed change requests and their form encoding

pub mod command;
pub mod thermostat;
pub mod values;
pub mod water_heater;

pub use command::Command;
pub use thermostat::{HvacAction, HvacMode, ThermostatState};
pub use values::DeviceValues;
pub use water_heater::{WaterHeaterOperation, WaterHeaterState};
