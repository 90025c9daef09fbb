//! Heating zone state decoded from portal telemetry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DeviceValues;
use crate::api::ApiError;

/// Lowest setpoint the web interface accepts
pub const MIN_TEMP: f64 = 5.0;

/// Highest setpoint the web interface accepts
pub const MAX_TEMP: f64 = 34.5;

const KEY_SET_POINT: &str = "CH1currentSetPoint";
const KEY_ROOM_TEMP: &str = "CH1currentRoomTemp";
const KEY_FROST: &str = "frost";
const KEY_RELAY: &str = "CH1heatOnOffStatus";
const KEY_HEAT_OFF: &str = "CH1heatOnOff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacMode {
    Heat,
    Off,
}

impl HvacMode {
    pub const ALL: [HvacMode; 2] = [HvacMode::Heat, HvacMode::Off];
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HvacMode::Heat => write!(f, "heat"),
            HvacMode::Off => write!(f, "off"),
        }
    }
}

impl FromStr for HvacMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heat" | "on" => Ok(HvacMode::Heat),
            "off" => Ok(HvacMode::Off),
            other => Err(format!("unknown HVAC mode: {}", other)),
        }
    }
}

/// What the boiler relay is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacAction {
    Heating,
    Idle,
}

impl fmt::Display for HvacAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HvacAction::Heating => write!(f, "heating"),
            HvacAction::Idle => write!(f, "idle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatState {
    pub current_temperature: f64,
    pub target_temperature: f64,
    pub frost_temperature: f64,
    /// Boiler relay closed
    pub heating: bool,
    pub mode: HvacMode,
}

impl ThermostatState {
    pub fn from_values(values: &DeviceValues) -> Result<Self, ApiError> {
        // CH1heatOnOff is "1" when the zone is switched off
        let mode = if values.flag(KEY_HEAT_OFF)? {
            HvacMode::Off
        } else {
            HvacMode::Heat
        };

        Ok(Self {
            current_temperature: values.number(KEY_ROOM_TEMP)?,
            target_temperature: values.number(KEY_SET_POINT)?,
            frost_temperature: values.number(KEY_FROST)?,
            heating: values.flag(KEY_RELAY)?,
            mode,
        })
    }

    pub fn action(&self) -> HvacAction {
        if self.heating {
            HvacAction::Heating
        } else {
            HvacAction::Idle
        }
    }
}

/// Reject setpoints the portal would not accept
pub fn validate_setpoint(value: f64) -> Result<f64, ApiError> {
    if value.is_finite() && (MIN_TEMP..=MAX_TEMP).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::TemperatureOutOfRange {
            value,
            min: MIN_TEMP,
            max: MAX_TEMP,
        })
    }
}
