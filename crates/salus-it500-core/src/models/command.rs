use std::fmt;

use super::{HvacMode, WaterHeaterOperation};

/// A change request for `includes/set.php`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// New zone 1 setpoint in °C
    SetTemperature(f64),
    SetHvacMode(HvacMode),
    /// One-off hot water boost
    HotWaterOnce,
    HotWaterOff,
}

impl Command {
    pub fn hot_water(operation: WaterHeaterOperation) -> Self {
        match operation {
            WaterHeaterOperation::On => Command::HotWaterOnce,
            WaterHeaterOperation::Off => Command::HotWaterOff,
        }
    }

    /// Form fields sent alongside `token` and `devId`
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Command::SetTemperature(t) => vec![
                ("tempUnit", "0".to_string()),
                ("current_tempZ1_set", "1".to_string()),
                ("current_tempZ1", t.to_string()),
            ],
            Command::SetHvacMode(HvacMode::Off) => vec![
                ("auto", "1".to_string()),
                ("auto_setZ1", "1".to_string()),
            ],
            Command::SetHvacMode(HvacMode::Heat) => vec![
                ("auto", "0".to_string()),
                ("auto_setZ1", "1".to_string()),
            ],
            Command::HotWaterOnce => vec![("hwmode_once", "1".to_string())],
            Command::HotWaterOff => vec![("hwmode_off", "1".to_string())],
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetTemperature(t) => write!(f, "set temperature {}", t),
            Command::SetHvacMode(mode) => write!(f, "set hvac mode {}", mode),
            Command::HotWaterOnce => write!(f, "hot water once"),
            Command::HotWaterOff => write!(f, "hot water off"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_temperature_fields() {
        let fields = Command::SetTemperature(21.5).form_fields();
        assert_eq!(
            fields,
            vec![
                ("tempUnit", "0".to_string()),
                ("current_tempZ1_set", "1".to_string()),
                ("current_tempZ1", "21.5".to_string()),
            ]
        );
        // Whole numbers go out without a trailing fraction
        assert_eq!(Command::SetTemperature(20.0).form_fields()[2].1, "20");
    }

    #[test]
    fn test_hvac_mode_fields() {
        assert_eq!(Command::SetHvacMode(HvacMode::Off).form_fields()[0], ("auto", "1".to_string()));
        assert_eq!(Command::SetHvacMode(HvacMode::Heat).form_fields()[0], ("auto", "0".to_string()));
    }

    #[test]
    fn test_hot_water_fields() {
        assert_eq!(
            Command::hot_water(WaterHeaterOperation::On).form_fields(),
            vec![("hwmode_once", "1".to_string())]
        );
        assert_eq!(
            Command::hot_water(WaterHeaterOperation::Off).form_fields(),
            vec![("hwmode_off", "1".to_string())]
        );
    }
}
