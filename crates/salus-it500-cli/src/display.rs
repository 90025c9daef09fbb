//! Plain-text and JSON rendering of device state.

use salus_it500_core::models::{ThermostatState, WaterHeaterOperation};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub device_id: String,
    pub thermostat: Option<ThermostatState>,
    pub hot_water: Option<WaterHeaterOperation>,
}

/// Format a temperature for display
pub fn format_temp(celsius: f64) -> String {
    format!("{:.1}°C", celsius)
}

pub fn render_text(report: &StatusReport) -> String {
    let mut lines = vec![format!("Device {}", report.device_id)];

    match report.thermostat {
        Some(ref t) => {
            lines.push(format!(
                "  Room        {} (target {}, frost {})",
                format_temp(t.current_temperature),
                format_temp(t.target_temperature),
                format_temp(t.frost_temperature)
            ));
            lines.push(format!("  Heating     {} ({})", t.mode, t.action()));
        }
        None => lines.push("  Heating     unavailable".to_string()),
    }

    match report.hot_water {
        Some(op) => lines.push(format!("  Hot water   {}", op)),
        None => lines.push("  Hot water   unavailable".to_string()),
    }

    lines.join("\n")
}

pub fn render_json(report: &StatusReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use salus_it500_core::models::HvacMode;

    fn report() -> StatusReport {
        StatusReport {
            device_id: "STA001".to_string(),
            thermostat: Some(ThermostatState {
                current_temperature: 19.25,
                target_temperature: 21.0,
                frost_temperature: 7.0,
                heating: true,
                mode: HvacMode::Heat,
            }),
            hot_water: Some(WaterHeaterOperation::Off),
        }
    }

    #[test]
    fn test_format_temp() {
        assert_eq!(format_temp(21.0), "21.0°C");
        assert_eq!(format_temp(34.5), "34.5°C");
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&report());
        assert!(text.starts_with("Device STA001"));
        assert!(text.contains("target 21.0°C"));
        assert!(text.contains("heat (heating)"));
        assert!(text.contains("Hot water   off"));
    }

    #[test]
    fn test_render_text_unavailable() {
        let text = render_text(&StatusReport {
            device_id: "STA001".to_string(),
            thermostat: None,
            hot_water: None,
        });
        assert!(text.contains("Heating     unavailable"));
        assert!(text.contains("Hot water   unavailable"));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["thermostat"]["mode"], "heat");
        assert_eq!(value["hot_water"], "off");
    }
}
