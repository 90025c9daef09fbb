use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::ApiError;

/// Raw telemetry object from `ajax_device_values.php`.
///
/// The portal sends almost every field as a JSON string (`"21.5"`, `"1"`),
/// so the map is kept as-is and read through typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceValues(Map<String, Value>);

impl DeviceValues {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Parse a response body. Anything but a JSON object is rejected.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(ApiError::InvalidResponse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(ApiError::InvalidResponse(format!(
                "device values are not JSON: {}",
                e
            ))),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Field as text; numbers and booleans are rendered, null is absent
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            _ => None,
        }
    }

    /// Required numeric field
    pub fn number(&self, key: &str) -> Result<f64, ApiError> {
        let raw = self
            .text(key)
            .ok_or_else(|| ApiError::InvalidResponse(format!("missing field {}", key)))?;
        raw.parse::<f64>().map_err(|_| {
            ApiError::InvalidResponse(format!("field {} is not a number: {:?}", key, raw))
        })
    }

    /// Required on/off field, where `"1"` means set
    pub fn flag(&self, key: &str) -> Result<bool, ApiError> {
        self.text(key)
            .map(|v| v == "1")
            .ok_or_else(|| ApiError::InvalidResponse(format!("missing field {}", key)))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
