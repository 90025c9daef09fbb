use tracing::{debug, error, info};

use super::SharedClient;
use crate::api::ApiError;
use crate::models::water_heater::{max_temp, min_temp};
use crate::models::{Command, WaterHeaterOperation, WaterHeaterState};

pub const DEFAULT_NAME: &str = "Salus water heater";

/// Hot water channel of an iT500 unit.
///
/// The unit reports no water temperature, only whether hot water is on.
pub struct WaterHeater {
    client: SharedClient,
    name: String,
    unique_id: String,
    operation: Option<WaterHeaterOperation>,
    available: bool,
}

impl WaterHeater {
    pub async fn new(client: SharedClient, name: Option<String>) -> Self {
        let device_id = client.lock().await.device_id().to_string();
        Self {
            client,
            name: name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            unique_id: format!("salus_it500_{}_water_heater", device_id),
            operation: None,
            available: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub fn current_operation(&self) -> Option<WaterHeaterOperation> {
        self.operation
    }

    pub fn operation_list(&self) -> &'static [WaterHeaterOperation] {
        &WaterHeaterOperation::ALL
    }

    pub fn min_temp(&self) -> f64 {
        min_temp()
    }

    pub fn max_temp(&self) -> f64 {
        max_temp()
    }

    /// Stand-in reading: the max limit while on, the min limit otherwise
    pub fn current_temperature(&self) -> f64 {
        match self.operation {
            Some(WaterHeaterOperation::On) => max_temp(),
            _ => min_temp(),
        }
    }

    /// Poll the portal. Failures are logged and leave the heater unavailable.
    pub async fn update(&mut self) {
        if let Err(e) = self.refresh().await {
            error!(water_heater = %self.name, error = %e, "Failed to update water heater");
            self.available = false;
        }
    }

    pub async fn refresh(&mut self) -> Result<WaterHeaterState, ApiError> {
        let values = self.client.lock().await.fetch_values().await?;
        let state = WaterHeaterState::from_values(&values)?;
        self.operation = Some(state.operation);
        self.available = true;
        Ok(state)
    }

    pub async fn turn_on(&mut self) -> Result<(), ApiError> {
        self.apply(WaterHeaterOperation::On).await
    }

    pub async fn turn_off(&mut self) -> Result<(), ApiError> {
        self.apply(WaterHeaterOperation::Off).await
    }

    /// Switch hot water, skipping the request when already in that mode
    pub async fn set_operation_mode(&mut self, operation: WaterHeaterOperation) -> Result<(), ApiError> {
        if self.operation == Some(operation) {
            debug!(water_heater = %self.name, %operation, "Already in requested mode");
            return Ok(());
        }
        self.apply(operation).await
    }

    async fn apply(&mut self, operation: WaterHeaterOperation) -> Result<(), ApiError> {
        self.client
            .lock()
            .await
            .send(Command::hot_water(operation))
            .await?;

        info!(water_heater = %self.name, %operation, "Hot water switched");
        self.operation = Some(operation);
        Ok(())
    }
}
