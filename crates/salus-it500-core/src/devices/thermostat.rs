use tracing::{error, info};

use super::SharedClient;
use crate::api::ApiError;
use crate::models::thermostat::{validate_setpoint, MAX_TEMP, MIN_TEMP};
use crate::models::{Command, HvacAction, HvacMode, ThermostatState};

pub const DEFAULT_NAME: &str = "Salus thermostat";

/// Heating zone of an iT500 unit.
pub struct Thermostat {
    client: SharedClient,
    name: String,
    unique_id: String,
    state: Option<ThermostatState>,
    available: bool,
}

impl Thermostat {
    pub async fn new(client: SharedClient, name: Option<String>) -> Self {
        let device_id = client.lock().await.device_id().to_string();
        Self {
            client,
            name: name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            unique_id: format!("salus_it500_{}_thermostat", device_id),
            state: None,
            available: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// True once an update has succeeded, false again after one fails
    pub fn available(&self) -> bool {
        self.available
    }

    pub fn state(&self) -> Option<&ThermostatState> {
        self.state.as_ref()
    }

    pub fn current_temperature(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.current_temperature)
    }

    pub fn target_temperature(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.target_temperature)
    }

    pub fn hvac_mode(&self) -> HvacMode {
        self.state.as_ref().map(|s| s.mode).unwrap_or(HvacMode::Off)
    }

    pub fn hvac_modes(&self) -> &'static [HvacMode] {
        &HvacMode::ALL
    }

    pub fn hvac_action(&self) -> HvacAction {
        self.state
            .as_ref()
            .map(ThermostatState::action)
            .unwrap_or(HvacAction::Idle)
    }

    pub fn min_temp(&self) -> f64 {
        MIN_TEMP
    }

    pub fn max_temp(&self) -> f64 {
        MAX_TEMP
    }

    /// Poll the portal. Failures are logged and leave the thermostat unavailable.
    pub async fn update(&mut self) {
        if let Err(e) = self.refresh().await {
            error!(thermostat = %self.name, error = %e, "Failed to update thermostat");
            self.available = false;
        }
    }

    /// Poll the portal and surface any error to the caller
    pub async fn refresh(&mut self) -> Result<ThermostatState, ApiError> {
        let values = self.client.lock().await.fetch_values().await?;
        let state = ThermostatState::from_values(&values)?;
        self.state = Some(state.clone());
        self.available = true;
        Ok(state)
    }

    pub async fn set_temperature(&mut self, temperature: f64) -> Result<(), ApiError> {
        validate_setpoint(temperature)?;
        self.client
            .lock()
            .await
            .send(Command::SetTemperature(temperature))
            .await?;

        info!(thermostat = %self.name, temperature, "Setpoint changed");
        if let Some(state) = self.state.as_mut() {
            state.target_temperature = temperature;
        }
        Ok(())
    }

    pub async fn set_hvac_mode(&mut self, mode: HvacMode) -> Result<(), ApiError> {
        self.client
            .lock()
            .await
            .send(Command::SetHvacMode(mode))
            .await?;

        info!(thermostat = %self.name, %mode, "HVAC mode changed");
        if let Some(state) = self.state.as_mut() {
            state.mode = mode;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClientOptions, SalusClient};
    use crate::auth::Credentials;
    use crate::devices::shared;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    const VALUES_JSON: &str = r#"{"CH1currentSetPoint":"20.5","CH1currentRoomTemp":"18.0",
        "frost":"6.0","CH1heatOnOffStatus":"0","CH1heatOnOff":"1"}"#;

    fn client(base_url: String) -> SharedClient {
        let options = ClientOptions {
            base_url,
            retry_delay: Duration::ZERO,
            max_attempts: 2,
            ..ClientOptions::default()
        };
        let mut client =
            SalusClient::with_options(Credentials::new("a@b.c", "pw"), "777", options).unwrap();
        client.set_token("tok".to_string());
        shared(client)
    }

    #[tokio::test]
    async fn test_defaults_before_update() {
        let server = Server::new_async().await;
        let thermostat = Thermostat::new(client(server.url()), None).await;

        assert_eq!(thermostat.name(), DEFAULT_NAME);
        assert_eq!(thermostat.unique_id(), "salus_it500_777_thermostat");
        assert!(!thermostat.available());
        assert_eq!(thermostat.hvac_mode(), HvacMode::Off);
        assert_eq!(thermostat.hvac_action(), HvacAction::Idle);
        assert_eq!(thermostat.hvac_modes(), &[HvacMode::Heat, HvacMode::Off]);
        assert_eq!(thermostat.current_temperature(), None);
    }

    #[tokio::test]
    async fn test_update_and_commands() {
        let mut server = Server::new_async().await;
        let _values = server
            .mock("GET", "/public/ajax_device_values.php")
            .match_query(Matcher::UrlEncoded("token".into(), "tok".into()))
            .with_body(VALUES_JSON)
            .create_async()
            .await;
        let set_mode = server
            .mock("POST", "/includes/set.php")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("auto".into(), "0".into()),
                Matcher::UrlEncoded("auto_setZ1".into(), "1".into()),
            ]))
            .expect(1)
            .create_async()
            .await;

        let mut thermostat = Thermostat::new(client(server.url()), Some("Hall".into())).await;
        thermostat.update().await;

        assert!(thermostat.available());
        assert_eq!(thermostat.target_temperature(), Some(20.5));
        assert_eq!(thermostat.hvac_mode(), HvacMode::Off);

        thermostat.set_hvac_mode(HvacMode::Heat).await.unwrap();
        assert_eq!(thermostat.hvac_mode(), HvacMode::Heat);
        set_mode.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_failure_marks_unavailable() {
        let mut server = Server::new_async().await;
        let _values = server
            .mock("GET", "/public/ajax_device_values.php")
            .match_query(Matcher::Any)
            .with_body(VALUES_JSON)
            .expect(1)
            .create_async()
            .await;

        let shared_client = client(server.url());
        let mut thermostat = Thermostat::new(shared_client.clone(), None).await;
        thermostat.update().await;
        assert!(thermostat.available());

        // Token gone and the login page is unreachable
        server.reset_async().await;
        shared_client.lock().await.logout();
        thermostat.update().await;

        assert!(!thermostat.available());
        // Last known state is kept
        assert_eq!(thermostat.current_temperature(), Some(18.0));
    }

    #[tokio::test]
    async fn test_set_temperature_out_of_range() {
        let server = Server::new_async().await;
        let mut thermostat = Thermostat::new(client(server.url()), None).await;
        let err = thermostat.set_temperature(2.0).await.unwrap_err();
        assert!(matches!(err, ApiError::TemperatureOutOfRange { .. }));
    }
}
