//! Web client for the salus-it500.com portal.
//!
//! This module provides the `SalusClient` struct which logs in through
//! the public web form, scrapes the session token and reads or changes
//! device state with it.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::auth::{Credentials, Session};
use crate::models::thermostat::validate_setpoint;
use crate::models::{Command, DeviceValues};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Portal root. Every endpoint below is relative to it.
pub const DEFAULT_BASE_URL: &str = "https://salus-it500.com";

const LOGIN_PATH: &str = "/public/login.php";
const CONTROL_PATH: &str = "/public/control.php";
const VALUES_PATH: &str = "/public/ajax_device_values.php";
const SET_PATH: &str = "/includes/set.php";

/// Attempts per operation before giving up, counting the first one.
pub const MAX_ATTEMPTS: u32 = 11;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fixed pause between attempts. Linear, never grows.
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input id="token" type="hidden" value="([^"]*)"\s*/?>"#)
        .expect("Invalid token regex")
});

/// Pull the session token out of the device control page.
pub fn extract_token(html: &str) -> Option<String> {
    TOKEN_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|token| !token.is_empty())
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub request_timeout: Duration,
    pub retry_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

/// Client for one Salus device.
///
/// Holds the only session for that device; every call needs `&mut self`,
/// so at most one request is in flight per session.
pub struct SalusClient {
    client: Client,
    options: ClientOptions,
    credentials: Credentials,
    device_id: String,
    session: Session,
}

impl SalusClient {
    /// Create a client against the public portal
    pub fn new(credentials: Credentials, device_id: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_options(credentials, device_id, ClientOptions::default())
    }

    pub fn with_options(
        credentials: Credentials,
        device_id: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ApiError> {
        // The login form answers with a PHP session cookie that the
        // control page needs.
        let client = Client::builder()
            .timeout(options.request_timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            options,
            credentials,
            device_id: device_id.into(),
            session: Session::new(),
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Reuse a token obtained elsewhere instead of logging in
    pub fn set_token(&mut self, token: String) {
        self.session.update(token);
    }

    /// Forget the token; the next call logs in again
    pub fn logout(&mut self) {
        self.session.clear();
    }

    /// Log in and scrape a fresh session token, retrying on failure
    pub async fn authenticate(&mut self) -> Result<(), ApiError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.login_and_scrape().await {
                Ok(token) => {
                    info!(device_id = %self.device_id, attempt, "Token obtained");
                    self.session.update(token);
                    self.session.record_success();
                    return Ok(());
                }
                Err(e) => {
                    self.session.clear();
                    self.after_failure("authenticate", attempt, e).await?;
                }
            }
        }
    }

    /// Fetch the raw telemetry for the device
    pub async fn fetch_values(&mut self) -> Result<DeviceValues, ApiError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_fetch_values().await {
                Ok(values) => {
                    self.session.record_success();
                    return Ok(values);
                }
                Err(e) => {
                    self.session.clear();
                    self.after_failure("fetch device values", attempt, e).await?;
                }
            }
        }
    }

    /// Push a change to the device
    pub async fn send(&mut self, command: Command) -> Result<(), ApiError> {
        if let Command::SetTemperature(t) = command {
            validate_setpoint(t)?;
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_send(&command).await {
                Ok(()) => {
                    debug!(device_id = %self.device_id, %command, "Command accepted");
                    self.session.record_success();
                    return Ok(());
                }
                Err(e) => {
                    self.session.clear();
                    self.after_failure("send command", attempt, e).await?;
                }
            }
        }
    }

    // ===== Single attempts =====

    async fn login_and_scrape(&self) -> Result<String, ApiError> {
        let login_url = self.url(LOGIN_PATH);
        debug!(url = %login_url, "Logging in");

        let response = self
            .client
            .post(&login_url)
            .form(&[
                ("IDemail", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
                ("login", "Login"),
                ("keep_logged_in", "1"),
            ])
            .send()
            .await?;
        Self::check_response(response).await?;

        let control_url = self.url(CONTROL_PATH);
        let response = self
            .client
            .get(&control_url)
            .query(&[("devId", self.device_id.as_str())])
            .send()
            .await?;
        let page = Self::check_response(response).await?.text().await?;

        extract_token(&page).ok_or_else(|| ApiError::TokenNotFound(self.device_id.clone()))
    }

    /// Current token, logging in first when there is none
    async fn token_or_login(&mut self) -> Result<String, ApiError> {
        if let Some(token) = self.session.token() {
            return Ok(token.to_string());
        }

        let token = self.login_and_scrape().await?;
        info!(device_id = %self.device_id, "Token obtained");
        self.session.update(token.clone());
        Ok(token)
    }

    async fn try_fetch_values(&mut self) -> Result<DeviceValues, ApiError> {
        let token = self.token_or_login().await?;
        let url = self.url(VALUES_PATH);
        // Cache buster, as the portal's own page sends it
        let timestamp = Utc::now().timestamp_millis().to_string();

        debug!(url = %url, device_id = %self.device_id, "Fetching device values");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("devId", self.device_id.as_str()),
                ("token", token.as_str()),
                ("_", timestamp.as_str()),
            ])
            .send()
            .await?;

        let body = Self::check_response(response).await?.text().await?;
        DeviceValues::from_json(&body)
    }

    async fn try_send(&mut self, command: &Command) -> Result<(), ApiError> {
        let token = self.token_or_login().await?;
        let url = self.url(SET_PATH);

        let mut form: Vec<(&str, String)> = vec![
            ("token", token),
            ("devId", self.device_id.clone()),
        ];
        form.extend(command.form_fields());

        debug!(url = %url, device_id = %self.device_id, %command, "Sending command");
        let response = self.client.post(&url).form(&form).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Helpers =====

    /// Record a failed attempt. Returns `Err` once the attempts are used up,
    /// otherwise waits out the retry delay.
    async fn after_failure(&mut self, op: &str, attempt: u32, err: ApiError) -> Result<(), ApiError> {
        let failures = self.session.record_failure();

        if attempt >= self.options.max_attempts {
            error!(
                device_id = %self.device_id,
                op,
                attempts = attempt,
                error = %err,
                "Giving up, check the connection to the Salus portal"
            );
            return Err(ApiError::RetriesExhausted {
                attempts: attempt,
                last: Box::new(err),
            });
        }

        warn!(device_id = %self.device_id, op, attempt, failures, error = %err, "Attempt failed, retrying");
        if !self.options.retry_delay.is_zero() {
            tokio::time::sleep(self.options.retry_delay).await;
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.options.base_url.trim_end_matches('/'), path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let url = response.url().clone();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &url, &body))
        }
    }
}
