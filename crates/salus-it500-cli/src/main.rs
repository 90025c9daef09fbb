//! Salus CLI - control a Salus iT500 thermostat from the command line.
//!
//! Reads and changes the heating setpoint, heating mode and hot water
//! through the salus-it500.com portal.

mod display;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use salus_it500_core::config::{ENV_DEVICE_ID, ENV_PASSWORD, ENV_USERNAME};
use salus_it500_core::devices::{self, SharedClient, Thermostat, WaterHeater};
use salus_it500_core::models::{HvacMode, WaterHeaterOperation};
use salus_it500_core::{Config, CredentialStore, Credentials, SalusClient};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use display::{render_json, render_text, StatusReport};

/// Control a Salus iT500 thermostat and hot water.
#[derive(Parser, Debug)]
#[command(name = "salus")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Portal login (e-mail address).
    #[arg(short, long, global = true, env = ENV_USERNAME)]
    username: Option<String>,

    /// Device id as shown on the portal.
    #[arg(short, long, global = true, env = ENV_DEVICE_ID)]
    device_id: Option<String>,

    /// Config file to use instead of the default location.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show thermostat and hot water state.
    Status {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Change the heating setpoint.
    SetTemp {
        /// Target temperature in °C (5 to 34.5).
        celsius: f64,
    },
    /// Switch heating on (heat) or off.
    Mode {
        mode: HvacMode,
    },
    /// Boost hot water once (on) or switch it off.
    HotWater {
        operation: WaterHeaterOperation,
    },
    /// Poll the device until interrupted.
    Watch {
        /// Seconds between polls; defaults to the configured scan interval.
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
        /// Print JSON lines instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Store the portal password in the OS keychain.
    Login,
    /// Remove the stored password.
    Logout,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing();

    let mut config = match args.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();
    if let Some(ref username) = args.username {
        config.username = Some(username.clone());
    }
    if let Some(ref device_id) = args.device_id {
        config.device_id = Some(device_id.clone());
    }

    match args.command {
        Command::Login => login(&config),
        Command::Logout => logout(&config),
        Command::Status { json } => {
            let unit = Unit::connect(&config).await?;
            status(unit, json).await
        }
        Command::SetTemp { celsius } => {
            let mut unit = Unit::connect(&config).await?;
            unit.thermostat.set_temperature(celsius).await?;
            println!("Setpoint set to {}", display::format_temp(celsius));
            Ok(())
        }
        Command::Mode { mode } => {
            let mut unit = Unit::connect(&config).await?;
            unit.thermostat.set_hvac_mode(mode).await?;
            println!("Heating mode set to {}", mode);
            Ok(())
        }
        Command::HotWater { operation } => {
            let mut unit = Unit::connect(&config).await?;
            match operation {
                WaterHeaterOperation::On => unit.water_heater.turn_on().await?,
                WaterHeaterOperation::Off => unit.water_heater.turn_off().await?,
            }
            println!("Hot water {}", operation);
            Ok(())
        }
        Command::Watch { interval, json } => {
            let every = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.scan_interval());
            let unit = Unit::connect(&config).await?;
            watch(unit, every, json).await
        }
    }
}

/// Both facades of one iT500, sharing a session.
struct Unit {
    device_id: String,
    thermostat: Thermostat,
    water_heater: WaterHeater,
}

impl Unit {
    async fn connect(config: &Config) -> Result<Self> {
        let username = require_username(config)?;
        let device_id = config
            .device_id
            .clone()
            .context("No device id configured; pass --device-id or set SALUS_DEVICE_ID")?;
        let password = resolve_password(&username)?;

        let client = SalusClient::with_options(
            Credentials::new(username, password),
            device_id.clone(),
            config.client_options(),
        )
        .context("Failed to create HTTP client")?;
        let client: SharedClient = devices::shared(client);

        Ok(Self {
            device_id,
            thermostat: Thermostat::new(client.clone(), config.thermostat_name.clone()).await,
            water_heater: WaterHeater::new(client, config.water_heater_name.clone()).await,
        })
    }

    async fn poll(&mut self) -> StatusReport {
        self.thermostat.update().await;
        self.water_heater.update().await;

        StatusReport {
            device_id: self.device_id.clone(),
            thermostat: self
                .thermostat
                .available()
                .then(|| self.thermostat.state().cloned())
                .flatten(),
            hot_water: self
                .water_heater
                .available()
                .then(|| self.water_heater.current_operation())
                .flatten(),
        }
    }
}

async fn status(mut unit: Unit, json: bool) -> Result<()> {
    let report = unit.poll().await;
    if report.thermostat.is_none() && report.hot_water.is_none() {
        anyhow::bail!("Could not read device {} from the Salus portal", unit.device_id);
    }
    print_report(&report, json)
}

async fn watch(mut unit: Unit, every: Duration, json: bool) -> Result<()> {
    info!(device_id = %unit.device_id, interval_secs = every.as_secs(), "Watching device");

    loop {
        let report = unit.poll().await;
        print_report(&report, json)?;

        tokio::select! {
            _ = tokio::time::sleep(every) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                return Ok(());
            }
        }
    }
}

fn print_report(report: &StatusReport, json: bool) -> Result<()> {
    if json {
        println!("{}", render_json(report)?);
    } else {
        println!("{}", render_text(report));
    }
    Ok(())
}

fn require_username(config: &Config) -> Result<String> {
    config
        .username
        .clone()
        .context("No username configured; pass --username or set SALUS_USERNAME")
}

/// Environment first, then the keychain, then ask.
fn resolve_password(username: &str) -> Result<String> {
    if let Ok(password) = std::env::var(ENV_PASSWORD) {
        if !password.is_empty() {
            return Ok(password);
        }
    }

    match CredentialStore::get_password(username) {
        Ok(password) => Ok(password),
        Err(e) => {
            warn!(error = %e, "No stored password, prompting");
            prompt_password(username)
        }
    }
}

fn prompt_password(username: &str) -> Result<String> {
    let password = rpassword::prompt_password(format!("Salus password for {}: ", username))
        .context("Failed to read password")?;
    if password.is_empty() {
        anyhow::bail!("Empty password");
    }
    Ok(password)
}

fn login(config: &Config) -> Result<()> {
    let username = require_username(config)?;
    let password = prompt_password(&username)?;
    CredentialStore::store(&username, &password)?;
    println!("Password for {} stored in keychain", username);
    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let username = require_username(config)?;
    CredentialStore::delete(&username)?;
    println!("Password for {} removed from keychain", username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_temp() {
        let args = Args::try_parse_from(["salus", "--device-id", "STA1", "set-temp", "21.5"]).unwrap();
        assert_eq!(args.device_id.as_deref(), Some("STA1"));
        assert!(matches!(args.command, Command::SetTemp { celsius } if celsius == 21.5));
    }

    #[test]
    fn test_parse_mode_and_hot_water() {
        let args = Args::try_parse_from(["salus", "mode", "off"]).unwrap();
        assert!(matches!(args.command, Command::Mode { mode: HvacMode::Off }));

        let args = Args::try_parse_from(["salus", "hot-water", "on"]).unwrap();
        assert!(matches!(
            args.command,
            Command::HotWater { operation: WaterHeaterOperation::On }
        ));

        assert!(Args::try_parse_from(["salus", "mode", "cool"]).is_err());
    }

    #[test]
    fn test_parse_watch_options() {
        let args = Args::try_parse_from(["salus", "watch", "--interval", "30", "--json"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Watch { interval: Some(30), json: true }
        ));
        // A zero interval would hammer the portal
        assert!(Args::try_parse_from(["salus", "watch", "--interval", "0"]).is_err());
    }

    #[test]
    fn test_require_username() {
        let config = Config::default();
        assert!(require_username(&config).is_err());

        let config = Config {
            username: Some("me@example.com".into()),
            ..Config::default()
        };
        assert_eq!(require_username(&config).unwrap(), "me@example.com");
    }
}
