//! Client library for Salus iT500 thermostats and hot water controllers.
//!
//! The iT500 is driven through the salus-it500.com web portal. This crate
//! logs in through the portal's form, keeps the scraped session token in
//! memory and exposes the heating zone and hot water channel of a unit as
//! [`devices::Thermostat`] and [`devices::WaterHeater`].

pub mod api;
pub mod auth;
pub mod config;
pub mod devices;
pub mod models;

pub use api::{ApiError, ClientOptions, SalusClient};
pub use auth::{CredentialStore, Credentials};
pub use config::Config;
