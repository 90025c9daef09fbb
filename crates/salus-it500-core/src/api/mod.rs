//! Web client module for the salus-it500.com portal.
//!
//! This module provides the `SalusClient` for logging in, reading
//! device telemetry and pushing setpoint/mode changes.
//!
//! The portal has no documented API. A session token is scraped from
//! the device control page after a form login, and must accompany
//! every data and set request.

pub mod client;
pub mod error;

pub use client::{ClientOptions, SalusClient, DEFAULT_BASE_URL, MAX_ATTEMPTS};
pub use error::ApiError;
