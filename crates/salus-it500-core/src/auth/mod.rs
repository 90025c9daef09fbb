//! Authentication module for portal sessions and credentials.
//!
//! This module provides:
//! - `Session`: the scraped token, held in memory only
//! - `Credentials`: username/password pair for the login form
//! - `CredentialStore`: OS-level password storage via keyring

pub mod credentials;
pub mod session;

pub use credentials::{CredentialStore, Credentials};
pub use session::Session;
