//! Middleware for the Pricing BFF.
//!
//! # Components
//!
//! - `auth` - Request gatekeeper: allowlist, token validation, identity
//!   context attachment

pub mod auth;

pub use auth::{gatekeeper, GatekeeperState, HEALTH_CHECK_PATH, LOGIN_PATH, LOGOUT_PATH, STATUS_PATH};
