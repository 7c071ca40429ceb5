//! Pricing BFF Service Library
//!
//! This library provides the core functionality for the pricing
//! backend-for-frontend - a stateless HTTP gateway responsible for:
//!
//! - Bearer-token authentication against the identity provider's JWKS
//! - Business-unit authorization (role table + transformation-enabled flag)
//! - Proxying cloud-pricing and batch-file downstream APIs
//!
//! # Architecture
//!
//! The service follows the Middleware -> Handler -> Service -> Repository
//! pattern:
//!
//! ```text
//! middleware/auth.rs -> routes/mod.rs -> handlers/*.rs -> services/*.rs
//!                                                      -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - Key cache and token validation
//! - `authz` - Business-unit registry and authorization engine
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Request gatekeeper
//! - `models` - Data models
//! - `observability` - Metrics definitions
//! - `repositories` - Business-unit data access
//! - `routes` - Axum router setup
//! - `services` - Downstream pricing/batch clients
//! - `tasks` - Background maintenance loops

pub mod auth;
pub mod authz;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod tasks;
