//! Service layer for the Pricing BFF.
//!
//! This module contains the HTTP clients for the downstream systems the
//! BFF proxies.
//!
//! # Components
//!
//! - `cloud_pricing` - Client for the cloud pricing engine
//! - `batch_files` - Client for the batch file service

pub mod batch_files;
pub mod cloud_pricing;

pub use batch_files::BatchServiceClient;
pub use cloud_pricing::CloudPricingClient;
