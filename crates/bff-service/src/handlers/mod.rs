//! HTTP request handlers for the Pricing BFF.

pub mod auth;
pub mod batch;
pub mod metrics;
pub mod pricing;
pub mod support;

pub use auth::{login, logout, user_details};
pub use batch::{batch_delete_files, batch_list_files, batch_list_jobs, batch_signed_urls};
pub use metrics::metrics_handler;
pub use pricing::pricing_data;
pub use support::{health_check, status_check};
