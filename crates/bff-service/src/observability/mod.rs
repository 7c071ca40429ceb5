//! Observability for the Pricing BFF.

pub mod metrics;
