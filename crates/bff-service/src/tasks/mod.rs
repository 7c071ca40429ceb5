//! Background tasks for the Pricing BFF.

pub mod registry_reload;

pub use registry_reload::spawn_registry_reload;
