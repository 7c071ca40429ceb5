//! Data access for the Pricing BFF.

pub mod business_units;

pub use business_units::{BusinessUnitStore, PgBusinessUnitStore};

// In-memory store for tests (exposed for integration tests)
#[allow(unused_imports)]
pub use business_units::mock;
