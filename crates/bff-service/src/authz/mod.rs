//! Business-unit authorization for the Pricing BFF.
//!
//! # Components
//!
//! - `registry` - In-memory business-unit snapshot with wholesale reload
//! - `engine` - Role/attribute decision policy and the per-request gate
//! - `roles` - Role constants, privilege classification and hierarchy

pub mod engine;
pub mod registry;
pub mod roles;

pub use engine::AuthorizationEngine;
pub use registry::BusinessUnitRegistry;
pub use roles::RoleHierarchy;
