//! # BFF Test Utilities
//!
//! Shared test utilities for the Pricing BFF service.
//!
//! This crate provides:
//! - A fixed RS256 keypair with its JWK components (reproducible tests)
//! - Builder patterns for provider-style access tokens and user-claims
//!   documents
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bff_test_utils::*;
//!
//! let key = TestRsaKey::primary();
//! let token = AccessTokenBuilder::new("https://idp.test/pool")
//!     .for_subject("principal-001")
//!     .with_username("CORP_jdoe")
//!     .sign(&key);
//! let jwks = jwks_document(&[&key]);
//! ```

pub mod crypto_fixtures;
pub mod token_builders;

pub use crypto_fixtures::*;
pub use token_builders::*;
