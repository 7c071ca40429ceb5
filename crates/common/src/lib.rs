//! Common utilities shared across the Pricing BFF crates.

#![warn(clippy::pedantic)]

/// Module for JWT utilities (unverified decoding, claims helpers, constants)
pub mod jwt;
