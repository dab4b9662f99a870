//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`snapshot`] - Builders for snapshot trees and a realistic stats payload.
//! - [`config`] - Canonical agent configurations.

pub mod config;
pub mod snapshot;
