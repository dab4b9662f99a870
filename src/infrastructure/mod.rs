//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, wiring and the collection loop.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`runtime`] - Collection cycle and interval loop

pub mod bootstrap;
pub mod config;
pub mod runtime;

pub use runtime::Runtime;
