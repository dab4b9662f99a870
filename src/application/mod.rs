//! Application layer: the metric-derivation engine.
//!
//! - [`report`] - Pool and server reporters (table-driven per-entity metrics)
//! - [`rollup`] - Grand totals and per-pool totals from one tree walk
//! - [`collector`] - Runs the reporters and the rollup for one cycle

pub mod collector;
pub mod report;
pub mod rollup;

pub use collector::{collect, CollectOptions};
pub use report::ServerNaming;
pub use rollup::Rollup;
