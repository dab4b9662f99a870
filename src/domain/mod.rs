//! Pure domain types for twemproxy statistics.
//!
//! Nothing in here performs I/O.
//!
//! - [`snapshot`] - Decoded stats document (pools, servers, scalars)
//! - [`metric`] - Metric observations and the per-cycle batch
//! - [`field`] - Static field classification table
//! - [`error`] - Schema and naming errors

pub mod error;
pub mod field;
pub mod metric;
pub mod snapshot;

pub use error::{DomainError, Entity};
pub use field::{ClassificationTable, FieldSpec};
pub use metric::{MetricBatch, MetricKind, Observation};
pub use snapshot::{Snapshot, SnapshotNode};
