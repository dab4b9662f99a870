//! Twemrelic - twemproxy statistics agent for New Relic.
//!
//! Polls the nutcracker stats port, turns the JSON document into a flat batch
//! of named metrics and hands the batch to one or more sinks.
//!
//! # Architecture
//!
//! Hexagonal layout: a pure engine in the middle, I/O at the edges.
//!
//! - **`domain`** - Snapshot tree, metric batch, field classification table
//! - **`application`** - Pool/server reporters and the rollup aggregator
//! - **`port`** - `StatsSource` and `MetricSink` traits
//! - **`adapter`** - TCP stats source, New Relic / log / memory sinks
//! - **`infrastructure`** - Configuration, wiring and the interval loop
//! - **`cli`** - `run`, `collect` and `check` commands
//!
//! # Example
//!
//! ```
//! use twemrelic::application::{collect, CollectOptions};
//! use twemrelic::domain::Snapshot;
//!
//! let payload = br#"{
//!     "service": "nutcracker",
//!     "alpha": {
//!         "client_eof": 0, "client_err": 0, "client_connections": 2,
//!         "server_ejects": 0, "forward_error": 0, "fragments": 0
//!     }
//! }"#;
//!
//! let snapshot = Snapshot::from_slice(payload).unwrap();
//! let batch = collect(&snapshot, &CollectOptions::default()).unwrap();
//!
//! assert_eq!(batch.get("Pool/alpha/Client Connections").map(|o| o.value), Some(2.0));
//! assert_eq!(batch.get("Pool/alpha/Total Requests").map(|o| o.value), Some(0.0));
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
