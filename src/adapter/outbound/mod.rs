//! Outbound adapters (driven side).

pub mod log;
pub mod memory;
pub mod newrelic;
pub mod twemproxy;
