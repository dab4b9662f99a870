//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!  ┌──────────────┐      ┌───────────────────────┐      ┌──────────────┐
//!  │ StatsSource  │ ───▶ │  Snapshot → Metrics   │ ───▶ │ MetricSink   │
//!  │  (twemproxy) │      │  (application layer)  │      │ (New Relic,  │
//!  └──────────────┘      └───────────────────────┘      │  log, memory)│
//!                                                        └──────────────┘
//! ```

pub mod outbound;

pub use outbound::sink::{MetricSink, SinkRegistry};
pub use outbound::source::StatsSource;
