//! Sink that writes batches to the tracing log.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::metric::{MetricBatch, MetricKind};
use crate::error::Result;
use crate::port::outbound::sink::MetricSink;

/// Logs a one-line summary per batch and every observation at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl MetricSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, batch: &MetricBatch) -> Result<()> {
        let gauges = batch
            .iter()
            .filter(|o| o.kind == MetricKind::Gauge)
            .count();
        for observation in batch {
            debug!(
                metric = %observation.name,
                kind = %observation.kind,
                unit = observation.unit,
                value = observation.value,
                "Metric"
            );
        }
        info!(
            observations = batch.len(),
            gauges,
            counters = batch.len() - gauges,
            "Metric batch"
        );
        Ok(())
    }
}
