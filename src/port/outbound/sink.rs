//! Metric delivery port.
//!
//! Defines the interface for handing a finished cycle's batch to a
//! monitoring backend, plus a registry that fans a batch out to several
//! sinks.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::metric::MetricBatch;
use crate::error::{Error, Result};

/// Receiver of completed metric batches.
///
/// # Implementation Notes
///
/// - Counter observations carry raw cumulative values. Sinks that report
///   rates compute the delta themselves.
/// - `deliver` is called at most once per cycle with an immutable batch.
#[async_trait]
pub trait MetricSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &'static str;

    /// Deliver one cycle's batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects or cannot receive the batch.
    async fn deliver(&self, batch: &MetricBatch) -> Result<()>;
}

#[async_trait]
impl<T: MetricSink + ?Sized> MetricSink for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn deliver(&self, batch: &MetricBatch) -> Result<()> {
        (**self).deliver(batch).await
    }
}

/// Registry of sinks (composite pattern).
///
/// Delivers each batch to every registered sink. A failing sink does not
/// stop delivery to the others.
#[derive(Default)]
pub struct SinkRegistry {
    sinks: Vec<Box<dyn MetricSink>>,
}

impl SinkRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { sinks: vec![] }
    }

    /// Register a sink.
    pub fn register(&mut self, sink: Box<dyn MetricSink>) {
        self.sinks.push(sink);
    }

    /// Deliver to all sinks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Delivery`] naming every sink that failed.
    pub async fn deliver_all(&self, batch: &MetricBatch) -> Result<()> {
        let mut failed = Vec::new();
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(batch).await {
                warn!(sink = sink.name(), error = %e, "Metric delivery failed");
                failed.push(sink.name());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::Delivery(failed.join(", ")))
        }
    }

    /// Names of registered sinks.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    /// Number of registered sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemorySink;

    struct RejectingSink;

    #[async_trait]
    impl MetricSink for RejectingSink {
        fn name(&self) -> &'static str {
            "rejecting"
        }

        async fn deliver(&self, _batch: &MetricBatch) -> Result<()> {
            Err(Error::Connection("backend down".to_string()))
        }
    }

    #[tokio::test]
    async fn failing_sink_does_not_block_others() {
        let memory = Arc::new(MemorySink::new());
        let mut registry = SinkRegistry::new();
        registry.register(Box::new(RejectingSink));
        registry.register(Box::new(Arc::clone(&memory)));

        let result = registry.deliver_all(&MetricBatch::new()).await;

        assert!(matches!(result, Err(Error::Delivery(names)) if names == "rejecting"));
        assert_eq!(memory.len(), 1);
    }

    #[tokio::test]
    async fn empty_registry_delivers_nothing() {
        let registry = SinkRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.deliver_all(&MetricBatch::new()).await.is_ok());
    }

    #[test]
    fn names_in_registration_order() {
        let mut registry = SinkRegistry::new();
        registry.register(Box::new(MemorySink::new()));
        registry.register(Box::new(RejectingSink));
        assert_eq!(registry.names(), ["memory", "rejecting"]);
        assert_eq!(registry.len(), 2);
    }
}
