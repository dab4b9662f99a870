//! In-memory source and sink for testing.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::domain::metric::{MetricBatch, Observation};
use crate::error::{Error, Result};
use crate::port::outbound::sink::MetricSink;
use crate::port::outbound::source::StatsSource;

/// Source that replays a fixed payload, or fails every fetch.
#[derive(Debug)]
pub struct StaticSource {
    payload: RwLock<std::result::Result<Vec<u8>, String>>,
}

impl StaticSource {
    /// Source returning `payload` on every fetch.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: RwLock::new(Ok(payload.into())),
        }
    }

    /// Source whose every fetch fails with a connection error.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            payload: RwLock::new(Err(reason.into())),
        }
    }

    /// Replace the payload returned by later fetches.
    pub fn set_payload(&self, payload: impl Into<Vec<u8>>) {
        *self.payload.write() = Ok(payload.into());
    }
}

#[async_trait]
impl StatsSource for StaticSource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        self.payload.read().clone().map_err(Error::Connection)
    }
}

/// Sink that keeps every delivered batch.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<Vec<Observation>>>,
}

impl MemorySink {
    /// Create a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All delivered batches in delivery order.
    pub fn batches(&self) -> Vec<Vec<Observation>> {
        self.batches.lock().clone()
    }

    /// Number of delivered batches.
    pub fn len(&self) -> usize {
        self.batches.lock().len()
    }

    /// True if nothing was delivered.
    pub fn is_empty(&self) -> bool {
        self.batches.lock().is_empty()
    }
}

#[async_trait]
impl MetricSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn deliver(&self, batch: &MetricBatch) -> Result<()> {
        self.batches.lock().push(batch.iter().cloned().collect());
        Ok(())
    }
}
