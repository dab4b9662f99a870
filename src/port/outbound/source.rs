//! Stats acquisition port.
//!
//! Defines how a collection cycle obtains the raw stats payload.

use async_trait::async_trait;

use crate::error::Result;

/// Source of raw stats payloads.
///
/// Implementations either return a complete, fully buffered payload or an
/// error. A partial payload must never be returned; the engine treats every
/// returned payload as the whole document for the cycle.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Human-readable endpoint description for logging.
    fn describe(&self) -> String;

    /// Fetch one payload.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, timeout, or an empty payload.
    async fn fetch(&self) -> Result<Vec<u8>>;
}
