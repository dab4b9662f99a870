//! Collection cycle and interval loop.
//!
//! One cycle fetches a stats payload, decodes it into a snapshot, derives the
//! metric batch and hands it to every sink. A failed cycle delivers nothing;
//! the loop logs the failure and waits for the next tick.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::signal;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::bootstrap::{build_sink_registry, build_source};
use crate::application::collector::{collect, CollectOptions};
use crate::domain::metric::MetricBatch;
use crate::domain::snapshot::Snapshot;
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::sink::SinkRegistry;
use crate::port::outbound::source::StatsSource;

/// Wired source, engine options and sinks.
pub struct Runtime {
    source: Arc<dyn StatsSource>,
    sinks: SinkRegistry,
    options: CollectOptions,
    interval: Duration,
}

impl Runtime {
    /// Assemble a runtime from parts.
    #[must_use]
    pub fn new(
        source: Arc<dyn StatsSource>,
        sinks: SinkRegistry,
        options: CollectOptions,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            sinks,
            options,
            interval,
        }
    }

    /// Wire the runtime described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a sink cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            build_source(config),
            build_sink_registry(config)?,
            config.collect_options(),
            Duration::from_secs(config.interval_secs),
        ))
    }

    /// Registered sink count.
    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Fetch one snapshot and derive its batch without delivering it.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails, the payload is not a stats
    /// document, or the snapshot does not match the classification table.
    pub async fn collect_once(&self) -> Result<MetricBatch> {
        let payload = self.source.fetch().await?;
        let snapshot = Snapshot::from_slice(&payload)?;
        debug!(
            source = %self.source.describe(),
            service = snapshot.label("service").unwrap_or("-"),
            version = snapshot.label("version").unwrap_or("-"),
            pools = snapshot.pool_count(),
            "Snapshot decoded"
        );
        Ok(collect(&snapshot, &self.options)?)
    }

    /// Run one full cycle and return the number of delivered observations.
    ///
    /// # Errors
    ///
    /// Returns an error if collection fails or any sink rejects the batch.
    pub async fn run_cycle(&self) -> Result<usize> {
        let batch = self.collect_once().await?;
        self.sinks.deliver_all(&batch).await?;
        Ok(batch.len())
    }

    /// Run cycles on the configured interval until `shutdown` flips to true
    /// or its sender is dropped. The first cycle runs immediately.
    ///
    /// # Errors
    ///
    /// Cycle failures are logged, not returned.
    pub async fn run_with_shutdown(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            source = %self.source.describe(),
            interval_secs = self.interval.as_secs(),
            sinks = ?self.sinks.names(),
            "Starting collection loop"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut cycle: u64 = 0;

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(()) => {
                            if *shutdown.borrow() {
                                info!("Shutdown signal received");
                                break;
                            }
                        }
                        Err(_) => {
                            info!("Shutdown channel closed");
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    cycle += 1;
                    let started = Instant::now();
                    match self.run_cycle().await {
                        Ok(observations) => info!(
                            cycle,
                            observations,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Cycle complete"
                        ),
                        Err(e) => warn!(
                            cycle,
                            error = %e,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Cycle failed"
                        ),
                    }
                }
            }
        }

        Ok(())
    }

    /// Run until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop task panics.
    pub async fn run(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut handle = tokio::spawn(async move { self.run_with_shutdown(shutdown_rx).await });

        tokio::select! {
            result = &mut handle => {
                return join_result(result);
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received (Ctrl+C)");
                let _ = shutdown_tx.send(true);
            }
        }

        join_result(handle.await)
    }
}

fn join_result(result: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    result.map_err(|e| Error::Runtime(format!("collection loop aborted: {e}")))?
}
