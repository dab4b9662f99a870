//! New Relic Platform API sink.
//!
//! Posts one component per cycle to the Platform metrics endpoint. Metric
//! keys follow the plugin convention `Component/<name>[<unit>]`.
//!
//! Counters arrive as raw cumulative values; this sink turns them into
//! per-cycle deltas. The first sighting of a counter reports 0, and a
//! counter that went backwards (proxy restart) also reports 0. The delta
//! baseline only advances after a successful POST, and the reported
//! `duration` is the time since that POST so rates stay correct after a
//! failed or skipped cycle.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::metric::{MetricBatch, MetricKind};
use crate::error::{Error, Result};
use crate::port::outbound::sink::MetricSink;

/// Platform API metrics endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://platform-api.newrelic.com/platform/v1/metrics";

/// Plugin GUID under which twemproxy components are reported.
pub const DEFAULT_GUID: &str = "com.onlulu.newrelic_twemproxy_agent";

/// Static settings for the sink.
#[derive(Debug, Clone)]
pub struct NewRelicSettings {
    pub endpoint: String,
    pub license_key: String,
    pub guid: String,
    /// Component name shown in the New Relic UI.
    pub component: String,
    /// Reporting host.
    pub host: String,
    /// Seconds covered by one cycle; reported on the first POST.
    pub duration_secs: u64,
    /// Whole-request HTTP timeout in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct Agent<'a> {
    host: &'a str,
    pid: u32,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct Component<'a> {
    name: &'a str,
    guid: &'a str,
    duration: u64,
    metrics: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    agent: Agent<'a>,
    components: Vec<Component<'a>>,
}

/// State as of the last successful POST.
#[derive(Debug, Default)]
struct Baseline {
    counters: HashMap<String, f64>,
    delivered_at: Option<Instant>,
}

/// Sink posting batches to New Relic.
#[derive(Debug)]
pub struct NewRelicSink {
    client: Client,
    settings: NewRelicSettings,
    baseline: Mutex<Baseline>,
}

impl NewRelicSink {
    /// Create a sink with an HTTP client bounded by `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: NewRelicSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            settings,
            baseline: Mutex::new(Baseline::default()),
        })
    }

    /// Seconds covered by a POST made at `now`: time since the last
    /// successful POST, or one interval for the first one.
    fn report_duration(&self, now: Instant) -> u64 {
        match self.baseline.lock().delivered_at {
            Some(previous) => now.saturating_duration_since(previous).as_secs().max(1),
            None => self.settings.duration_secs,
        }
    }

    /// Metrics map for a batch plus the counter baseline to commit once the
    /// POST succeeds.
    fn prepare(&self, batch: &MetricBatch) -> (BTreeMap<String, f64>, HashMap<String, f64>) {
        let baseline = self.baseline.lock();
        let last = &baseline.counters;
        let mut metrics = BTreeMap::new();
        let mut next = HashMap::with_capacity(last.len());

        for observation in batch {
            let key = format!("Component/{}[{}]", observation.name, observation.unit);
            let value = match observation.kind {
                MetricKind::Gauge => observation.value,
                MetricKind::Counter => {
                    next.insert(observation.name.clone(), observation.value);
                    counter_delta(last.get(&observation.name).copied(), observation.value)
                }
            };
            metrics.insert(key, value);
        }

        (metrics, next)
    }
}

/// Delta between two cumulative readings.
fn counter_delta(previous: Option<f64>, current: f64) -> f64 {
    match previous {
        Some(previous) if current >= previous => current - previous,
        _ => 0.0,
    }
}

#[async_trait]
impl MetricSink for NewRelicSink {
    fn name(&self) -> &'static str {
        "newrelic"
    }

    async fn deliver(&self, batch: &MetricBatch) -> Result<()> {
        let (metrics, next) = self.prepare(batch);
        let metric_count = metrics.len();
        let now = Instant::now();
        let duration = self.report_duration(now);
        let payload = Payload {
            agent: Agent {
                host: &self.settings.host,
                pid: std::process::id(),
                version: env!("CARGO_PKG_VERSION"),
            },
            components: vec![Component {
                name: &self.settings.component,
                guid: &self.settings.guid,
                duration,
                metrics,
            }],
        };

        debug!(
            endpoint = %self.settings.endpoint,
            metrics = metric_count,
            duration,
            "Posting to New Relic"
        );

        self.client
            .post(&self.settings.endpoint)
            .header("X-License-Key", &self.settings.license_key)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let mut baseline = self.baseline.lock();
        baseline.counters = next;
        baseline.delivered_at = Some(now);
        drop(baseline);
        info!(component = %self.settings.component, metrics = metric_count, "Metrics delivered to New Relic");
        Ok(())
    }
}
