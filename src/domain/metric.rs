//! Metric observations and the per-cycle batch that collects them.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// How a downstream consumer should interpret an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Instantaneous value, overwritten each cycle.
    Gauge,
    /// Cumulative value since proxy start. Consumers compute deltas.
    Counter,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gauge => f.write_str("gauge"),
            Self::Counter => f.write_str("counter"),
        }
    }
}

/// A single named, typed metric value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Hierarchical name, e.g. `Pool/alpha/Client Connections`.
    pub name: String,
    pub kind: MetricKind,
    /// Unit label, e.g. `connections`.
    pub unit: &'static str,
    pub value: f64,
}

/// Observations accumulated during one collection cycle.
///
/// Recording a name twice replaces the earlier value in place, so the batch
/// never holds two observations with the same name and insertion order is
/// preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricBatch {
    observations: Vec<Observation>,
    index: HashMap<String, usize>,
}

impl MetricBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an instantaneous value.
    pub fn record_gauge(&mut self, name: impl Into<String>, unit: &'static str, value: f64) {
        self.record(name.into(), MetricKind::Gauge, unit, value);
    }

    /// Record a cumulative counter value as-is.
    pub fn record_counter(&mut self, name: impl Into<String>, unit: &'static str, value: f64) {
        self.record(name.into(), MetricKind::Counter, unit, value);
    }

    /// Record an observation of the given kind.
    pub fn record(&mut self, name: String, kind: MetricKind, unit: &'static str, value: f64) {
        let observation = Observation {
            name,
            kind,
            unit,
            value,
        };
        match self.index.get(&observation.name) {
            Some(&position) => self.observations[position] = observation,
            None => {
                self.index
                    .insert(observation.name.clone(), self.observations.len());
                self.observations.push(observation);
            }
        }
    }

    /// Look up an observation by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Observation> {
        self.index.get(name).map(|&position| &self.observations[position])
    }

    /// True if an observation with this name was recorded.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of distinct observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    /// Consume the batch, yielding observations in recording order.
    #[must_use]
    pub fn into_observations(self) -> Vec<Observation> {
        self.observations
    }
}

impl<'a> IntoIterator for &'a MetricBatch {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
