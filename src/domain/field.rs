//! Field classification table.
//!
//! Maps each raw twemproxy stats field to its display name, metric kind, and
//! unit. The table is compiled in; its contents must stay stable so metric
//! names remain compatible with existing dashboards.

use super::metric::MetricKind;

/// Classification of one raw stats field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as it appears in the stats JSON.
    pub raw: &'static str,
    /// Name segment used in emitted metric names.
    pub display: &'static str,
    pub kind: MetricKind,
    pub unit: &'static str,
}

impl FieldSpec {
    const fn gauge(raw: &'static str, display: &'static str, unit: &'static str) -> Self {
        Self {
            raw,
            display,
            kind: MetricKind::Gauge,
            unit,
        }
    }

    const fn counter(raw: &'static str, display: &'static str, unit: &'static str) -> Self {
        Self {
            raw,
            display,
            kind: MetricKind::Counter,
            unit,
        }
    }
}

/// Pool-level scalar fields.
pub const POOL_FIELDS: &[FieldSpec] = &[
    FieldSpec::gauge("client_connections", "Client Connections", "connections"),
    FieldSpec::counter("client_eof", "Client EOF", "connections"),
    FieldSpec::counter("client_err", "Client Errors", "connections"),
    FieldSpec::counter("forward_error", "Forwarding Errors", "errors"),
    FieldSpec::counter("fragments", "Fragments created", "fragments"),
    FieldSpec::counter("server_ejects", "Server Ejects", "ejects"),
];

/// Server-level scalar fields.
pub const SERVER_FIELDS: &[FieldSpec] = &[
    FieldSpec::counter("in_queue", "In Queue", "requests"),
    FieldSpec::counter("in_queue_bytes", "In Queue Bytes", "bytes"),
    FieldSpec::counter("out_queue", "Out Queue", "requests"),
    FieldSpec::counter("out_queue_bytes", "Out Queue Bytes", "bytes"),
    FieldSpec::counter("requests", "Requests", "requests"),
    FieldSpec::counter("request_bytes", "Request Bytes", "bytes"),
    FieldSpec::counter("responses", "Responses", "requests"),
    FieldSpec::counter("response_bytes", "Response Bytes", "bytes"),
    FieldSpec::gauge("server_connections", "Server Connections", "connections"),
    FieldSpec::gauge("server_ejected_at", "Server Ejected At", "usec"),
    FieldSpec::counter("server_eof", "Server EOF", "connections"),
    FieldSpec::counter("server_err", "Server Errors", "connections"),
    FieldSpec::counter("server_timedout", "Server Timeouts", "connections"),
];

/// Fields summed across the whole snapshot into `Totals/...`.
pub const GLOBAL_ROLLUP: &[&str] = &["client_err", "forward_error", "server_ejects", "requests"];

/// Server fields summed per pool into `Pool/<pool>/Total ...`.
pub const POOL_ROLLUP: &[&str] = &[
    "in_queue",
    "out_queue",
    "requests",
    "request_bytes",
    "response_bytes",
    "server_connections",
    "server_eof",
    "server_err",
    "server_timedout",
];

/// A rollup field that does not resolve to a classified field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("global rollup field '{0}' is not a pool or server field")]
    UnknownGlobalRollup(&'static str),

    #[error("pool rollup field '{0}' is not a server field")]
    UnknownPoolRollup(&'static str),

    #[error("field '{0}' is listed twice in the same namespace")]
    Duplicate(&'static str),
}

/// The three classification namespaces used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationTable {
    pub pool: &'static [FieldSpec],
    pub server: &'static [FieldSpec],
    pub global_rollup: &'static [&'static str],
    pub pool_rollup: &'static [&'static str],
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ClassificationTable {
    /// The twemproxy table.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            pool: POOL_FIELDS,
            server: SERVER_FIELDS,
            global_rollup: GLOBAL_ROLLUP,
            pool_rollup: POOL_ROLLUP,
        }
    }

    /// Look up a pool-level field.
    #[must_use]
    pub fn pool_field(&self, raw: &str) -> Option<&'static FieldSpec> {
        let specs: &'static [FieldSpec] = self.pool;
        specs.iter().find(|spec| spec.raw == raw)
    }

    /// Look up a server-level field.
    #[must_use]
    pub fn server_field(&self, raw: &str) -> Option<&'static FieldSpec> {
        let specs: &'static [FieldSpec] = self.server;
        specs.iter().find(|spec| spec.raw == raw)
    }

    /// Classification used for a grand total.
    ///
    /// A name present at both levels resolves to the pool entry.
    #[must_use]
    pub fn global_field(&self, raw: &str) -> Option<&'static FieldSpec> {
        self.pool_field(raw).or_else(|| self.server_field(raw))
    }

    /// Check that every rollup name resolves and no namespace repeats a name.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), TableError> {
        for specs in [self.pool, self.server] {
            for (i, spec) in specs.iter().enumerate() {
                if specs[..i].iter().any(|earlier| earlier.raw == spec.raw) {
                    return Err(TableError::Duplicate(spec.raw));
                }
            }
        }
        for &raw in self.global_rollup {
            if self.global_field(raw).is_none() {
                return Err(TableError::UnknownGlobalRollup(raw));
            }
        }
        for &raw in self.pool_rollup {
            if self.server_field(raw).is_none() {
                return Err(TableError::UnknownPoolRollup(raw));
            }
        }
        Ok(())
    }
}
