//! Per-entity reporting for pools and servers.
//!
//! Both reporters are the same table-driven loop: for every classified
//! field, read the scalar from the node and record it under a name derived
//! from the entity's position in the hierarchy.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::error::{DomainError, Entity};
use crate::domain::field::{ClassificationTable, FieldSpec};
use crate::domain::metric::MetricBatch;
use crate::domain::snapshot::SnapshotNode;

/// How server metric names are built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerNaming {
    /// `Server/<pool>:<server>/<field>`. Server names carry `:` themselves
    /// (`10.0.0.1:6379:1`), so `%` and `:` in the pool name are
    /// percent-escaped; the first `:` always ends the pool part and names
    /// stay unique across pools.
    #[default]
    Qualified,
    /// `Server/<server>/<field>`; a server listed in two pools fails the
    /// cycle with [`DomainError::DuplicateMetric`].
    Unqualified,
}

impl ServerNaming {
    /// Metric name prefix for a server.
    #[must_use]
    pub fn prefix(self, pool: &str, server: &str) -> String {
        match self {
            Self::Qualified => format!("Server/{}:{server}", escape_pool(pool)),
            Self::Unqualified => format!("Server/{server}"),
        }
    }
}

/// Escape `%` and `:` so a qualified pool part never contains `:`.
fn escape_pool(pool: &str) -> Cow<'_, str> {
    if !pool.contains(['%', ':']) {
        return Cow::Borrowed(pool);
    }
    let mut escaped = String::with_capacity(pool.len() + 4);
    for c in pool.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            ':' => escaped.push_str("%3A"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Metric name for a pool-level field.
#[must_use]
pub fn pool_metric_name(pool: &str, display: &str) -> String {
    format!("Pool/{pool}/{display}")
}

/// Emit every pool-level field of one pool.
///
/// Server sub-mappings inside the pool node are ignored here.
///
/// # Errors
///
/// [`DomainError::MissingField`] if a classified field is absent or not a
/// scalar; [`DomainError::DuplicateMetric`] if a name is already taken.
pub fn report_pool(
    batch: &mut MetricBatch,
    table: &ClassificationTable,
    pool: &str,
    node: &BTreeMap<String, SnapshotNode>,
) -> Result<(), DomainError> {
    let entity = Entity::pool(pool);
    for spec in table.pool {
        let value = read_scalar(node, spec, &entity)?;
        record_unique(batch, pool_metric_name(pool, spec.display), spec, value, &entity)?;
    }
    Ok(())
}

/// Emit every server-level field of one server.
///
/// # Errors
///
/// Same as [`report_pool`].
pub fn report_server(
    batch: &mut MetricBatch,
    table: &ClassificationTable,
    naming: ServerNaming,
    pool: &str,
    server: &str,
    node: &BTreeMap<String, SnapshotNode>,
) -> Result<(), DomainError> {
    let entity = Entity::server(pool, server);
    let prefix = naming.prefix(pool, server);
    for spec in table.server {
        let value = read_scalar(node, spec, &entity)?;
        record_unique(
            batch,
            format!("{prefix}/{}", spec.display),
            spec,
            value,
            &entity,
        )?;
    }
    Ok(())
}

fn read_scalar(
    node: &BTreeMap<String, SnapshotNode>,
    spec: &FieldSpec,
    entity: &Entity,
) -> Result<f64, DomainError> {
    node.get(spec.raw)
        .and_then(SnapshotNode::as_scalar)
        .ok_or_else(|| DomainError::MissingField {
            entity: entity.clone(),
            field: spec.raw,
        })
}

/// Record an observation, refusing to overwrite an existing name.
pub(crate) fn record_unique(
    batch: &mut MetricBatch,
    name: String,
    spec: &FieldSpec,
    value: f64,
    entity: &Entity,
) -> Result<(), DomainError> {
    if batch.contains(&name) {
        return Err(DomainError::DuplicateMetric {
            name,
            entity: entity.clone(),
        });
    }
    batch.record(name, spec.kind, spec.unit, value);
    Ok(())
}
