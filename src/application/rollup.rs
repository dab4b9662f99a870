//! Rollup aggregation over a whole snapshot.
//!
//! One walk folds every scalar into two accumulators:
//!
//! - global sums keyed by field name, fed by pool-level scalars and by
//!   server-level scalars
//! - per-pool sums keyed by pool then field name, fed by server-level
//!   scalars only
//!
//! Server fields therefore roll up two levels (pool total and grand total)
//! while pool fields roll up one level (grand total). A field name that
//! appears at both levels lands in the same global bucket and the
//! contributions add up.
//!
//! Shape mismatches are skipped rather than failing the cycle: a root scalar
//! is not a pool, and a mapping nested inside a server is not summed.

use std::collections::BTreeMap;

use crate::domain::error::{DomainError, Entity};
use crate::domain::field::ClassificationTable;
use crate::domain::metric::MetricBatch;
use crate::domain::snapshot::{Snapshot, SnapshotNode};

use super::report::{pool_metric_name, record_unique};

type Sums = BTreeMap<String, f64>;

/// Accumulated sums for one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rollup {
    global: Sums,
    pools: BTreeMap<String, Sums>,
}

impl Rollup {
    /// Walk the snapshot once and fold all scalars into fresh accumulators.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        snapshot
            .pools()
            .fold(Self::default(), |rollup, (name, pool)| rollup.with_pool(name, pool))
    }

    fn with_pool(mut self, name: &str, pool: &BTreeMap<String, SnapshotNode>) -> Self {
        // Present even when the pool has no servers so its totals emit as zero.
        let mut pool_sums = self.pools.remove(name).unwrap_or_default();

        for (field, node) in pool {
            match node {
                SnapshotNode::Scalar(value) => add(&mut self.global, field, *value),
                SnapshotNode::Node(server) => {
                    for (field, value) in scalars(server) {
                        add(&mut self.global, field, value);
                        add(&mut pool_sums, field, value);
                    }
                }
            }
        }

        self.pools.insert(name.to_string(), pool_sums);
        self
    }

    /// Grand total for a field; zero if nothing contributed.
    #[must_use]
    pub fn global(&self, field: &str) -> f64 {
        self.global.get(field).copied().unwrap_or(0.0)
    }

    /// Server-level total for a field within one pool; zero if absent.
    #[must_use]
    pub fn pool(&self, pool: &str, field: &str) -> f64 {
        self.pools
            .get(pool)
            .and_then(|sums| sums.get(field))
            .copied()
            .unwrap_or(0.0)
    }

    /// Pools seen during the walk, in name order.
    pub fn pool_names(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }

    /// Emit `Totals/<field>` for each global rollup field, then
    /// `Pool/<pool>/Total <field>` for each pool rollup field of each pool.
    ///
    /// # Errors
    ///
    /// [`DomainError::DuplicateMetric`] if a total name is already in the
    /// batch.
    pub fn emit(
        &self,
        batch: &mut MetricBatch,
        table: &ClassificationTable,
    ) -> Result<(), DomainError> {
        for spec in table
            .global_rollup
            .iter()
            .filter_map(|raw| table.global_field(raw))
        {
            record_unique(
                batch,
                format!("Totals/{}", spec.display),
                spec,
                self.global(spec.raw),
                &Entity::Totals,
            )?;
        }

        for pool in self.pool_names() {
            let entity = Entity::pool(pool);
            for spec in table
                .pool_rollup
                .iter()
                .filter_map(|raw| table.server_field(raw))
            {
                record_unique(
                    batch,
                    pool_metric_name(pool, &format!("Total {}", spec.display)),
                    spec,
                    self.pool(pool, spec.raw),
                    &entity,
                )?;
            }
        }

        Ok(())
    }
}

fn scalars(node: &BTreeMap<String, SnapshotNode>) -> impl Iterator<Item = (&str, f64)> {
    node.iter()
        .filter_map(|(field, child)| child.as_scalar().map(|value| (field.as_str(), value)))
}

fn add(sums: &mut Sums, field: &str, value: f64) {
    *sums.entry(field.to_string()).or_insert(0.0) += value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::FieldSpec;
    use crate::domain::metric::MetricKind;
    use crate::testkit::snapshot::{PoolBuilder, ServerBuilder, SnapshotBuilder};

    fn two_pools() -> Snapshot {
        SnapshotBuilder::new()
            .pool(
                "alpha",
                PoolBuilder::new()
                    .field("client_err", 2.0)
                    .field("forward_error", 1.0)
                    .server(
                        "a1",
                        ServerBuilder::new()
                            .field("requests", 10.0)
                            .field("server_connections", 1.0),
                    )
                    .server(
                        "a2",
                        ServerBuilder::new()
                            .field("requests", 20.0)
                            .field("server_connections", 2.0),
                    ),
            )
            .pool(
                "beta",
                PoolBuilder::new().field("client_err", 5.0).server(
                    "b1",
                    ServerBuilder::new()
                        .field("requests", 7.0)
                        .field("server_connections", 4.0),
                ),
            )
            .build()
    }

    #[test]
    fn global_requests_sum_all_servers_in_all_pools() {
        let rollup = Rollup::from_snapshot(&two_pools());
        assert_eq!(rollup.global("requests"), 37.0);
    }

    #[test]
    fn pool_scalars_roll_up_once() {
        let rollup = Rollup::from_snapshot(&two_pools());
        assert_eq!(rollup.global("client_err"), 7.0);
        assert_eq!(rollup.pool("alpha", "client_err"), 0.0);
    }

    #[test]
    fn pool_totals_only_include_own_servers() {
        let rollup = Rollup::from_snapshot(&two_pools());
        assert_eq!(rollup.pool("alpha", "server_connections"), 3.0);
        assert_eq!(rollup.pool("beta", "server_connections"), 4.0);
        assert_eq!(rollup.pool("alpha", "requests"), 30.0);
    }

    #[test]
    fn pool_without_servers_is_present_with_zero_totals() {
        let snapshot = SnapshotBuilder::new()
            .pool("empty", PoolBuilder::new().field("client_err", 3.0))
            .build();
        let rollup = Rollup::from_snapshot(&snapshot);

        assert_eq!(rollup.pool_names().collect::<Vec<_>>(), ["empty"]);

        let mut batch = MetricBatch::new();
        rollup
            .emit(&mut batch, &ClassificationTable::standard())
            .unwrap();
        let total = batch.get("Pool/empty/Total Server Connections").unwrap();
        assert_eq!(total.value, 0.0);
        assert_eq!(total.kind, MetricKind::Gauge);
        assert_eq!(batch.get("Totals/Client Errors").unwrap().value, 3.0);
    }

    #[test]
    fn root_scalars_and_nested_server_mappings_are_skipped() {
        let snapshot = SnapshotBuilder::new()
            .scalar("uptime", 1000.0)
            .scalar("requests", 999.0)
            .pool(
                "alpha",
                PoolBuilder::new().server(
                    "a1",
                    ServerBuilder::new()
                        .field("requests", 5.0)
                        .nested("extra", "requests", 100.0),
                ),
            )
            .build();

        let rollup = Rollup::from_snapshot(&snapshot);

        assert_eq!(rollup.global("requests"), 5.0);
        assert_eq!(rollup.pool("alpha", "requests"), 5.0);
        assert_eq!(rollup.global("uptime"), 0.0);
    }

    #[test]
    fn empty_snapshot_emits_zero_global_totals() {
        let rollup = Rollup::from_snapshot(&Snapshot::default());
        let mut batch = MetricBatch::new();

        rollup
            .emit(&mut batch, &ClassificationTable::standard())
            .unwrap();

        assert_eq!(batch.len(), 4);
        assert!(batch.iter().all(|o| o.value == 0.0));
        let names: Vec<_> = batch.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Totals/Client Errors",
                "Totals/Forwarding Errors",
                "Totals/Server Ejects",
                "Totals/Requests",
            ]
        );
    }

    #[test]
    fn emit_uses_table_kind_and_unit() {
        let rollup = Rollup::from_snapshot(&two_pools());
        let mut batch = MetricBatch::new();
        rollup
            .emit(&mut batch, &ClassificationTable::standard())
            .unwrap();

        assert_eq!(batch.len(), 4 + 9 * 2);
        let forward = batch.get("Totals/Forwarding Errors").unwrap();
        assert_eq!(forward.unit, "errors");
        assert_eq!(forward.kind, MetricKind::Counter);
        assert_eq!(batch.get("Pool/beta/Total Requests").unwrap().value, 7.0);
        assert_eq!(
            batch.get("Pool/alpha/Total Requests").unwrap().unit,
            "requests"
        );
    }

    #[test]
    fn field_at_both_levels_adds_into_one_global_bucket() {
        const POOL: &[FieldSpec] = &[FieldSpec {
            raw: "errors",
            display: "Errors",
            kind: MetricKind::Counter,
            unit: "errors",
        }];
        const SERVER: &[FieldSpec] = &[FieldSpec {
            raw: "errors",
            display: "Server Errors",
            kind: MetricKind::Counter,
            unit: "errors",
        }];
        let table = ClassificationTable {
            pool: POOL,
            server: SERVER,
            global_rollup: &["errors"],
            pool_rollup: &["errors"],
        };
        let snapshot = SnapshotBuilder::new()
            .pool(
                "alpha",
                PoolBuilder::empty()
                    .field("errors", 4.0)
                    .server("a1", ServerBuilder::empty().field("errors", 6.0)),
            )
            .build();

        let rollup = Rollup::from_snapshot(&snapshot);
        let mut batch = MetricBatch::new();
        rollup.emit(&mut batch, &table).unwrap();

        assert_eq!(batch.get("Totals/Errors").unwrap().value, 10.0);
        assert_eq!(batch.get("Pool/alpha/Total Server Errors").unwrap().value, 6.0);
    }

    #[test]
    fn identical_snapshots_fold_identically() {
        let snapshot = two_pools();
        assert_eq!(
            Rollup::from_snapshot(&snapshot),
            Rollup::from_snapshot(&snapshot)
        );
    }
}
