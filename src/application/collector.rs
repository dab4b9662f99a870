//! One collection cycle: snapshot in, metric batch out.

use tracing::{debug, trace};

use crate::domain::error::DomainError;
use crate::domain::field::ClassificationTable;
use crate::domain::metric::MetricBatch;
use crate::domain::snapshot::{Snapshot, SnapshotNode};

use super::report::{report_pool, report_server, ServerNaming};
use super::rollup::Rollup;

/// Settings that shape the emitted batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectOptions {
    pub table: ClassificationTable,
    pub server_naming: ServerNaming,
}

impl CollectOptions {
    /// Standard table with the given server naming.
    #[must_use]
    pub fn with_naming(server_naming: ServerNaming) -> Self {
        Self {
            server_naming,
            ..Self::default()
        }
    }
}

/// Convert a snapshot into the cycle's metric batch.
///
/// Runs the pool and server reporters depth-first over every pool, then the
/// rollup walk. Pure and synchronous; calling it twice on the same snapshot
/// yields identical batches.
///
/// # Errors
///
/// Returns the first [`DomainError`] hit. No batch is returned in that
/// case, so a cycle never delivers a partial metric set.
pub fn collect(snapshot: &Snapshot, options: &CollectOptions) -> Result<MetricBatch, DomainError> {
    let table = &options.table;
    let mut batch = MetricBatch::new();

    for (pool_name, pool) in snapshot.pools() {
        report_pool(&mut batch, table, pool_name, pool)?;

        let mut servers = 0usize;
        for (server_name, node) in pool {
            if let SnapshotNode::Node(server) = node {
                report_server(
                    &mut batch,
                    table,
                    options.server_naming,
                    pool_name,
                    server_name,
                    server,
                )?;
                servers += 1;
            }
        }
        trace!(pool = %pool_name, servers, "Pool reported");
    }

    Rollup::from_snapshot(snapshot).emit(&mut batch, table)?;

    debug!(
        pools = snapshot.pool_count(),
        observations = batch.len(),
        "Snapshot collected"
    );
    Ok(batch)
}
