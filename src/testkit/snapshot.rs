//! Builders for snapshot trees and raw stats payloads.
//!
//! `PoolBuilder::new()` and `ServerBuilder::new()` start with every
//! classified field set to zero so a test only spells out the values it
//! asserts on.

use std::collections::BTreeMap;

use crate::domain::field::{POOL_FIELDS, SERVER_FIELDS};
use crate::domain::snapshot::{Snapshot, SnapshotNode};

type Children = BTreeMap<String, SnapshotNode>;

fn zeroed(raws: impl Iterator<Item = &'static str>) -> Children {
    raws.map(|raw| (raw.to_string(), SnapshotNode::Scalar(0.0)))
        .collect()
}

/// Builds one server node.
#[derive(Debug, Clone)]
pub struct ServerBuilder {
    fields: Children,
}

impl ServerBuilder {
    /// All server fields present and zero.
    pub fn new() -> Self {
        Self {
            fields: zeroed(SERVER_FIELDS.iter().map(|spec| spec.raw)),
        }
    }

    /// No fields at all.
    pub fn empty() -> Self {
        Self {
            fields: Children::new(),
        }
    }

    pub fn field(mut self, raw: &str, value: f64) -> Self {
        self.fields
            .insert(raw.to_string(), SnapshotNode::Scalar(value));
        self
    }

    pub fn without(mut self, raw: &str) -> Self {
        self.fields.remove(raw);
        self
    }

    /// Add a mapping one level below the server holding a single scalar.
    pub fn nested(mut self, name: &str, raw: &str, value: f64) -> Self {
        let inner = Children::from([(raw.to_string(), SnapshotNode::Scalar(value))]);
        self.fields.insert(name.to_string(), SnapshotNode::Node(inner));
        self
    }

    pub fn build(self) -> Children {
        self.fields
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds one pool node.
#[derive(Debug, Clone)]
pub struct PoolBuilder {
    fields: Children,
}

impl PoolBuilder {
    /// All pool fields present and zero, no servers.
    pub fn new() -> Self {
        Self {
            fields: zeroed(POOL_FIELDS.iter().map(|spec| spec.raw)),
        }
    }

    /// No fields and no servers.
    pub fn empty() -> Self {
        Self {
            fields: Children::new(),
        }
    }

    pub fn field(mut self, raw: &str, value: f64) -> Self {
        self.fields
            .insert(raw.to_string(), SnapshotNode::Scalar(value));
        self
    }

    pub fn without(mut self, raw: &str) -> Self {
        self.fields.remove(raw);
        self
    }

    pub fn server(mut self, name: &str, server: ServerBuilder) -> Self {
        self.fields
            .insert(name.to_string(), SnapshotNode::Node(server.build()));
        self
    }

    pub fn build(self) -> Children {
        self.fields
    }
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a whole snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    root: Children,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(mut self, name: &str, pool: PoolBuilder) -> Self {
        self.root
            .insert(name.to_string(), SnapshotNode::Node(pool.build()));
        self
    }

    /// Add a root-level scalar (like `uptime`).
    pub fn scalar(mut self, name: &str, value: f64) -> Self {
        self.root
            .insert(name.to_string(), SnapshotNode::Scalar(value));
        self
    }

    pub fn build(self) -> Snapshot {
        Snapshot::new(self.root)
    }
}

/// A stats document shaped like nutcracker 0.4 output.
///
/// Two pools: `alpha` with servers `10.0.0.1:6379:1` (requests 100) and
/// `10.0.0.2:6379:1` (requests 50), and `beta` with server
/// `10.0.0.3:11211:1` (requests 25).
pub fn stats_json() -> String {
    let server = |requests: u64, connections: u64| {
        format!(
            r#"{{
                "server_eof": 0, "server_err": 1, "server_timedout": 2,
                "server_connections": {connections}, "server_ejected_at": 0,
                "requests": {requests}, "request_bytes": {request_bytes},
                "responses": {requests}, "response_bytes": {response_bytes},
                "in_queue": 0, "in_queue_bytes": 0, "out_queue": 0, "out_queue_bytes": 0
            }}"#,
            request_bytes = requests * 30,
            response_bytes = requests * 60,
        )
    };

    format!(
        r#"{{
            "service": "nutcracker",
            "source": "cache-01",
            "version": "0.4.1",
            "uptime": 3600,
            "timestamp": 1700000000,
            "total_connections": 42,
            "curr_connections": 5,
            "alpha": {{
                "client_eof": 3, "client_err": 1, "client_connections": 4,
                "server_ejects": 0, "forward_error": 2, "fragments": 0,
                "10.0.0.1:6379:1": {a1},
                "10.0.0.2:6379:1": {a2}
            }},
            "beta": {{
                "client_eof": 0, "client_err": 4, "client_connections": 1,
                "server_ejects": 1, "forward_error": 0, "fragments": 9,
                "10.0.0.3:11211:1": {b1}
            }}
        }}"#,
        a1 = server(100, 2),
        a2 = server(50, 1),
        b1 = server(25, 3),
    )
}
