//! Snapshot tree decoded from a twemproxy stats payload.
//!
//! A snapshot is the full statistics document for one collection cycle.
//! The shape is discovered at runtime: the root maps pool names to pool
//! nodes, a pool node mixes pool-level scalars with server sub-mappings,
//! and a server node holds server-level scalars only.
//!
//! Every traversal matches on the closed [`SnapshotNode`] shape instead of
//! probing value types.
//!
//! Scalars are `f64`. Integer counters above 2^53 (about 9 PB for the byte
//! counters) are rounded to the nearest representable value on decode, and
//! rollup sums inherit that rounding.

use std::collections::BTreeMap;

use serde_json::Value;

/// A single node in the snapshot tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotNode {
    /// Numeric leaf. Exact for integers up to 2^53.
    Scalar(f64),
    /// Named children (a pool or a server).
    Node(BTreeMap<String, SnapshotNode>),
}

impl SnapshotNode {
    /// Returns the numeric value if this node is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            Self::Node(_) => None,
        }
    }

    /// Returns the children if this node is a mapping.
    #[must_use]
    pub fn as_node(&self) -> Option<&BTreeMap<String, SnapshotNode>> {
        match self {
            Self::Scalar(_) => None,
            Self::Node(children) => Some(children),
        }
    }

    /// Convert a decoded JSON value.
    ///
    /// Returns `None` for leaves that are not numbers (strings, booleans,
    /// null, arrays). Such leaves are dropped from their parent mapping.
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_f64().map(Self::Scalar),
            Value::Object(map) => Some(Self::Node(
                map.iter()
                    .filter_map(|(key, child)| Self::from_json(child).map(|node| (key.clone(), node)))
                    .collect(),
            )),
            Value::Null | Value::Bool(_) | Value::String(_) | Value::Array(_) => None,
        }
    }
}

/// Error returned when a JSON document cannot be turned into a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("snapshot root must be a JSON object, got {found}")]
pub struct SnapshotShapeError {
    /// JSON type found at the root.
    pub found: &'static str,
}

/// One collection cycle's decoded statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    root: BTreeMap<String, SnapshotNode>,
    labels: BTreeMap<String, String>,
}

impl Snapshot {
    /// Build a snapshot from an already-shaped root mapping.
    #[must_use]
    pub fn new(root: BTreeMap<String, SnapshotNode>) -> Self {
        Self {
            root,
            labels: BTreeMap::new(),
        }
    }

    /// Root entries: pools plus any global scalars.
    #[must_use]
    pub fn root(&self) -> &BTreeMap<String, SnapshotNode> {
        &self.root
    }

    /// String leaves found at the root (`service`, `source`, `version`).
    #[must_use]
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Look up a root string label.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Iterate pools in name order, skipping root scalars.
    pub fn pools(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, SnapshotNode>)> {
        self.root
            .iter()
            .filter_map(|(name, node)| node.as_node().map(|pool| (name.as_str(), pool)))
    }

    /// Number of pools in the snapshot.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools().count()
    }

    /// Parse a raw stats payload.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the payload is not JSON or its root is not
    /// an object.
    pub fn from_slice(payload: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(payload)?;
        Ok(Self::try_from(&value)?)
    }
}

impl TryFrom<&Value> for Snapshot {
    type Error = SnapshotShapeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(SnapshotShapeError {
                found: json_type(value),
            });
        };

        let mut root = BTreeMap::new();
        let mut labels = BTreeMap::new();
        for (key, child) in map {
            if let Value::String(text) = child {
                labels.insert(key.clone(), text.clone());
            } else if let Some(node) = SnapshotNode::from_json(child) {
                root.insert(key.clone(), node);
            }
        }

        Ok(Self { root, labels })
    }
}

/// Failure to turn a payload into a [`Snapshot`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid stats JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Shape(#[from] SnapshotShapeError),
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_beyond_f64_precision_round() {
        let snapshot =
            Snapshot::from_slice(br#"{"alpha": {"s1": {"response_bytes": 9007199254740993}}}"#)
                .unwrap();

        let (_, pool) = snapshot.pools().next().unwrap();
        let server = pool["s1"].as_node().unwrap();
        assert_eq!(server["response_bytes"].as_scalar(), Some(9_007_199_254_740_992.0));
    }

    #[test]
    fn decodes_pools_servers_and_labels() {
        let payload = json!({
            "service": "nutcracker",
            "source": "cache-01",
            "version": "0.4.1",
            "uptime": 120,
            "alpha": {
                "client_connections": 3,
                "10.0.0.1:6379": { "requests": 7 }
            }
        });

        let snapshot = Snapshot::try_from(&payload).unwrap();

        assert_eq!(snapshot.label("service"), Some("nutcracker"));
        assert_eq!(snapshot.label("version"), Some("0.4.1"));
        assert_eq!(snapshot.root()["uptime"], SnapshotNode::Scalar(120.0));
        assert_eq!(snapshot.pool_count(), 1);

        let (name, pool) = snapshot.pools().next().unwrap();
        assert_eq!(name, "alpha");
        assert_eq!(pool["client_connections"].as_scalar(), Some(3.0));
        let server = pool["10.0.0.1:6379"].as_node().unwrap();
        assert_eq!(server["requests"].as_scalar(), Some(7.0));
    }

    #[test]
    fn drops_non_numeric_leaves_below_root() {
        let payload = json!({
            "alpha": { "client_connections": 1, "note": "x", "flag": true, "gone": null }
        });

        let snapshot = Snapshot::try_from(&payload).unwrap();
        let (_, pool) = snapshot.pools().next().unwrap();

        assert_eq!(pool.len(), 1);
        assert!(pool.contains_key("client_connections"));
    }

    #[test]
    fn root_scalars_are_not_pools() {
        let snapshot = Snapshot::from_slice(br#"{"uptime": 5, "timestamp": 1700000000}"#).unwrap();
        assert_eq!(snapshot.pool_count(), 0);
        assert_eq!(snapshot.root().len(), 2);
    }

    #[test]
    fn empty_object_is_a_valid_snapshot() {
        let snapshot = Snapshot::from_slice(b"{}").unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn rejects_non_object_root() {
        let result = Snapshot::from_slice(b"[1, 2]");
        assert!(matches!(
            result,
            Err(DecodeError::Shape(SnapshotShapeError { found: "array" }))
        ));
    }

    #[test]
    fn rejects_truncated_payload() {
        let result = Snapshot::from_slice(br#"{"alpha": {"client_eof": 1"#);
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }
}
