//! Domain errors raised while turning a snapshot into metrics.
//!
//! Any of these aborts the whole collection cycle; no partial batch is
//! produced.
//!
//! # Examples
//!
//! ```
//! use twemrelic::domain::error::{DomainError, Entity};
//!
//! let err = DomainError::MissingField {
//!     entity: Entity::pool("alpha"),
//!     field: "client_err",
//! };
//! assert_eq!(
//!     err.to_string(),
//!     "schema mismatch: pool 'alpha' has no field 'client_err'"
//! );
//! ```

use std::fmt;

use thiserror::Error;

/// The snapshot entity an error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    /// Snapshot-wide totals.
    Totals,
    Pool {
        pool: String,
    },
    Server {
        pool: String,
        server: String,
    },
}

impl Entity {
    /// A pool entity.
    #[must_use]
    pub fn pool(pool: impl Into<String>) -> Self {
        Self::Pool { pool: pool.into() }
    }

    /// A server entity inside `pool`.
    #[must_use]
    pub fn server(pool: impl Into<String>, server: impl Into<String>) -> Self {
        Self::Server {
            pool: pool.into(),
            server: server.into(),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Totals => f.write_str("snapshot totals"),
            Self::Pool { pool } => write!(f, "pool '{pool}'"),
            Self::Server { pool, server } => write!(f, "server '{pool}/{server}'"),
        }
    }
}

/// Errors that fail a collection cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An expected scalar field is absent (or is not a scalar).
    #[error("schema mismatch: {entity} has no field '{field}'")]
    MissingField {
        /// Pool or server that lacked the field.
        entity: Entity,
        /// Raw field name from the classification table.
        field: &'static str,
    },

    /// Two observations in one cycle would share a name.
    #[error("duplicate metric name '{name}' from {entity}")]
    DuplicateMetric {
        /// The colliding metric name.
        name: String,
        /// Entity whose report produced the second occurrence.
        entity: Entity,
    },
}
