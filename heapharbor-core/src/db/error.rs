//! Database error type
//!
//! Every write path returns `DbError`. Callers that need to pick a response
//! (the HTTP layer, the CLI) match on [`DbError::kind`] rather than on SQL
//! details.

use std::time::Duration;

use crate::models::ValidationError;

/// SQLSTATE for a serialization failure under concurrent transactions
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for a detected deadlock
const DEADLOCK_DETECTED: &str = "40P01";
/// SQLSTATE raised when `statement_timeout` cancels a statement
const QUERY_CANCELED: &str = "57014";
/// SQLSTATE raised when `lock_timeout` expires
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("conflict on {resource} '{key}'")]
    Conflict { resource: &'static str, key: String },

    #[error("lost a concurrent write race on {resource} '{key}'")]
    RaceLost { resource: &'static str, key: String },

    #[error("{operation} did not finish within {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

/// Coarse classification for callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced question, answer, tag or user does not exist
    NotFound,
    /// Caller input failed validation
    Invalid,
    /// Duplicate natural key, or a concurrent writer won a race
    Conflict,
    /// Storage failure, deadlock, timeout or cancellation; nothing was applied
    Unavailable,
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Invalid,
            Self::Conflict { .. } | Self::RaceLost { .. } => ErrorKind::Conflict,
            Self::Timeout { .. } => ErrorKind::Unavailable,
            // Deadlocks and serialization failures that outlived the retries
            // are storage failures, not caller conflicts
            Self::Sqlx(_) => ErrorKind::Unavailable,
        }
    }

    /// Whether a fresh transaction could succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RaceLost { .. } => true,
            Self::Sqlx(err) => matches!(
                sqlstate(err).as_deref(),
                Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
            ),
            _ => false,
        }
    }

    /// Whether the store cancelled the statement on a configured timeout.
    pub fn is_store_timeout(&self) -> bool {
        match self {
            Self::Sqlx(err) => matches!(
                sqlstate(err).as_deref(),
                Some(QUERY_CANCELED | LOCK_NOT_AVAILABLE)
            ),
            _ => false,
        }
    }

    /// Map a foreign-key violation on insert to `NotFound`.
    ///
    /// Used as the backstop when a referenced row disappears between the
    /// existence check and the insert.
    pub(crate) fn missing_reference(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_foreign_key_violation() {
                let id = db.constraint().unwrap_or("unknown").to_owned();
                return Self::NotFound {
                    resource: "referenced row",
                    id,
                };
            }
        }
        Self::Sqlx(err)
    }

    /// Map a unique violation to `Conflict` on `resource`.
    pub(crate) fn unique_conflict(err: sqlx::Error, resource: &'static str, key: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::Conflict {
                    resource,
                    key: key.to_owned(),
                };
            }
        }
        Self::Sqlx(err)
    }
}

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}
