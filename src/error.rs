//! Error handling for the food ledger
//!
//! Every fallible operation in the crate returns [`LedgerError`]. Driver
//! errors from `sqlx` are classified into the variants below so callers can
//! tell a dead connection apart from a rejected statement.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Main error type for record and report operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Constraint violation on '{table}': {message}")]
    ConstraintViolation { table: String, message: String },

    #[error("Invalid filter for '{table}': {reason}")]
    InvalidFilter { table: String, reason: String },

    #[error("Report '{name}' not found in catalog")]
    UnknownReport { name: String },

    #[error("Query failed: {message}")]
    QueryError { message: String },

    #[error("Unknown table '{name}'")]
    UnknownTable { name: String },

    #[error("Unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("No field values supplied for '{table}'")]
    EmptyFields { table: String },

    #[error("Ad-hoc statement rejected: '{keyword}' is not a read-only statement")]
    MutatingStatementRejected { keyword: String },

    #[error("Chart '{key}' not found")]
    UnknownChart { key: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Classify a driver error raised while writing to `table`.
    ///
    /// Database-level rejections (duplicate key, CHECK, type mismatch) become
    /// [`LedgerError::ConstraintViolation`].
    pub(crate) fn from_write(table: &str, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => LedgerError::ConstraintViolation {
                table: table.to_string(),
                message: db.message().to_string(),
            },
            other => Self::from_driver(other),
        }
    }

    /// Classify a driver error raised by a read-only statement.
    pub(crate) fn from_read(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => LedgerError::QueryError {
                message: db.message().to_string(),
            },
            other => Self::from_driver(other),
        }
    }

    fn from_driver(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => LedgerError::StoreUnavailable {
                message: err.to_string(),
            },
            other => LedgerError::QueryError {
                message: other.to_string(),
            },
        }
    }

    /// True when the failure came from the connection rather than the statement
    pub fn is_unavailable(&self) -> bool {
        matches!(self, LedgerError::StoreUnavailable { .. })
    }
}
