use crate::{BatchResult, Error, RecordSet, Value};
use thiserror::Error;

/// Failures the core itself can classify.
///
/// Everything travels as [`crate::Error`] (`anyhow::Error`); use [`db_error`] to find the
/// kind anywhere in a chain, the driver error of a [`DbError::Statement`] stays reachable
/// through `Error::chain` and `downcast_ref`.
#[derive(Error, Debug)]
pub enum DbError {
    /// The normalized input has no columns or no rows.
    #[error("data cannot be empty")]
    DataEmpty,

    /// The input shape is not usable for the operation.
    #[error("unsupported data type: {0}")]
    UnsupportedInputType(&'static str),

    /// The router could not hand out a link.
    #[error("no {role} connection available")]
    ConnectionUnavailable {
        role: &'static str,
        #[source]
        source: Error,
    },

    /// The driver rejected a statement.
    #[error("statement failed: {sql}")]
    Statement {
        sql: String,
        args: Vec<Value>,
        #[source]
        source: Error,
    },

    /// Decoding rows failed after `rows` were already materialized.
    #[error("row scan failed after {} rows", .rows.len())]
    Scan {
        rows: RecordSet,
        #[source]
        source: Error,
    },

    /// A query expected to produce one row produced none.
    #[error("no rows in result set")]
    NoRows,

    /// A chunk of a batch failed, the chunks in `applied` were executed.
    #[error("batch stopped after {} chunks", .applied.chunks)]
    BatchInterrupted {
        applied: BatchResult,
        #[source]
        source: Error,
    },
}

/// First [`DbError`] in the chain of `error`.
pub fn db_error(error: &Error) -> Option<&DbError> {
    error.chain().find_map(|e| e.downcast_ref::<DbError>())
}

/// True when the error says a single-row query found nothing.
pub fn is_no_rows(error: &Error) -> bool {
    matches!(db_error(error), Some(DbError::NoRows))
}
