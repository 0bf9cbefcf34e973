use crate::{Result, RowCursor, RowsAffected, Transaction, Value};
use std::future::Future;

/// Something statements can be sent to: a driver connection or an open transaction.
///
/// The SQL received here is final: list arguments are already expanded and the placeholders
/// already rewritten for the dialect.
pub trait Executor: Send + Sync {
    type Cursor: RowCursor;
    type Prepared: Send;

    /// Run a statement that produces rows.
    fn query(&self, sql: &str, args: &[Value])
    -> impl Future<Output = Result<Self::Cursor>> + Send;

    /// Run a statement that modifies rows.
    fn exec(&self, sql: &str, args: &[Value]) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Prepare a statement for later execution.
    fn prepare(&self, sql: &str) -> impl Future<Output = Result<Self::Prepared>> + Send;
}

/// A connection handed out by a [`crate::Router`] for the duration of one operation.
pub trait Link: Executor {
    type Transaction: Transaction;

    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// Open a transaction on this link.
    fn begin(&self) -> impl Future<Output = Result<Self::Transaction>> + Send;
}
