//! Statement building, batch execution and result materialization between application code
//! and a SQL driver.
//!
//! Drivers implement [`Executor`], [`Link`], [`Transaction`] and [`RowCursor`]; a [`Router`]
//! hands their links to a [`Db`], which builds the statements, splits batch writes into
//! chunks and copies the result rows into owned [`Record`]s.
pub use sluice_core::*;
