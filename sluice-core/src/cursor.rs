use crate::Result;
use std::future::Future;

/// Name and driver reported type of a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    pub name: String,
    /// Database type name as the driver reports it (`"VARCHAR"`, `"INT UNSIGNED"`, `"int8"`).
    pub database_type: String,
}

impl ColumnType {
    pub fn new(name: impl Into<String>, database_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database_type: database_type.into(),
        }
    }
}

/// Driver row cursor, positioned before the first row when returned by a query.
///
/// # Buffer reuse
/// `scan` hands out slices borrowed from the cursor: a driver is free to decode every row into
/// the same buffer. The borrow ends before the next call to [`RowCursor::next`], so whoever
/// keeps a value must copy it out first.
pub trait RowCursor: Send {
    /// Advance to the next row, `false` once the rows are exhausted.
    fn next(&mut self) -> impl Future<Output = Result<bool>> + Send;

    /// Column metadata, available once the cursor is positioned on a row.
    fn columns(&self) -> Result<Vec<ColumnType>>;

    /// Raw column values of the current row, `None` for SQL NULL.
    fn scan(&mut self) -> Result<Vec<Option<&[u8]>>>;
}
