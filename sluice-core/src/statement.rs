use crate::Value;
use std::fmt::{self, Display};

/// Duplicate key behavior of an insert-family statement.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteMode {
    /// Plain insert, a duplicate key is an error.
    #[default]
    Insert,
    /// `INSERT IGNORE`, duplicates are skipped.
    Ignore,
    /// `REPLACE`, the existing row is deleted and the new one inserted.
    Replace,
    /// Upsert: `INSERT ... ON DUPLICATE KEY UPDATE` every column.
    Save,
}

impl WriteMode {
    pub fn verb(&self) -> &'static str {
        match self {
            WriteMode::Insert | WriteMode::Save => "INSERT",
            WriteMode::Ignore => "INSERT IGNORE",
            WriteMode::Replace => "REPLACE",
        }
    }
}

/// SQL text with positional `?` placeholders and the arguments bound to them, in order.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }
    /// Number of `?` placeholders in the text.
    pub fn placeholders(&self) -> usize {
        self.sql.matches('?').count()
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted identifier when available.
    pub last_insert_id: Option<i64>,
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_insert_id.is_some() {
                self.last_insert_id = elem.last_insert_id;
            }
        }
    }
}

/// Result of a chunked write: one logical operation spread over several statements.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchResult {
    /// Sum of the rows affected by every executed chunk.
    pub rows_affected: u64,
    /// Native result of the most recent chunk.
    pub last_result: Option<RowsAffected>,
    /// Number of chunks executed.
    pub chunks: usize,
}

impl BatchResult {
    pub fn push(&mut self, result: RowsAffected) {
        self.rows_affected += result.rows_affected;
        self.last_result = Some(result);
        self.chunks += 1;
    }
    pub fn last_insert_id(&self) -> Option<i64> {
        self.last_result.and_then(|v| v.last_insert_id)
    }
}

impl From<BatchResult> for RowsAffected {
    fn from(value: BatchResult) -> Self {
        RowsAffected {
            rows_affected: value.rows_affected,
            last_insert_id: value.last_insert_id(),
        }
    }
}
