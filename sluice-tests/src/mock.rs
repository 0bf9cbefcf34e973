use sluice_core::{
    ColumnType, Error, Executor, Link, Result, Router, RowCursor, RowsAffected, Transaction,
    Value,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;

/// Error produced by the scripted driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("mock driver: {0}")]
pub struct MockError(pub String);

/// What the driver received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query { sql: String, args: Vec<Value> },
    Exec { sql: String, args: Vec<Value> },
    Prepare { sql: String },
    Ping,
    Begin,
    Commit,
    Rollback,
}

impl Call {
    pub fn sql(&self) -> Option<&str> {
        match self {
            Call::Query { sql, .. } | Call::Exec { sql, .. } | Call::Prepare { sql } => Some(sql),
            _ => None,
        }
    }
    pub fn args(&self) -> &[Value] {
        match self {
            Call::Query { args, .. } | Call::Exec { args, .. } => args,
            _ => &[],
        }
    }
}

/// Result set returned by the next query.
#[derive(Default, Debug, Clone)]
pub struct MockRows {
    columns: Vec<ColumnType>,
    rows: VecDeque<Vec<Option<Vec<u8>>>>,
    fail_scan_at: Option<usize>,
}

impl MockRows {
    pub fn new<'a>(columns: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, ty)| ColumnType::new(name, ty))
                .collect(),
            ..Default::default()
        }
    }
    pub fn row<'a>(mut self, values: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        self.rows.push_back(
            values
                .into_iter()
                .map(|v| v.map(|v| v.as_bytes().to_vec()))
                .collect(),
        );
        self
    }
    pub fn row_bytes(mut self, values: impl IntoIterator<Item = Option<Vec<u8>>>) -> Self {
        self.rows.push_back(values.into_iter().collect());
        self
    }
    /// Scanning row `index` (zero based) fails.
    pub fn fail_scan_at(mut self, index: usize) -> Self {
        self.fail_scan_at = Some(index);
        self
    }
}

/// Cursor decoding every row into the same buffer, like real drivers do.
#[derive(Debug)]
pub struct MockCursor {
    columns: Vec<ColumnType>,
    rows: VecDeque<Vec<Option<Vec<u8>>>>,
    fail_scan_at: Option<usize>,
    current: Option<usize>,
    buffer: Vec<u8>,
    offsets: Vec<Option<(usize, usize)>>,
}

impl MockCursor {
    pub fn new(rows: MockRows) -> Self {
        Self {
            columns: rows.columns,
            rows: rows.rows,
            fail_scan_at: rows.fail_scan_at,
            current: None,
            buffer: Vec::new(),
            offsets: Vec::new(),
        }
    }
}

impl RowCursor for MockCursor {
    async fn next(&mut self) -> Result<bool> {
        let Some(row) = self.rows.pop_front() else {
            return Ok(false);
        };
        self.current = Some(self.current.map_or(0, |v| v + 1));
        self.buffer.clear();
        self.offsets.clear();
        for value in row {
            self.offsets.push(value.map(|v| {
                let start = self.buffer.len();
                self.buffer.extend_from_slice(&v);
                (start, self.buffer.len())
            }));
        }
        Ok(true)
    }

    fn columns(&self) -> Result<Vec<ColumnType>> {
        Ok(self.columns.clone())
    }

    fn scan(&mut self) -> Result<Vec<Option<&[u8]>>> {
        if self.current.is_some() && self.current == self.fail_scan_at {
            let row = self.current.unwrap_or_default();
            return Err(MockError(format!("cannot scan row {}", row)).into());
        }
        Ok(self
            .offsets
            .iter()
            .map(|v| v.map(|(start, end)| &self.buffer[start..end]))
            .collect())
    }
}

#[derive(Default, Debug)]
struct State {
    calls: Vec<Call>,
    results: VecDeque<MockRows>,
    affected: VecDeque<RowsAffected>,
    execs: usize,
    fail_exec_at: Option<usize>,
    fail_query: bool,
    fail_ping: bool,
    fail_begin: bool,
}

/// Scripted in-memory link. Clones share the same script and call log.
#[derive(Debug, Clone)]
pub struct MockLink {
    name: Arc<str>,
    state: Arc<Mutex<State>>,
}

impl MockLink {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            state: Default::default(),
        }
    }
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Every call received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }
    pub fn executed(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|v| matches!(v, Call::Exec { .. }))
            .collect()
    }
    /// Rows for the next query, queries past the scripted ones return no rows.
    pub fn push_rows(&self, rows: MockRows) -> &Self {
        self.state().results.push_back(rows);
        self
    }
    /// Result of the next exec, unscripted execs report one affected row.
    pub fn push_affected(&self, rows_affected: u64, last_insert_id: Option<i64>) -> &Self {
        self.state().affected.push_back(RowsAffected {
            rows_affected,
            last_insert_id,
        });
        self
    }
    /// The exec number `index` (zero based) fails.
    pub fn fail_exec_at(&self, index: usize) -> &Self {
        self.state().fail_exec_at = Some(index);
        self
    }
    pub fn fail_query(&self) -> &Self {
        self.state().fail_query = true;
        self
    }
    pub fn fail_ping(&self) -> &Self {
        self.state().fail_ping = true;
        self
    }
    pub fn fail_begin(&self) -> &Self {
        self.state().fail_begin = true;
        self
    }
    fn run_query(&self, sql: &str, args: &[Value]) -> Result<MockCursor> {
        let mut state = self.state();
        state.calls.push(Call::Query {
            sql: sql.into(),
            args: args.to_vec(),
        });
        if state.fail_query {
            return Err(MockError(format!("query rejected by {}", self.name)).into());
        }
        Ok(MockCursor::new(state.results.pop_front().unwrap_or_default()))
    }
    fn run_exec(&self, sql: &str, args: &[Value]) -> Result<RowsAffected> {
        let mut state = self.state();
        state.calls.push(Call::Exec {
            sql: sql.into(),
            args: args.to_vec(),
        });
        let index = state.execs;
        state.execs += 1;
        if state.fail_exec_at == Some(index) {
            return Err(MockError(format!("exec {} rejected by {}", index, self.name)).into());
        }
        Ok(state.affected.pop_front().unwrap_or(RowsAffected {
            rows_affected: 1,
            last_insert_id: None,
        }))
    }
    fn run_prepare(&self, sql: &str) -> String {
        self.state().calls.push(Call::Prepare { sql: sql.into() });
        sql.to_owned()
    }
}

impl Executor for MockLink {
    type Cursor = MockCursor;
    type Prepared = String;

    async fn query(&self, sql: &str, args: &[Value]) -> Result<MockCursor> {
        self.run_query(sql, args)
    }

    async fn exec(&self, sql: &str, args: &[Value]) -> Result<RowsAffected> {
        self.run_exec(sql, args)
    }

    async fn prepare(&self, sql: &str) -> Result<String> {
        Ok(self.run_prepare(sql))
    }
}

impl Link for MockLink {
    type Transaction = MockTransaction;

    async fn ping(&self) -> Result<()> {
        let mut state = self.state();
        state.calls.push(Call::Ping);
        if state.fail_ping {
            return Err(MockError(format!("{} is unreachable", self.name)).into());
        }
        Ok(())
    }

    async fn begin(&self) -> Result<MockTransaction> {
        let mut state = self.state();
        state.calls.push(Call::Begin);
        if state.fail_begin {
            return Err(MockError(format!("{} cannot start a transaction", self.name)).into());
        }
        Ok(MockTransaction { link: self.clone() })
    }
}

/// Transaction of a [`MockLink`], recording into the log of its link.
#[derive(Debug)]
pub struct MockTransaction {
    link: MockLink,
}

impl Executor for MockTransaction {
    type Cursor = MockCursor;
    type Prepared = String;

    async fn query(&self, sql: &str, args: &[Value]) -> Result<MockCursor> {
        self.link.run_query(sql, args)
    }

    async fn exec(&self, sql: &str, args: &[Value]) -> Result<RowsAffected> {
        self.link.run_exec(sql, args)
    }

    async fn prepare(&self, sql: &str) -> Result<String> {
        Ok(self.link.run_prepare(sql))
    }
}

impl Transaction for MockTransaction {
    async fn commit(self) -> Result<()> {
        self.link.state().calls.push(Call::Commit);
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.link.state().calls.push(Call::Rollback);
        Ok(())
    }
}

/// Router whose pool is exhausted: every request for a link fails.
#[derive(Default, Debug, Clone, Copy)]
pub struct UnavailableRouter;

impl Router for UnavailableRouter {
    type Link = MockLink;

    async fn write_link(&self) -> Result<MockLink> {
        Err(Error::new(MockError("no master configured".into())))
    }

    async fn read_link(&self) -> Result<MockLink> {
        Err(Error::new(MockError("no slave configured".into())))
    }
}
