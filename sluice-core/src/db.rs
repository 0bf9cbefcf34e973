use crate::{
    BatchPlan, BatchResult, Condition, Config, DataInput, DataRow, DbError, Diagnostics,
    Executor, FromRecord, IntoData, Link, LogDiagnostics, Record, RecordSet, Result, Router,
    RowsAffected, SqlRecord, SqlWriter, Statement, Tx, TypedValue, Value, WriteMode, count_query,
    format_query, printable_query, router::unavailable, rows_to_records,
};
use std::{borrow::Cow, sync::Arc};
use time::OffsetDateTime;

/// Entry point of the library: statement building, batching and materialization on top of the
/// links handed out by a [`Router`].
///
/// Writes, `exec`, `begin` and `ping_master` use the write link, everything reading uses the
/// read link. The `do_*` methods run on an explicit executor instead (a link already at hand or
/// an open transaction). Nothing runs concurrently: a batch is executed chunk after chunk.
pub struct Db<R> {
    router: R,
    config: Config,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<R: Router> Db<R> {
    pub fn new(router: R, config: Config) -> Self {
        Self {
            router,
            config,
            diagnostics: Arc::new(LogDiagnostics),
        }
    }

    /// Replace the sink receiving the statements recorded in debug mode.
    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Arc::new(diagnostics);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn sql_writer(&self) -> &'static dyn SqlWriter {
        self.config.dialect.sql_writer()
    }

    pub fn handle_table_name(&self, table: &str) -> String {
        self.sql_writer().handle_table_name(table, &self.config.prefix)
    }

    pub fn quote_word(&self, value: &str) -> String {
        self.sql_writer().quote_word(value)
    }

    pub fn quote_string(&self, value: &str) -> String {
        self.sql_writer().quote_string(value)
    }

    async fn master(&self) -> Result<R::Link> {
        self.router
            .write_link()
            .await
            .map_err(unavailable("master"))
    }

    async fn slave(&self) -> Result<R::Link> {
        self.router.read_link().await.map_err(unavailable("slave"))
    }

    pub(crate) fn format_condition(
        &self,
        condition: impl Into<Condition>,
        args: Vec<Value>,
    ) -> (String, Vec<Value>) {
        condition.into().format(self.sql_writer(), args)
    }

    /// Final text and arguments of a statement: lists expanded, placeholders in dialect form.
    fn finalize(&self, sql: &str, args: Vec<Value>) -> (String, Vec<Value>) {
        let (sql, args) = format_query(sql, args);
        let rewritten = match self.sql_writer().rewrite_placeholders(&sql) {
            Cow::Borrowed(..) => None,
            Cow::Owned(v) => Some(v),
        };
        (rewritten.unwrap_or(sql), args)
    }

    /// Report the outcome of a driver call and wrap its error.
    fn complete<T>(
        &self,
        sql: String,
        args: Vec<Value>,
        start: OffsetDateTime,
        result: Result<T>,
    ) -> Result<T> {
        if self.config.debug {
            let end = OffsetDateTime::now_utc();
            self.diagnostics.record(&SqlRecord {
                format: self.sql_writer().bind_args_to_query(&sql, &args),
                sql: sql.clone(),
                args: args.clone(),
                error: result.as_ref().err().map(|e| format!("{:#}", e)),
                start,
                end,
            });
        }
        result.map_err(|source| {
            if !self.config.debug {
                log::error!("{:#}\nWhile running: {}", source, printable_query!(sql));
            }
            DbError::Statement { sql, args, source }.into()
        })
    }

    /// Send a row producing statement to the read link.
    pub async fn query(
        &self,
        sql: &str,
        args: Vec<Value>,
    ) -> Result<<R::Link as Executor>::Cursor> {
        let link = self.slave().await?;
        self.do_query(&link, sql, args).await
    }

    pub async fn do_query<E: Executor>(
        &self,
        executor: &E,
        sql: &str,
        args: Vec<Value>,
    ) -> Result<E::Cursor> {
        let (sql, args) = self.finalize(sql, args);
        let start = OffsetDateTime::now_utc();
        let result = executor.query(&sql, &args).await;
        self.complete(sql, args, start, result)
    }

    /// Send a modifying statement to the write link.
    pub async fn exec(&self, sql: &str, args: Vec<Value>) -> Result<RowsAffected> {
        let link = self.master().await?;
        self.do_exec(&link, sql, args).await
    }

    pub async fn do_exec<E: Executor>(
        &self,
        executor: &E,
        sql: &str,
        args: Vec<Value>,
    ) -> Result<RowsAffected> {
        let (sql, args) = self.finalize(sql, args);
        let start = OffsetDateTime::now_utc();
        let result = executor.exec(&sql, &args).await;
        self.complete(sql, args, start, result)
    }

    /// Prepare `sql` on the write link when `on_master`, on the read link otherwise.
    pub async fn prepare(
        &self,
        sql: &str,
        on_master: bool,
    ) -> Result<<R::Link as Executor>::Prepared> {
        let link = if on_master {
            self.master().await?
        } else {
            self.slave().await?
        };
        self.do_prepare(&link, sql).await
    }

    pub async fn do_prepare<E: Executor>(&self, executor: &E, sql: &str) -> Result<E::Prepared> {
        let sql = self.sql_writer().rewrite_placeholders(sql);
        executor.prepare(&sql).await
    }

    pub async fn get_all(&self, sql: &str, args: Vec<Value>) -> Result<RecordSet> {
        let link = self.slave().await?;
        self.do_get_all(&link, sql, args).await
    }

    pub async fn do_get_all<E: Executor>(
        &self,
        executor: &E,
        sql: &str,
        args: Vec<Value>,
    ) -> Result<RecordSet> {
        let cursor = self.do_query(executor, sql, args).await?;
        rows_to_records(cursor).await
    }

    /// First row of the result, `None` when there is none.
    pub async fn get_one(&self, sql: &str, args: Vec<Value>) -> Result<Option<Record>> {
        Ok(self.get_all(sql, args).await?.into_iter().next())
    }

    /// First column of the first row.
    pub async fn get_value(&self, sql: &str, args: Vec<Value>) -> Result<Option<TypedValue>> {
        Ok(self.get_one(sql, args).await?.and_then(first_value))
    }

    /// Number of rows matched by a `SELECT`, counting with `COUNT(<fields>)` unless the query
    /// already selects a `COUNT(...)`.
    pub async fn get_count(&self, sql: &str, args: Vec<Value>) -> Result<i64> {
        let sql = count_query(sql);
        count_of(self.get_value(&sql, args).await?)
    }

    /// Decode the first row, [`DbError::NoRows`] when there is none.
    pub async fn get_struct<T: FromRecord>(&self, sql: &str, args: Vec<Value>) -> Result<T> {
        decode_one(self.get_one(sql, args).await?)
    }

    /// Decode every row, [`DbError::NoRows`] when there is none.
    pub async fn get_structs<T: FromRecord>(&self, sql: &str, args: Vec<Value>) -> Result<Vec<T>> {
        decode_all(self.get_all(sql, args).await?)
    }

    pub async fn ping_master(&self) -> Result<()> {
        self.master().await?.ping().await
    }

    pub async fn ping_slave(&self) -> Result<()> {
        self.slave().await?.ping().await
    }

    /// Open a transaction on the write link.
    pub async fn begin(&self) -> Result<Tx<'_, R>> {
        let link = self.master().await?;
        let transaction = link.begin().await?;
        Ok(Tx::new(self, transaction))
    }

    /// `INSERT INTO`, a duplicate key is an error. A sequence of rows is written in batches of
    /// [`Config::batch_size`].
    pub async fn insert(&self, table: &str, data: impl IntoData) -> Result<RowsAffected> {
        self.write(table, data, WriteMode::Insert).await
    }

    /// `INSERT IGNORE INTO`, duplicates are skipped.
    pub async fn insert_ignore(&self, table: &str, data: impl IntoData) -> Result<RowsAffected> {
        self.write(table, data, WriteMode::Ignore).await
    }

    /// `REPLACE INTO`, a duplicate is deleted then inserted again.
    pub async fn replace(&self, table: &str, data: impl IntoData) -> Result<RowsAffected> {
        self.write(table, data, WriteMode::Replace).await
    }

    /// `INSERT INTO ... ON DUPLICATE KEY UPDATE`, every column is updated on a duplicate.
    pub async fn save(&self, table: &str, data: impl IntoData) -> Result<RowsAffected> {
        self.write(table, data, WriteMode::Save).await
    }

    async fn write(
        &self,
        table: &str,
        data: impl IntoData,
        mode: WriteMode,
    ) -> Result<RowsAffected> {
        let data = data.into_data();
        check_rows(&data)?;
        let link = self.master().await?;
        self.do_insert(&link, table, data, mode).await
    }

    pub async fn do_insert<E: Executor>(
        &self,
        executor: &E,
        table: &str,
        data: impl IntoData,
        mode: WriteMode,
    ) -> Result<RowsAffected> {
        let table = self.handle_table_name(table);
        match data.into_data() {
            DataInput::Record(row) => {
                let statement = self.sql_writer().build_insert(&table, &row, mode)?;
                self.do_exec(executor, &statement.sql, statement.args).await
            }
            DataInput::Records(rows) => Ok(self
                .run_batch(executor, &table, &rows, mode, self.config.resolve_batch_size(None))
                .await?
                .into()),
            data @ DataInput::Scalar(..) => {
                Err(DbError::UnsupportedInputType(data.kind()).into())
            }
        }
    }

    pub async fn batch_insert(
        &self,
        table: &str,
        data: impl IntoData,
        batch: Option<usize>,
    ) -> Result<BatchResult> {
        self.write_batch(table, data, WriteMode::Insert, batch).await
    }

    pub async fn batch_insert_ignore(
        &self,
        table: &str,
        data: impl IntoData,
        batch: Option<usize>,
    ) -> Result<BatchResult> {
        self.write_batch(table, data, WriteMode::Ignore, batch).await
    }

    pub async fn batch_replace(
        &self,
        table: &str,
        data: impl IntoData,
        batch: Option<usize>,
    ) -> Result<BatchResult> {
        self.write_batch(table, data, WriteMode::Replace, batch).await
    }

    pub async fn batch_save(
        &self,
        table: &str,
        data: impl IntoData,
        batch: Option<usize>,
    ) -> Result<BatchResult> {
        self.write_batch(table, data, WriteMode::Save, batch).await
    }

    async fn write_batch(
        &self,
        table: &str,
        data: impl IntoData,
        mode: WriteMode,
        batch: Option<usize>,
    ) -> Result<BatchResult> {
        let data = data.into_data();
        check_rows(&data)?;
        let link = self.master().await?;
        self.do_batch_insert(&link, table, data, mode, batch).await
    }

    /// Write the rows of `data` in statements of `batch` rows (the configured size for `None`
    /// or `0`). A single record is a batch of one.
    pub async fn do_batch_insert<E: Executor>(
        &self,
        executor: &E,
        table: &str,
        data: impl IntoData,
        mode: WriteMode,
        batch: Option<usize>,
    ) -> Result<BatchResult> {
        let rows = match data.into_data() {
            DataInput::Records(rows) => rows,
            DataInput::Record(row) => vec![row],
            data @ DataInput::Scalar(..) => {
                return Err(DbError::UnsupportedInputType(data.kind()).into());
            }
        };
        let table = self.handle_table_name(table);
        self.run_batch(
            executor,
            &table,
            &rows,
            mode,
            self.config.resolve_batch_size(batch),
        )
        .await
    }

    async fn run_batch<E: Executor>(
        &self,
        executor: &E,
        table: &str,
        rows: &[DataRow],
        mode: WriteMode,
        batch: usize,
    ) -> Result<BatchResult> {
        let Some(first) = rows.first() else {
            return Err(DbError::DataEmpty.into());
        };
        let plan = BatchPlan::new(self.sql_writer(), table, first, mode)?;
        if let Some(i) = rows.iter().position(|row| !row.same_keys(first)) {
            log::warn!(
                "Row {} written to {} has different columns than the first one, only [{}] are written",
                i,
                table,
                plan.columns().join(", "),
            );
        }
        let mut result = BatchResult::default();
        for statement in plan.chunks(rows, batch) {
            match self.do_exec(executor, &statement.sql, statement.args).await {
                Ok(affected) => result.push(affected),
                Err(source) => {
                    return Err(DbError::BatchInterrupted {
                        applied: result,
                        source,
                    }
                    .into());
                }
            }
        }
        Ok(result)
    }

    /// `UPDATE <table> SET <data>[ WHERE <condition>]`.
    ///
    /// `data` is a record (`"col"=?` assignments) or a raw expression such as `"count=count+1"`.
    /// The arguments of the assignments come before `args`.
    pub async fn update(
        &self,
        table: &str,
        data: impl IntoData,
        condition: impl Into<Condition>,
        args: Vec<Value>,
    ) -> Result<RowsAffected> {
        let (condition, args) = self.format_condition(condition, args);
        let statement = self.update_statement(table, data, &condition, args)?;
        let link = self.master().await?;
        self.do_exec(&link, &statement.sql, statement.args).await
    }

    /// Like [`Db::update`] with the condition already formatted (no `WHERE` keyword).
    pub async fn do_update<E: Executor>(
        &self,
        executor: &E,
        table: &str,
        data: impl IntoData,
        condition: &str,
        args: Vec<Value>,
    ) -> Result<RowsAffected> {
        let statement = self.update_statement(table, data, condition, args)?;
        self.do_exec(executor, &statement.sql, statement.args).await
    }

    fn update_statement(
        &self,
        table: &str,
        data: impl IntoData,
        condition: &str,
        args: Vec<Value>,
    ) -> Result<Statement> {
        let table = self.handle_table_name(table);
        self.sql_writer()
            .build_update(&table, data.into_data(), condition, args)
    }

    /// `DELETE FROM <table>[ WHERE <condition>]`, an empty condition deletes every row.
    pub async fn delete(
        &self,
        table: &str,
        condition: impl Into<Condition>,
        args: Vec<Value>,
    ) -> Result<RowsAffected> {
        let (condition, args) = self.format_condition(condition, args);
        let link = self.master().await?;
        self.do_delete(&link, table, &condition, args).await
    }

    pub async fn do_delete<E: Executor>(
        &self,
        executor: &E,
        table: &str,
        condition: &str,
        args: Vec<Value>,
    ) -> Result<RowsAffected> {
        let table = self.handle_table_name(table);
        let statement = self.sql_writer().build_delete(&table, condition, args);
        self.do_exec(executor, &statement.sql, statement.args).await
    }
}

/// Reject inputs no insert can be built from, before any link is requested.
fn check_rows(data: &DataInput) -> Result<()> {
    match data {
        DataInput::Record(row) if row.is_empty() => Err(DbError::DataEmpty.into()),
        DataInput::Records(rows) if rows.first().is_none_or(DataRow::is_empty) => {
            Err(DbError::DataEmpty.into())
        }
        DataInput::Scalar(..) => Err(DbError::UnsupportedInputType(data.kind()).into()),
        _ => Ok(()),
    }
}

pub(crate) fn first_value(record: Record) -> Option<TypedValue> {
    record.values.into_vec().into_iter().next()
}

pub(crate) fn count_of(value: Option<TypedValue>) -> Result<i64> {
    match value {
        Some(v) => Ok(v.get::<Option<i64>>()?.unwrap_or_default()),
        None => Ok(0),
    }
}

pub(crate) fn decode_one<T: FromRecord>(record: Option<Record>) -> Result<T> {
    match record {
        Some(record) => T::from_record(&record),
        None => Err(DbError::NoRows.into()),
    }
}

pub(crate) fn decode_all<T: FromRecord>(records: RecordSet) -> Result<Vec<T>> {
    if records.is_empty() {
        return Err(DbError::NoRows.into());
    }
    records.iter().map(T::from_record).collect()
}
