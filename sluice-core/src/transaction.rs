use crate::{
    BatchResult, Condition, Db, Executor, FromRecord, IntoData, Link, Record, RecordSet, Result,
    Router, RowsAffected, TypedValue, Value, WriteMode,
};
use std::future::Future;

/// An open driver transaction, itself an executor.
pub trait Transaction: Executor {
    fn commit(self) -> impl Future<Output = Result<()>> + Send;
    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}

/// Transaction started by [`Db::begin`].
///
/// Every statement runs on the transaction link, the router is not consulted again. Dropping a
/// `Tx` without calling [`Tx::commit`] or [`Tx::rollback`] leaves the outcome to the driver.
pub struct Tx<'d, R: Router> {
    db: &'d Db<R>,
    transaction: <R::Link as Link>::Transaction,
}

type TxOf<R> = <<R as Router>::Link as Link>::Transaction;

impl<'d, R: Router> Tx<'d, R> {
    pub(crate) fn new(db: &'d Db<R>, transaction: TxOf<R>) -> Self {
        Self { db, transaction }
    }

    pub fn transaction(&self) -> &TxOf<R> {
        &self.transaction
    }

    pub async fn commit(self) -> Result<()> {
        self.transaction.commit().await
    }

    pub async fn rollback(self) -> Result<()> {
        self.transaction.rollback().await
    }

    pub async fn query(
        &self,
        sql: &str,
        args: Vec<Value>,
    ) -> Result<<TxOf<R> as Executor>::Cursor> {
        self.db.do_query(&self.transaction, sql, args).await
    }

    pub async fn exec(&self, sql: &str, args: Vec<Value>) -> Result<RowsAffected> {
        self.db.do_exec(&self.transaction, sql, args).await
    }

    pub async fn prepare(&self, sql: &str) -> Result<<TxOf<R> as Executor>::Prepared> {
        self.db.do_prepare(&self.transaction, sql).await
    }

    pub async fn get_all(&self, sql: &str, args: Vec<Value>) -> Result<RecordSet> {
        self.db.do_get_all(&self.transaction, sql, args).await
    }

    pub async fn get_one(&self, sql: &str, args: Vec<Value>) -> Result<Option<Record>> {
        Ok(self.get_all(sql, args).await?.into_iter().next())
    }

    pub async fn get_value(&self, sql: &str, args: Vec<Value>) -> Result<Option<TypedValue>> {
        Ok(self
            .get_one(sql, args)
            .await?
            .and_then(crate::db::first_value))
    }

    pub async fn get_count(&self, sql: &str, args: Vec<Value>) -> Result<i64> {
        let sql = crate::count_query(sql);
        crate::db::count_of(self.get_value(&sql, args).await?)
    }

    pub async fn get_struct<T: FromRecord>(&self, sql: &str, args: Vec<Value>) -> Result<T> {
        crate::db::decode_one(self.get_one(sql, args).await?)
    }

    pub async fn get_structs<T: FromRecord>(&self, sql: &str, args: Vec<Value>) -> Result<Vec<T>> {
        crate::db::decode_all(self.get_all(sql, args).await?)
    }

    pub async fn insert(&self, table: &str, data: impl IntoData) -> Result<RowsAffected> {
        self.db
            .do_insert(&self.transaction, table, data, WriteMode::Insert)
            .await
    }

    pub async fn insert_ignore(&self, table: &str, data: impl IntoData) -> Result<RowsAffected> {
        self.db
            .do_insert(&self.transaction, table, data, WriteMode::Ignore)
            .await
    }

    pub async fn replace(&self, table: &str, data: impl IntoData) -> Result<RowsAffected> {
        self.db
            .do_insert(&self.transaction, table, data, WriteMode::Replace)
            .await
    }

    pub async fn save(&self, table: &str, data: impl IntoData) -> Result<RowsAffected> {
        self.db
            .do_insert(&self.transaction, table, data, WriteMode::Save)
            .await
    }

    pub async fn batch_insert(
        &self,
        table: &str,
        data: impl IntoData,
        batch: Option<usize>,
    ) -> Result<BatchResult> {
        self.db
            .do_batch_insert(&self.transaction, table, data, WriteMode::Insert, batch)
            .await
    }

    pub async fn batch_insert_ignore(
        &self,
        table: &str,
        data: impl IntoData,
        batch: Option<usize>,
    ) -> Result<BatchResult> {
        self.db
            .do_batch_insert(&self.transaction, table, data, WriteMode::Ignore, batch)
            .await
    }

    pub async fn batch_replace(
        &self,
        table: &str,
        data: impl IntoData,
        batch: Option<usize>,
    ) -> Result<BatchResult> {
        self.db
            .do_batch_insert(&self.transaction, table, data, WriteMode::Replace, batch)
            .await
    }

    pub async fn batch_save(
        &self,
        table: &str,
        data: impl IntoData,
        batch: Option<usize>,
    ) -> Result<BatchResult> {
        self.db
            .do_batch_insert(&self.transaction, table, data, WriteMode::Save, batch)
            .await
    }

    pub async fn update(
        &self,
        table: &str,
        data: impl IntoData,
        condition: impl Into<Condition>,
        args: Vec<Value>,
    ) -> Result<RowsAffected> {
        let (condition, args) = self.db.format_condition(condition, args);
        self.db
            .do_update(&self.transaction, table, data, &condition, args)
            .await
    }

    pub async fn delete(
        &self,
        table: &str,
        condition: impl Into<Condition>,
        args: Vec<Value>,
    ) -> Result<RowsAffected> {
        let (condition, args) = self.db.format_condition(condition, args);
        self.db
            .do_delete(&self.transaction, table, &condition, args)
            .await
    }
}
