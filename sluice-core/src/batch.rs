use crate::{DataRow, DbError, Result, SqlWriter, Statement, Value, WriteMode};

/// Default number of rows written by one statement of a batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Statement skeleton shared by every chunk of a batch write.
///
/// The column list and the duplicate key clause are computed once, from the first row of the
/// batch. Later rows are read in that column order: a column they lack is bound as `NULL`, a
/// column the first row lacks is not written at all.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    columns: Vec<String>,
    head: String,
    group: String,
    tail: String,
}

impl BatchPlan {
    pub fn new(
        writer: &dyn SqlWriter,
        table: &str,
        first: &DataRow,
        mode: WriteMode,
    ) -> Result<Self> {
        if first.is_empty() {
            return Err(DbError::DataEmpty.into());
        }
        let columns: Vec<String> = first.keys().map(ToOwned::to_owned).collect();
        let mut head = String::with_capacity(32 + table.len() + columns.len() * 24);
        head.push_str(mode.verb());
        head.push_str(" INTO ");
        head.push_str(table);
        head.push('(');
        writer.write_columns(&mut head, &mut columns.iter().map(String::as_str));
        head.push_str(") VALUES");
        let mut group = String::with_capacity(columns.len() * 2 + 2);
        writer.write_value_group(&mut group, columns.len());
        let mut tail = String::new();
        if mode == WriteMode::Save {
            writer.write_on_duplicate_update(&mut tail, &mut columns.iter().map(String::as_str));
        }
        Ok(Self {
            columns,
            head,
            group,
            tail,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Append the values of `row` to `args`, in the column order of the plan.
    pub fn push_row(&self, row: &DataRow, args: &mut Vec<Value>) {
        args.extend(
            self.columns
                .iter()
                .map(|k| row.get(k).cloned().unwrap_or_default()),
        );
    }

    /// Statement inserting `groups` rows whose values are `args`.
    pub fn statement(&self, groups: usize, args: Vec<Value>) -> Statement {
        let capacity = self.head.len() + (self.group.len() + 1) * groups + self.tail.len();
        let mut sql = String::with_capacity(capacity);
        sql.push_str(&self.head);
        for i in 0..groups {
            if i > 0 {
                sql.push(',');
            }
            sql.push_str(&self.group);
        }
        sql.push_str(&self.tail);
        Statement::new(sql, args)
    }

    /// Split `rows` into the statements of the batch, `batch` rows each (the last may be short).
    pub fn chunks<'a>(
        &'a self,
        rows: &'a [DataRow],
        batch: usize,
    ) -> impl Iterator<Item = Statement> + 'a {
        rows.chunks(batch.max(1)).map(move |chunk| {
            let mut args = Vec::with_capacity(chunk.len() * self.columns.len());
            for row in chunk {
                self.push_row(row, &mut args);
            }
            self.statement(chunk.len(), args)
        })
    }
}
