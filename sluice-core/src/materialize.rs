use crate::{
    DbError, Error, Record, RecordSet, Result, RowCursor, RowNames, TypedValue,
    stream::{Stream, StreamExt},
};
use async_stream::try_stream;
use std::{pin::pin, sync::Arc};

/// Column labels and type names, read once per result.
fn column_layout(cursor: &impl RowCursor) -> Result<(RowNames, Box<[Arc<str>]>)> {
    let columns = cursor.columns()?;
    let labels: RowNames = columns.iter().map(|c| c.name.clone()).collect();
    let types = columns
        .into_iter()
        .map(|c| Arc::<str>::from(c.database_type))
        .collect();
    Ok((labels, types))
}

/// Copy the current row out of the cursor buffer.
fn copy_row(cursor: &mut impl RowCursor, types: &[Arc<str>]) -> Result<Box<[TypedValue]>> {
    let raw = cursor.scan()?;
    if raw.len() != types.len() {
        return Err(Error::msg(format!(
            "Row has {} values but the result declares {} columns",
            raw.len(),
            types.len()
        )));
    }
    Ok(raw
        .into_iter()
        .zip(types)
        .map(|(v, t)| TypedValue::new(v.map(Into::into), t.clone()))
        .collect())
}

/// Lazily decode the rows of `cursor` into owned [`Record`]s, in driver order.
pub fn record_stream<C: RowCursor>(mut cursor: C) -> impl Stream<Item = Result<Record>> + Send {
    try_stream! {
        let mut layout: Option<(RowNames, Box<[Arc<str>]>)> = None;
        while cursor.next().await? {
            if layout.is_none() {
                layout = Some(column_layout(&cursor)?);
            }
            if let Some((labels, types)) = &layout {
                let values = copy_row(&mut cursor, types)?;
                yield Record::new(labels.clone(), values);
            }
        }
    }
}

/// Collect every row of `cursor`.
///
/// No rows is an empty set, not an error. When the cursor fails midway the error is a
/// [`DbError::Scan`] holding the rows decoded so far.
pub async fn rows_to_records<C: RowCursor>(cursor: C) -> Result<RecordSet> {
    let mut stream = pin!(record_stream(cursor));
    let mut rows = RecordSet::new();
    while let Some(row) = stream.next().await {
        match row {
            Ok(row) => rows.push(row),
            Err(source) => return Err(DbError::Scan { rows, source }.into()),
        }
    }
    Ok(rows)
}
