use crate::{AsValue, Context, DataRow, Error, Result, Value};
use std::{
    fmt::{self, Display},
    sync::Arc,
};

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;

/// Ordered decoded query result, one [`Record`] per row in driver order.
pub type RecordSet = Vec<Record>;

/// Raw column bytes, owned, paired with the driver type name of their column.
///
/// Conversions are deferred: the bytes are kept exactly as the driver produced them and are
/// interpreted on demand, guided by the type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedValue {
    raw: Option<Box<[u8]>>,
    database_type: Arc<str>,
}

impl TypedValue {
    pub fn new(raw: Option<Box<[u8]>>, database_type: Arc<str>) -> Self {
        Self { raw, database_type }
    }
    pub fn null(database_type: Arc<str>) -> Self {
        Self {
            raw: None,
            database_type,
        }
    }
    pub fn is_null(&self) -> bool {
        self.raw.is_none()
    }
    pub fn database_type(&self) -> &str {
        &self.database_type
    }
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }
    /// The bytes as text, `None` for NULL or invalid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.raw.as_deref().and_then(|v| std::str::from_utf8(v).ok())
    }
    pub fn into_bytes(self) -> Option<Box<[u8]>> {
        self.raw
    }
    /// Decode into the [`Value`] variant matching the column type.
    pub fn to_value(&self) -> Result<Value> {
        match &self.raw {
            None => Ok(Value::Null),
            Some(raw) => convert_value(raw, &self.database_type),
        }
    }
    /// Like [`TypedValue::to_value`], falling back to the raw text (or bytes) when the content
    /// does not parse as the declared type.
    pub fn to_value_lossy(&self) -> Value {
        self.to_value().unwrap_or_else(|_| match self.as_str() {
            Some(v) => Value::Unknown(Some(v.to_owned())),
            None => Value::Blob(self.raw.clone()),
        })
    }
    /// Convert into any [`AsValue`] type: `value.get::<i64>()`, `value.get::<Option<String>>()`.
    pub fn get<T: AsValue>(&self) -> Result<T> {
        T::try_from_value(self.to_value()?)
    }
}

impl Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Some(v) => f.write_str(&String::from_utf8_lossy(v)),
            None => Ok(()),
        }
    }
}

/// Interpret raw column bytes according to the database type name.
///
/// Integer families become `Int64` (`UInt64` when unsigned), floating point `Float64`, exact
/// numerics `Decimal`, temporal types their `time` counterpart, binary types `Blob`, character
/// types `Varchar`. Unrecognized types keep their text as `Unknown`.
pub fn convert_value(raw: &[u8], database_type: &str) -> Result<Value> {
    let upper = database_type.trim().to_ascii_uppercase();
    let base = upper
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    let text = || {
        std::str::from_utf8(raw)
            .map_err(Error::new)
            .with_context(|| format!("Column of type `{}` is not valid UTF-8", database_type))
    };
    Ok(match base {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "INT2"
        | "INT4" | "INT8" | "SMALLSERIAL" | "SERIAL" | "BIGSERIAL" | "YEAR" => {
            if upper.contains("UNSIGNED") {
                Value::UInt64(Some(<u64 as AsValue>::parse(text()?)?))
            } else {
                Value::Int64(Some(<i64 as AsValue>::parse(text()?)?))
            }
        }
        "FLOAT" | "DOUBLE" | "REAL" | "FLOAT4" | "FLOAT8" => {
            Value::Float64(Some(<f64 as AsValue>::parse(text()?)?))
        }
        "DECIMAL" | "NUMERIC" | "NUMBER" | "MONEY" => {
            Value::Decimal(Some(<rust_decimal::Decimal as AsValue>::parse(text()?)?))
        }
        "BIT" | "BOOL" | "BOOLEAN" => match raw {
            [b] if *b <= 1 => Value::Boolean(Some(*b == 1)),
            _ => Value::Boolean(Some(<bool as AsValue>::parse(text()?)?)),
        },
        "DATE" => Value::Date(Some(<time::Date as AsValue>::parse(text()?)?)),
        "TIME" => Value::Time(Some(<time::Time as AsValue>::parse(text()?)?)),
        "TIMESTAMPTZ" => {
            Value::TimestampWithTimezone(Some(<time::OffsetDateTime as AsValue>::parse(text()?)?))
        }
        "DATETIME" | "TIMESTAMP" if upper.contains("WITH TIME ZONE") => {
            Value::TimestampWithTimezone(Some(<time::OffsetDateTime as AsValue>::parse(text()?)?))
        }
        "DATETIME" | "TIMESTAMP" => {
            Value::Timestamp(Some(<time::PrimitiveDateTime as AsValue>::parse(text()?)?))
        }
        "UUID" => Value::Uuid(Some(<uuid::Uuid as AsValue>::parse(text()?)?)),
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" | "BYTEA"
        | "GEOMETRY" => Value::Blob(Some(raw.into())),
        "CHAR" | "VARCHAR" | "NCHAR" | "NVARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT"
        | "LONGTEXT" | "ENUM" | "SET" | "JSON" | "BPCHAR" | "CHARACTER" => {
            Value::Varchar(Some(text()?.to_owned()))
        }
        _ => match std::str::from_utf8(raw) {
            Ok(v) => Value::Unknown(Some(v.to_owned())),
            Err(..) => Value::Blob(Some(raw.into())),
        },
    })
}

/// One decoded row: column labels shared with the other rows of the same result.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Column names.
    pub labels: RowNames,
    /// Values, aligned by index with `labels`.
    pub values: Box<[TypedValue]>,
}

impl Record {
    pub fn new(labels: RowNames, values: Box<[TypedValue]>) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }
    /// Decode column `name`. A missing column is an error, a NULL one needs an `Option` target.
    pub fn get_as<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| Error::msg(format!("Column `{}` is not in the record", name)))?;
        value
            .get()
            .with_context(|| format!("Could not decode column `{}`", name))
    }
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &TypedValue)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
    /// Back to a writable row, so that query results can be fed to the mutation entry points.
    pub fn to_row(&self) -> DataRow {
        self.iter()
            .map(|(k, v)| (k, v.to_value_lossy()))
            .collect()
    }
}

/// Decoding of a [`Record`] into a caller type (the struct side of `get_struct`).
///
/// ```rust,ignore
/// impl FromRecord for User {
///     fn from_record(record: &Record) -> Result<Self> {
///         Ok(User {
///             id: record.get_as("id")?,
///             name: record.get_as("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(record.clone())
    }
}

impl FromRecord for DataRow {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(record.to_row())
    }
}
