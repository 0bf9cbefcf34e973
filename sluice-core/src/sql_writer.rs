use crate::{
    DataInput, DataRow, DbError, Result, Statement, Value, WriteMode, handle_table_name,
    quote_string, quote_word, separated_by,
};
use regex::Regex;
use std::{
    borrow::Cow,
    fmt::Write,
    sync::LazyLock,
};
use time::{Date, Time, UtcOffset};

static COUNT_PRESENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)SELECT\s+COUNT\(.+\)\s+FROM").expect("valid regex"));
static COUNT_FIELDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)(SELECT)\s+(.+)\s+(FROM)").expect("valid regex"));

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $out:ident, $value:expr) => {{
        if $value.is_finite() {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format_finite($value));
        } else {
            $this.write_value_string($out, &$value.to_string());
        }
    }};
}

/// Dialect aware SQL text generation.
///
/// Every method has a default that targets the generic (ANSI-ish, MySQL flavored) syntax the
/// statement builder emits; dialects override the quote characters, literal escaping and the
/// placeholder rewrite performed right before execution.
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Left and right identifier quote characters.
    fn quote_chars(&self) -> (char, char) {
        ('"', '"')
    }

    fn quote_word(&self, value: &str) -> String {
        let (left, right) = self.quote_chars();
        quote_word(value, left, right)
    }

    fn quote_string(&self, value: &str) -> String {
        let (left, right) = self.quote_chars();
        quote_string(value, left, right)
    }

    fn handle_table_name(&self, table: &str, prefix: &str) -> String {
        let (left, right) = self.quote_chars();
        handle_table_name(table, prefix, left, right)
    }

    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Always quotes, doubling the closing quote character found inside the name.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        let (left, right) = self.quote_chars();
        out.push(left);
        let mut escaped = String::with_capacity(2);
        escaped.push(right);
        escaped.push(right);
        self.write_escaped(out, value, right, &escaped);
        out.push(right);
    }

    /// Column reference, possibly qualified (`u.name`): every dotted segment is quoted on its
    /// own, segments already wrapped in the quote characters are kept.
    fn write_column_reference(&self, out: &mut String, value: &str) {
        let (left, right) = self.quote_chars();
        separated_by(
            out,
            value.split('.'),
            |out, segment| {
                if segment.len() > 1 && segment.starts_with(left) && segment.ends_with(right) {
                    out.push_str(segment);
                } else {
                    self.write_identifier_quoted(out, segment);
                }
            },
            ".",
        );
    }

    fn write_columns<'a>(&self, out: &mut String, columns: &mut dyn Iterator<Item = &'a str>) {
        separated_by(
            out,
            columns,
            |out, v| self.write_identifier_quoted(out, v),
            ",",
        );
    }

    /// ` ON DUPLICATE KEY UPDATE "c"=VALUES("c"),...` listing every column.
    fn write_on_duplicate_update<'a>(
        &self,
        out: &mut String,
        columns: &mut dyn Iterator<Item = &'a str>,
    ) {
        out.push_str(" ON DUPLICATE KEY UPDATE ");
        separated_by(
            out,
            columns,
            |out, v| {
                self.write_identifier_quoted(out, v);
                out.push_str("=VALUES(");
                self.write_identifier_quoted(out, v);
                out.push(')');
            },
            ",",
        );
    }

    /// Write `(?,?,...)` with `columns` placeholders.
    fn write_value_group(&self, out: &mut String, columns: usize) {
        out.push('(');
        separated_by(out, 0..columns, |out, _| out.push('?'), ",");
        out.push(')');
    }

    fn write_value_none(&self, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(if value { "TRUE" } else { "FALSE" });
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        out.push_str(&hex::encode_upper(value));
        out.push('\'');
    }

    fn write_value_date(&self, out: &mut String, value: &Date) {
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    fn write_value_time(&self, out: &mut String, value: &Time) {
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second()
        );
        let mut subsecond = value.nanosecond();
        if subsecond != 0 {
            let mut width = 9;
            while subsecond % 10 == 0 {
                subsecond /= 10;
                width -= 1;
            }
            let _ = write!(out, ".{:0width$}", subsecond, width = width);
        }
    }

    fn write_value_offset(&self, out: &mut String, value: &UtcOffset) {
        let (h, m, _) = value.as_hms();
        let _ = write!(
            out,
            "{}{:02}:{:02}",
            if value.is_negative() { '-' } else { '+' },
            h.abs(),
            m.abs()
        );
    }

    /// SQL literal of `value`, used to render the human readable form of a statement.
    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(out),
            Value::Boolean(Some(v)) => self.write_value_bool(out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(self, out, *v),
            Value::Float64(Some(v)) => write_float!(self, out, *v),
            Value::Decimal(Some(v)) => {
                let _ = write!(out, "{}", v);
            }
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => self.write_value_string(out, v),
            Value::Blob(Some(v)) => self.write_value_blob(out, v),
            Value::Date(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, v);
                out.push('\'');
            }
            Value::Time(Some(v)) => {
                out.push('\'');
                self.write_value_time(out, v);
                out.push('\'');
            }
            Value::Timestamp(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, &v.date());
                out.push(' ');
                self.write_value_time(out, &v.time());
                out.push('\'');
            }
            Value::TimestampWithTimezone(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, &v.date());
                out.push(' ');
                self.write_value_time(out, &v.time());
                self.write_value_offset(out, &v.offset());
                out.push('\'');
            }
            Value::Uuid(Some(v)) => {
                out.push('\'');
                let _ = write!(out, "{}", v);
                out.push('\'');
            }
            Value::List(Some(v), ..) => {
                separated_by(out, v, |out, v| self.write_value(out, v), ",");
            }
            _ => self.write_value_none(out),
        }
    }

    /// Replace every `?` placeholder outside string literals with the literal of its argument.
    ///
    /// Only meant for diagnostics, statements are always executed with bound arguments.
    fn bind_args_to_query(&self, sql: &str, args: &[Value]) -> String {
        let mut out = String::with_capacity(sql.len() + args.len() * 8);
        let mut args = args.iter();
        for_each_placeholder(sql, &mut out, |out| match args.next() {
            Some(v) => self.write_value(out, v),
            None => out.push('?'),
        });
        out
    }

    /// Hook applied to every statement right before it reaches the driver.
    fn rewrite_placeholders<'s>(&self, sql: &'s str) -> Cow<'s, str> {
        Cow::Borrowed(sql)
    }

    /// `<VERB> INTO <table>(<cols>) VALUES(?,..)[ ON DUPLICATE KEY UPDATE ...]`
    fn build_insert(&self, table: &str, row: &DataRow, mode: WriteMode) -> Result<Statement> {
        if row.is_empty() {
            return Err(DbError::DataEmpty.into());
        }
        let mut sql = String::with_capacity(64 + table.len() + row.len() * 24);
        sql.push_str(mode.verb());
        sql.push_str(" INTO ");
        sql.push_str(table);
        sql.push('(');
        self.write_columns(&mut sql, &mut row.keys());
        sql.push_str(") VALUES");
        self.write_value_group(&mut sql, row.len());
        if mode == WriteMode::Save {
            self.write_on_duplicate_update(&mut sql, &mut row.keys());
        }
        Ok(Statement::new(sql, row.values().cloned().collect()))
    }

    /// `UPDATE <table> SET <assignments>[ WHERE <condition>]`
    ///
    /// The arguments of a record's assignments come before `args`, the condition's own.
    fn build_update(
        &self,
        table: &str,
        data: DataInput,
        condition: &str,
        args: Vec<Value>,
    ) -> Result<Statement> {
        let mut updates = String::new();
        let mut params = Vec::new();
        match data {
            DataInput::Record(row) => {
                params.reserve(row.len() + args.len());
                separated_by(
                    &mut updates,
                    row.into_iter(),
                    |out, (k, v)| {
                        self.write_column_reference(out, &k);
                        out.push_str("=?");
                        params.push(v);
                    },
                    ",",
                );
            }
            DataInput::Scalar(v) => {
                let _ = write!(updates, "{}", v);
            }
            data @ DataInput::Records(..) => {
                return Err(DbError::UnsupportedInputType(data.kind()).into());
            }
        }
        if updates.trim().is_empty() {
            return Err(DbError::DataEmpty.into());
        }
        params.extend(args);
        let mut sql = String::with_capacity(32 + table.len() + updates.len() + condition.len());
        sql.push_str("UPDATE ");
        sql.push_str(table);
        sql.push_str(" SET ");
        sql.push_str(&updates);
        if !condition.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }
        Ok(Statement::new(sql, params))
    }

    /// `DELETE FROM <table>[ WHERE <condition>]`
    fn build_delete(&self, table: &str, condition: &str, args: Vec<Value>) -> Statement {
        let mut sql = String::with_capacity(32 + table.len() + condition.len());
        sql.push_str("DELETE FROM ");
        sql.push_str(table);
        if !condition.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }
        Statement::new(sql, args)
    }
}

/// Inject `COUNT(<fields>)` into a `SELECT <fields> FROM` query unless it already counts.
pub fn count_query(sql: &str) -> Cow<'_, str> {
    if COUNT_PRESENT.is_match(sql) {
        Cow::Borrowed(sql)
    } else {
        COUNT_FIELDS.replace(sql, "$1 COUNT($2) $3")
    }
}

/// Copy `sql` into `out` calling `f` in place of every `?` that is not inside a quoted string.
pub(crate) fn for_each_placeholder(sql: &str, out: &mut String, mut f: impl FnMut(&mut String)) {
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match (quote, c) {
            (None, '\'' | '"' | '`') => {
                quote = Some(c);
                out.push(c);
            }
            (Some(q), c) if c == q => {
                quote = None;
                out.push(c);
            }
            (None, '?') => f(out),
            _ => out.push(c),
        }
    }
}

/// Fallback writer with double quoted identifiers, closest to ANSI SQL and SQLite.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}

/// MySQL / MariaDB: backtick identifiers, backslash is an escape character in literals.
#[derive(Default, Debug, Clone, Copy)]
pub struct MySqlSqlWriter;

impl SqlWriter for MySqlSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn quote_chars(&self) -> (char, char) {
        ('`', '`')
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        for c in value.chars() {
            match c {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                _ => out.push(c),
            }
        }
        out.push('\'');
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push(if value { '1' } else { '0' });
    }
}

/// PostgreSQL: double quoted identifiers, `$n` placeholders on the wire.
#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresSqlWriter;

impl SqlWriter for PostgresSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("'\\x");
        out.push_str(&hex::encode(value));
        out.push('\'');
    }

    fn rewrite_placeholders<'s>(&self, sql: &'s str) -> Cow<'s, str> {
        if !sql.contains('?') {
            return Cow::Borrowed(sql);
        }
        let mut out = String::with_capacity(sql.len() + 16);
        let mut index = 0;
        for_each_placeholder(sql, &mut out, |out| {
            index += 1;
            out.push('$');
            write_integer!(out, index);
        });
        Cow::Owned(out)
    }
}

/// Supported SQL flavors.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    Generic,
    MySql,
    Postgres,
}

static GENERIC_WRITER: GenericSqlWriter = GenericSqlWriter;
static MYSQL_WRITER: MySqlSqlWriter = MySqlSqlWriter;
static POSTGRES_WRITER: PostgresSqlWriter = PostgresSqlWriter;

impl Dialect {
    pub fn sql_writer(&self) -> &'static dyn SqlWriter {
        match self {
            Dialect::Generic => &GENERIC_WRITER,
            Dialect::MySql => &MYSQL_WRITER,
            Dialect::Postgres => &POSTGRES_WRITER,
        }
    }

    /// Dialect of a connection url scheme, unknown schemes are generic.
    pub fn from_scheme(scheme: &str) -> Self {
        match scheme.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Dialect::MySql,
            "postgres" | "postgresql" | "pgsql" => Dialect::Postgres,
            _ => Dialect::Generic,
        }
    }
}
