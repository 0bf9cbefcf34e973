use crate::{DataRow, SqlWriter, Value, is_word, separated_by};

/// A `WHERE` clause, before formatting.
///
/// - `Raw("uid=10000")`, `Raw("money>? AND name LIKE ?")`: used verbatim with the arguments.
/// - `Raw("uid")` with exactly one argument: shorthand for `"uid"=?`.
/// - `Record({"uid": 1, "age>": 18, "status": [1, 2]})`: `"uid"=? AND age>? AND "status" IN(?)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Raw(String),
    Record(DataRow),
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Raw(String::new())
    }
}

impl From<&str> for Condition {
    fn from(value: &str) -> Self {
        Condition::Raw(value.to_owned())
    }
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        Condition::Raw(value)
    }
}

impl From<DataRow> for Condition {
    fn from(value: DataRow) -> Self {
        Condition::Record(value)
    }
}

fn ends_with_operator(key: &str) -> bool {
    key.trim_end().ends_with(['<', '>', '='])
}

impl Condition {
    /// Clause text without the `WHERE` keyword, and its arguments: the record's values first,
    /// then `args`. Empty text means no filter.
    pub fn format(self, writer: &dyn SqlWriter, args: Vec<Value>) -> (String, Vec<Value>) {
        match self {
            Condition::Raw(raw) => {
                let trimmed = raw.trim();
                if args.len() == 1 && is_word(trimmed) {
                    let mut sql = writer.quote_word(trimmed);
                    sql.push_str("=?");
                    (sql, args)
                } else {
                    (trimmed.to_owned(), args)
                }
            }
            Condition::Record(row) => {
                let mut sql = String::with_capacity(row.len() * 16);
                let mut params = Vec::with_capacity(row.len() + args.len());
                separated_by(
                    &mut sql,
                    row,
                    |out, (key, value)| {
                        if ends_with_operator(&key) {
                            out.push_str(&key);
                            out.push('?');
                        } else {
                            out.push_str(&writer.quote_word(key.trim()));
                            out.push_str(if matches!(value, Value::List(..)) {
                                " IN(?)"
                            } else {
                                "=?"
                            });
                        }
                        params.push(value);
                    },
                    " AND ",
                );
                params.extend(args);
                (sql, params)
            }
        }
    }
}
