use crate::{Value, sql_writer::for_each_placeholder};

/// Expand list arguments into one placeholder per element.
///
/// `("id IN(?) AND age>?", [[1, 2, 3], 18])` becomes `("id IN(?,?,?) AND age>?", [1, 2, 3, 18])`.
/// An empty list binds a single `NULL`, so `IN(?)` stays valid SQL matching nothing. Arguments
/// left over once the placeholders are exhausted are passed through unchanged.
pub fn format_query(sql: &str, args: Vec<Value>) -> (String, Vec<Value>) {
    if !args.iter().any(|v| matches!(v, Value::List(..))) {
        return (sql.to_owned(), args);
    }
    let mut expanded = Vec::with_capacity(args.len() + 8);
    let mut args = args.into_iter();
    let mut out = String::with_capacity(sql.len() + 16);
    for_each_placeholder(sql, &mut out, |out| match args.next() {
        Some(Value::List(Some(values), ..)) if !values.is_empty() => {
            for i in 0..values.len() {
                if i > 0 {
                    out.push(',');
                }
                out.push('?');
            }
            expanded.extend(values);
        }
        Some(Value::List(..)) => {
            out.push('?');
            expanded.push(Value::Null);
        }
        Some(v) => {
            out.push('?');
            expanded.push(v);
        }
        None => out.push('?'),
    });
    expanded.extend(args);
    (out, expanded)
}

