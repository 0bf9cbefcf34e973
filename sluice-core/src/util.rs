/// Push every value into `out`, separated by `separator`.
///
/// The separator is only written between two values that actually produced some output.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Milliseconds elapsed between two timestamps, never negative.
pub fn elapsed_millis(start: time::OffsetDateTime, end: time::OffsetDateTime) -> i64 {
    (end - start).whole_milliseconds().max(0) as i64
}

/// Longest prefix of `value` not exceeding `max` bytes that ends on a char boundary.
pub fn truncate_str(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::truncate_str(&$query, 497).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

#[macro_export]
macro_rules! printable_query {
    ($query:expr) => {
        $crate::truncate_long!($query.trim())
    };
}

/// Build an argument list: `args![10000, "john", vec![1, 2, 3]]`.
#[macro_export]
macro_rules! args {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::Value::from($value)),*]
    };
}
