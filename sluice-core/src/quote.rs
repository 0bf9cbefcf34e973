use crate::separated_by;

/// True for a bare identifier: ASCII letters, digits, `_` and `-` only.
pub fn is_word(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Wrap `value` with the quote characters when it is a bare word, return it unchanged otherwise
/// (already quoted, dotted, aliased, expressions, `*`).
pub fn quote_word(value: &str, left: char, right: char) -> String {
    if is_word(value) {
        let mut out = String::with_capacity(value.len() + 2);
        out.push(left);
        out.push_str(value);
        out.push(right);
        out
    } else {
        value.to_owned()
    }
}

/// Quote the leading reference of every comma separated clause.
///
/// `"u.id asc, name"` becomes `` "`u`.`id` asc, `name`" ``: every dotted segment of the first
/// word is quoted when it is a bare word, the remaining words are kept as they are.
pub fn quote_string(value: &str, left: char, right: char) -> String {
    rewrite_clauses(value, |reference| {
        let mut out = String::with_capacity(reference.len() + 4);
        separated_by(
            &mut out,
            reference.split('.'),
            |out, segment| out.push_str(&quote_word(segment, left, right)),
            ".",
        );
        out
    })
}

/// Prefix and quote every table of a table list.
///
/// Handles specs like `"user"`, `"user u"`, `"user,user_detail"`, `"user as u, user_detail ut"`
/// and `"db.user"` (only the table, the last dotted component, gets the prefix). Components
/// already starting with `prefix` are not prefixed again and existing quote characters are
/// stripped before quoting, which makes the function idempotent.
pub fn handle_table_name(table: &str, prefix: &str, left: char, right: char) -> String {
    rewrite_clauses(table, |reference| {
        let trimmed = reference.trim_matches(|c| c == left || c == right);
        let mut segments: Vec<String> = trimmed
            .split('.')
            .map(|v| v.trim_matches(|c| c == left || c == right).to_owned())
            .collect();
        if let Some(name) = segments.last_mut() {
            if !prefix.is_empty() && !name.starts_with(prefix) {
                name.insert_str(0, prefix);
            }
        }
        let mut out = String::with_capacity(trimmed.len() + prefix.len() + 4);
        separated_by(
            &mut out,
            segments.iter(),
            |out, segment| out.push_str(&quote_word(segment, left, right)),
            ".",
        );
        out
    })
}

/// Split on commas and rewrite the first word of each clause with `f`. Everything else, the
/// whitespace around the clause and the text after the reference (aliases, `AS`, `ASC`), is
/// copied verbatim.
fn rewrite_clauses(value: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for (i, clause) in value.split(',').enumerate() {
        if i > 0 {
            out.push(',');
        }
        let core = clause.trim();
        if core.is_empty() {
            out.push_str(clause);
            continue;
        }
        let start = clause.len() - clause.trim_start().len();
        let end = start + core.len();
        out.push_str(&clause[..start]);
        let split = core.find(char::is_whitespace).unwrap_or(core.len());
        out.push_str(&f(&core[..split]));
        out.push_str(&core[split..]);
        out.push_str(&clause[end..]);
    }
    out
}
