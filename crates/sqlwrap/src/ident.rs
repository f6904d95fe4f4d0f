//! Identifier quoting and select-list helpers.
//!
//! Column references are back-quoted segment by segment so reserved words can be used as
//! column names: `order` → `` `order` ``, `u.group` → `` `u`.`group` ``. A back-quote inside
//! a segment is doubled.

/// Quote a possibly dotted column reference.
///
/// # Example
/// ```ignore
/// assert_eq!(sqlwrap::ident::quote_field("u.name"), "`u`.`name`");
/// ```
pub fn quote_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    write_quoted(field, &mut out);
    out
}

pub(crate) fn write_quoted(field: &str, out: &mut String) {
    for (i, segment) in field.split('.').enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push('`');
        for ch in segment.chars() {
            if ch == '`' {
                out.push('`');
            }
            out.push(ch);
        }
        out.push('`');
    }
}

/// The unqualified part of a column reference: `u.name` → `name`.
pub fn field_name(field: &str) -> &str {
    match field.find('.') {
        Some(pos) => &field[pos + 1..],
        None => field,
    }
}

/// Select-list expression replacing NULL with a text default.
///
/// `null_to_default_str("u.nick", "")` → `ifnull(u.nick, '') as nick`
pub fn null_to_default_str(expr: &str, default: &str) -> String {
    format!(
        "ifnull({expr}, '{}') as {}",
        default.replace('\'', "''"),
        field_name(expr)
    )
}

/// Select-list expression replacing NULL with a numeric default.
///
/// `null_to_default_num("score", 0)` → `ifnull(score, 0) as score`
pub fn null_to_default_num(expr: &str, default: i64) -> String {
    format!("ifnull({expr}, {default}) as {}", field_name(expr))
}
