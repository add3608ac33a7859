//! Backtick identifier quoting.
//!
//! Table, schema and column names are wrapped in backticks. A name is treated
//! as a single identifier part, so `db.users` becomes `` `db.users` ``; use the
//! two-argument builder calls to address a qualified name. Embedded backticks
//! are doubled.

use crate::error::{SqlError, SqlResult};

/// Quote a single identifier part.
///
/// Fails for empty names and names containing a NUL byte.
pub fn quote(name: &str) -> SqlResult<String> {
    if name.is_empty() {
        return Err(SqlError::validation("Identifier cannot be empty"));
    }
    if name.contains('\0') {
        return Err(SqlError::validation(
            "Identifier cannot contain NUL character",
        ));
    }
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(name, &mut out);
    Ok(out)
}

/// Quote `qualifier` and `name` and join them with a dot.
pub fn quote_qualified(qualifier: &str, name: &str) -> SqlResult<String> {
    Ok(format!("{}.{}", quote(qualifier)?, quote(name)?))
}

pub(crate) fn write_quoted(name: &str, out: &mut String) {
    out.push('`');
    for ch in name.chars() {
        if ch == '`' {
            out.push('`');
        }
        out.push(ch);
    }
    out.push('`');
}
