//! `tracing` helpers shared by the executor.

/// Tracing target for statement and connection events.
pub(crate) const TARGET: &str = "sqlchain.sql";

/// SQL longer than this many bytes is truncated in log events.
pub(crate) const MAX_LOGGED_SQL: usize = 200;

/// Truncate a SQL string to at most `max_bytes`, respecting UTF-8 boundaries.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

pub(crate) fn display_sql(sql: &str) -> String {
    if sql.len() > MAX_LOGGED_SQL {
        format!("{}...", truncate_sql_bytes(sql, MAX_LOGGED_SQL))
    } else {
        sql.to_string()
    }
}
