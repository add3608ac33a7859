//! SQL text generation.
//!
//! The free functions here are pure: they read builder state and produce SQL.
//! Every statement ends with `;`.

use crate::builder::{Fragments, SqlBuilder};
use crate::driver::ConnectionFactory;
use crate::error::{SqlError, SqlResult};
use crate::ident;
use crate::record::Record;
use crate::value::Value;

/// Alias of the projected column in count queries.
pub const COUNT_ALIAS: &str = "RECORD_COUNT_ALIAS";

/// Append ` NAME v1<sep>v2...`, or nothing when `values` is empty.
fn push_list(sql: &mut String, values: &[String], name: &str, separator: &str) {
    if values.is_empty() {
        return;
    }
    sql.push(' ');
    sql.push_str(name);
    sql.push(' ');
    sql.push_str(&values.join(separator));
}

/// Render a SELECT.
///
/// `count` replaces the projection with `COUNT(<count>) AS RECORD_COUNT_ALIAS`
/// (it must already be quoted, or `*`). `first_only` forces `LIMIT 1`.
pub(crate) fn select(table: &str, f: &Fragments, count: Option<&str>, first_only: bool) -> String {
    let mut sql = String::with_capacity(64);
    if f.explain {
        sql.push_str("EXPLAIN ");
    }
    sql.push_str("SELECT ");
    if f.distinct {
        sql.push_str("DISTINCT ");
    }
    match count {
        Some(target) => {
            sql.push_str("COUNT(");
            sql.push_str(target);
            sql.push_str(") AS ");
            sql.push_str(COUNT_ALIAS);
        }
        None if f.columns.is_empty() => sql.push('*'),
        None => sql.push_str(&f.columns.join(", ")),
    }
    sql.push_str(" FROM ");
    sql.push_str(table);

    push_list(&mut sql, &f.joins, "JOIN", " JOIN ");
    push_list(&mut sql, &f.left_joins, "LEFT JOIN", " LEFT JOIN ");
    push_list(&mut sql, &f.wheres, "WHERE", " AND ");
    push_list(&mut sql, &f.group_by, "GROUP BY", ", ");
    push_list(&mut sql, &f.having, "HAVING", " AND ");
    push_list(&mut sql, &f.unions, "UNION", " UNION ");
    push_list(&mut sql, &f.order_by, "ORDER BY", ", ");

    let limit = if first_only { 1 } else { f.limit };
    if limit > 0 {
        sql.push_str(&format!(" LIMIT {limit}"));
        if f.offset > 0 {
            sql.push_str(&format!(" OFFSET {}", f.offset));
        }
    }

    if f.for_update {
        sql.push_str(" FOR UPDATE");
        if f.no_wait {
            sql.push_str(" NOWAIT");
        }
    }

    sql.push(';');
    sql
}

pub(crate) fn delete(table: &str, f: &Fragments) -> String {
    let mut sql = format!("DELETE FROM {table}");
    push_list(&mut sql, &f.wheres, "WHERE", " AND ");
    sql.push(';');
    sql
}

/// Column list shared by all insert rows, in first-seen order.
///
/// Every row must have as many keys as the first row, and the union of keys
/// must not be larger than that.
pub(crate) fn insert_columns(rows: &[Record]) -> SqlResult<Vec<&str>> {
    let first = rows
        .first()
        .ok_or_else(|| SqlError::validation("no insert data queued"))?;
    let expected = first.len();
    let mut columns: Vec<&str> = Vec::with_capacity(expected);
    for row in rows {
        if row.len() != expected {
            return Err(SqlError::DataMismatch {
                expected,
                found: row.len(),
            });
        }
        for column in row.columns() {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }
    if columns.len() != expected {
        return Err(SqlError::DataMismatch {
            expected,
            found: columns.len(),
        });
    }
    Ok(columns)
}

/// Row values in column order.
pub(crate) fn row_values<'a>(row: &'a Record, columns: &[&str]) -> Vec<&'a Value> {
    const NULL: &Value = &Value::Null;
    columns.iter().map(|c| row.get(c).unwrap_or(NULL)).collect()
}

pub(crate) fn insert(table: &str, rows: &[Record], parameterized: bool) -> SqlResult<String> {
    let columns = insert_columns(rows)?;
    let mut sql = format!("INSERT INTO {table} ({}) VALUES ", columns.join(", "));
    if parameterized {
        let placeholders = vec!["?"; columns.len()].join(", ");
        sql.push('(');
        sql.push_str(&placeholders);
        sql.push(')');
    } else {
        let tuples: Vec<String> = rows
            .iter()
            .map(|row| {
                let literals: Vec<String> = row_values(row, &columns)
                    .into_iter()
                    .map(Value::to_literal)
                    .collect();
                format!("({})", literals.join(", "))
            })
            .collect();
        sql.push_str(&tuples.join(", "));
    }
    Ok(sql)
}

/// Insert rows with `column = 1` set on the last row (a row is started if none exists).
pub(crate) fn increment_rows(rows: &[Record], quoted_column: &str) -> Vec<Record> {
    let mut rows = rows.to_vec();
    match rows.last_mut() {
        Some(last) => last.insert(quoted_column, Value::Int(1)),
        None => {
            let mut row = Record::new();
            row.insert(quoted_column, Value::Int(1));
            rows.push(row);
        }
    }
    rows
}

pub(crate) fn increment(
    table: &str,
    rows: &[Record],
    quoted_column: &str,
    parameterized: bool,
) -> SqlResult<String> {
    let mut sql = insert(table, rows, parameterized)?;
    sql.push_str(&format!(
        " ON DUPLICATE KEY UPDATE {quoted_column} = {quoted_column} + 1"
    ));
    Ok(sql)
}

pub(crate) fn update(table: &str, f: &Fragments) -> SqlResult<String> {
    let row = f
        .update_rows
        .first()
        .ok_or_else(|| SqlError::validation("no update data queued"))?;
    let assignments: Vec<String> = row
        .iter()
        .map(|(column, value)| {
            if f.parameterized {
                format!("{column} = ?")
            } else {
                format!("{column} = {}", value.to_literal())
            }
        })
        .collect();
    let mut sql = format!("UPDATE {table} SET {}", assignments.join(", "));
    push_list(&mut sql, &f.wheres, "WHERE", " AND ");
    sql.push(';');
    Ok(sql)
}

fn terminate(mut sql: String) -> String {
    sql.push(';');
    sql
}

impl<F: ConnectionFactory> SqlBuilder<F> {
    /// The quoted table, or the error that prevents rendering.
    pub(crate) fn checked_table(&self) -> SqlResult<&str> {
        if let Some(err) = &self.table_error {
            return Err(SqlError::validation(err.clone()));
        }
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| SqlError::config("table is empty"))?;
        if let Some(err) = &self.state.build_error {
            return Err(SqlError::validation(err.clone()));
        }
        Ok(table)
    }

    pub(crate) fn render_select(&self, count: Option<&str>, first_only: bool) -> SqlResult<String> {
        let table = self.checked_table()?;
        let target = count.map(count_target).transpose()?;
        Ok(select(table, &self.state, target.as_deref(), first_only))
    }

    /// Render the SELECT for the current state.
    pub fn to_select_sql(&self) -> SqlResult<String> {
        self.render_select(None, false)
    }

    /// Render the row-count SELECT that [`count_column`](Self::count_column) runs.
    ///
    /// `target` is `*` or a column name.
    pub fn to_count_sql(&self, target: &str) -> SqlResult<String> {
        self.render_select(Some(target), true)
    }

    /// Render the DELETE for the current predicates.
    pub fn to_delete_sql(&self) -> SqlResult<String> {
        let table = self.checked_table()?;
        Ok(delete(table, &self.state))
    }

    /// Render the INSERT for the queued rows.
    ///
    /// Fails with [`SqlError::DataMismatch`] if the rows differ in shape.
    pub fn to_insert_sql(&self) -> SqlResult<String> {
        let table = self.checked_table()?;
        insert(table, &self.state.insert_rows, self.state.parameterized).map(terminate)
    }

    /// Render the UPDATE for the first queued update row.
    pub fn to_update_sql(&self) -> SqlResult<String> {
        let table = self.checked_table()?;
        update(table, &self.state)
    }

    /// Render an INSERT of the queued rows plus `column = 1`, upserting
    /// `` `column` = `column` + 1`` on duplicate key.
    ///
    /// The builder is not modified.
    pub fn to_increment_sql(&self, column: &str) -> SqlResult<String> {
        let table = self.checked_table()?;
        let quoted = ident::quote(column)?;
        let rows = increment_rows(&self.state.insert_rows, &quoted);
        increment(table, &rows, &quoted, self.state.parameterized).map(terminate)
    }
}

fn count_target(target: &str) -> SqlResult<String> {
    if target == "*" {
        Ok("*".to_string())
    } else {
        ident::quote(target)
    }
}
