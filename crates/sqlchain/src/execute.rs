//! Running rendered statements on a connection.
//!
//! Every execute call renders first, so table and shape errors surface before
//! a connection is touched. On success the fragments are reset; on failure
//! they are left as they were.

use crate::builder::SqlBuilder;
use crate::connect::Acquired;
use crate::driver::{Connection, ConnectionFactory, ResultSet, Statement};
use crate::error::{SqlError, SqlResult};
use crate::logging::{TARGET, display_sql};
use crate::record::Record;
use crate::render::{self, COUNT_ALIAS};
use crate::value::Value;

/// A rendered mutation together with its parameter sets.
///
/// Each entry of `batches` is bound and closed with one `add_batch`.
#[derive(Debug, Clone)]
pub(crate) struct Mutation {
    pub(crate) kind: &'static str,
    pub(crate) sql: String,
    pub(crate) batches: Vec<Vec<Value>>,
}

impl Mutation {
    fn literal(kind: &'static str, sql: String) -> Self {
        Self {
            kind,
            sql,
            batches: vec![Vec::new()],
        }
    }
}

fn row_batches(rows: &[Record]) -> SqlResult<Vec<Vec<Value>>> {
    let columns = render::insert_columns(rows)?;
    Ok(rows
        .iter()
        .map(|row| {
            render::row_values(row, &columns)
                .into_iter()
                .cloned()
                .collect()
        })
        .collect())
}

impl<F: ConnectionFactory> SqlBuilder<F> {
    // ==================== Plans ====================

    pub(crate) fn plan_insert(&self) -> SqlResult<Mutation> {
        let sql = self.to_insert_sql()?;
        if !self.state.parameterized {
            return Ok(Mutation::literal("insert", sql));
        }
        Ok(Mutation {
            kind: "insert",
            sql,
            batches: row_batches(&self.state.insert_rows)?,
        })
    }

    pub(crate) fn plan_update(&self) -> SqlResult<Mutation> {
        let sql = self.to_update_sql()?;
        if !self.state.parameterized {
            return Ok(Mutation::literal("update", sql));
        }
        let values: Vec<Value> = self
            .state
            .update_rows
            .first()
            .map(|row| row.iter().map(|(_, v)| v.clone()).collect())
            .unwrap_or_default();
        Ok(Mutation {
            kind: "update",
            sql,
            batches: vec![values],
        })
    }

    pub(crate) fn plan_delete(&self) -> SqlResult<Mutation> {
        Ok(Mutation::literal("delete", self.to_delete_sql()?))
    }

    pub(crate) fn plan_increment(&self, column: &str) -> SqlResult<Mutation> {
        let sql = self.to_increment_sql(column)?;
        if !self.state.parameterized {
            return Ok(Mutation::literal("increment", sql));
        }
        let quoted = crate::ident::quote(column)?;
        let rows = render::increment_rows(&self.state.insert_rows, &quoted);
        Ok(Mutation {
            kind: "increment",
            sql,
            batches: row_batches(&rows)?,
        })
    }

    // ==================== Queries ====================

    /// Run the SELECT and return every row.
    pub async fn get(&mut self) -> SqlResult<Vec<Record>> {
        let sql = self.render_select(None, false)?;
        self.fetch(sql, false, false).await
    }

    /// Run the SELECT with `LIMIT 1` and return the first row, if any.
    pub async fn get_first(&mut self) -> SqlResult<Option<Record>> {
        let sql = self.render_select(None, true)?;
        let rows = self.fetch(sql, true, false).await?;
        Ok(rows.into_iter().next())
    }

    /// `COUNT(*)` over the current predicates.
    pub async fn count(&mut self) -> SqlResult<i64> {
        self.count_column("*").await
    }

    /// `COUNT(column)` over the current predicates; `*` counts rows.
    pub async fn count_column(&mut self, column: &str) -> SqlResult<i64> {
        let sql = self.to_count_sql(column)?;
        let rows = self.fetch(sql, true, false).await?;
        count_from(&rows)
    }

    /// Like [`get`](Self::get), but keeps the connection in the builder and
    /// runs `then` with the rows before returning.
    ///
    /// Later calls made from `then` (or after it) reuse the held connection.
    /// Call [`close`](Self::close) once the chain is done.
    pub async fn get_then<R>(
        &mut self,
        then: impl AsyncFnOnce(Vec<Record>, &mut Self) -> SqlResult<R>,
    ) -> SqlResult<R> {
        let sql = self.render_select(None, false)?;
        let rows = self.fetch(sql, false, true).await?;
        then(rows, self).await
    }

    /// Like [`get_first`](Self::get_first), keeping the connection for `then`.
    pub async fn get_first_then<R>(
        &mut self,
        then: impl AsyncFnOnce(Option<Record>, &mut Self) -> SqlResult<R>,
    ) -> SqlResult<R> {
        let sql = self.render_select(None, true)?;
        let rows = self.fetch(sql, true, true).await?;
        then(rows.into_iter().next(), self).await
    }

    async fn fetch(&mut self, sql: String, first_only: bool, keep: bool) -> SqlResult<Vec<Record>> {
        let mut acquired = self.resolve().await?;
        match run_query(&mut acquired.conn, &sql, first_only).await {
            Ok(rows) => {
                self.reset();
                self.release(acquired, keep).await?;
                Ok(rows)
            }
            Err(e) => {
                self.abandon(acquired).await;
                Err(e)
            }
        }
    }

    // ==================== Mutations ====================

    /// Insert the queued rows and commit. Returns one affected count per batch.
    pub async fn insert(&mut self) -> SqlResult<Vec<u64>> {
        let plan = self.plan_insert()?;
        self.apply(plan).await
    }

    /// Update with the first queued update row and commit.
    pub async fn update(&mut self) -> SqlResult<Vec<u64>> {
        let plan = self.plan_update()?;
        self.apply(plan).await
    }

    /// Delete the rows matched by the current predicates and commit.
    pub async fn delete(&mut self) -> SqlResult<Vec<u64>> {
        let plan = self.plan_delete()?;
        self.apply(plan).await
    }

    /// Upsert the queued row with `column = 1`, bumping `column` on duplicate key.
    pub async fn increment(&mut self, column: &str) -> SqlResult<Vec<u64>> {
        let plan = self.plan_increment(column)?;
        self.apply(plan).await
    }

    async fn apply(&mut self, plan: Mutation) -> SqlResult<Vec<u64>> {
        let mut acquired: Acquired<F::Connection> = self.resolve().await?;
        let outcome = match run_mutation(&mut acquired.conn, &plan).await {
            Ok(counts) => acquired.conn.commit().await.map(|()| counts),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(counts) => {
                self.reset();
                self.release(acquired, false).await?;
                Ok(counts)
            }
            Err(e) => {
                self.abandon(acquired).await;
                Err(e)
            }
        }
    }
}

fn log_query(sql: &str) {
    tracing::debug!(
        target: TARGET,
        kind = "select",
        sql = %display_sql(sql),
        "executing query"
    );
}

fn log_mutation(plan: &Mutation) {
    tracing::debug!(
        target: TARGET,
        kind = plan.kind,
        batches = plan.batches.len(),
        params = plan.batches.first().map_or(0, Vec::len),
        sql = %display_sql(&plan.sql),
        "executing statement"
    );
}

/// Prepare and run a query, mapping rows to records.
pub(crate) async fn run_query<C: Connection>(
    conn: &mut C,
    sql: &str,
    first_only: bool,
) -> SqlResult<Vec<Record>> {
    log_query(sql);
    let mut stmt = conn.prepare(sql).await?;
    let result = conn.query(&mut stmt).await?;
    Ok(records(result, first_only))
}

/// Prepare, bind every batch and run a mutation. Does not commit.
pub(crate) async fn run_mutation<C: Connection>(conn: &mut C, plan: &Mutation) -> SqlResult<Vec<u64>> {
    log_mutation(plan);
    let mut stmt = conn.prepare(&plan.sql).await?;
    for batch in &plan.batches {
        for (i, value) in batch.iter().enumerate() {
            value.bind_to(&mut stmt, i + 1)?;
        }
        stmt.add_batch()?;
    }
    conn.execute_batch(&mut stmt).await
}

fn records(result: ResultSet, first_only: bool) -> Vec<Record> {
    let ResultSet { columns, rows } = result;
    let take = if first_only { 1 } else { rows.len() };
    rows.into_iter()
        .take(take)
        .map(|row| columns.iter().cloned().zip(row).collect())
        .collect()
}

/// Read the count alias from the first row. No rows counts as zero.
pub(crate) fn count_from(rows: &[Record]) -> SqlResult<i64> {
    let Some(row) = rows.first() else {
        return Ok(0);
    };
    let value = row
        .get(COUNT_ALIAS)
        .ok_or_else(|| SqlError::decode(COUNT_ALIAS, "count column missing from result"))?;
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    value
        .as_str()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| SqlError::decode(COUNT_ALIAS, format!("not an integer: {value:?}")))
}
