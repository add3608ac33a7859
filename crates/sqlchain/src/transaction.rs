//! Explicit transactions.
//!
//! Plain execute calls commit after every mutation. To group several
//! statements, either open a [`Transaction`] with [`SqlBuilder::begin`] and run
//! the `*_in` variants against it, or hand a closure to
//! [`SqlBuilder::transaction`], which commits on `Ok` and rolls back on `Err`.
//!
//! ```ignore
//! let mut qb = SqlBuilder::with_factory(factory);
//! qb.db("jdbc/app").table("accounts");
//!
//! qb.transaction(async |qb, tx| {
//!     qb.update_data("balance", 90).where_eq("id", 1).update_in(tx).await?;
//!     qb.update_data("balance", 110).where_eq("id", 2).update_in(tx).await?;
//!     Ok(())
//! })
//! .await?;
//! ```

use crate::builder::SqlBuilder;
use crate::connect::Acquired;
use crate::driver::{Connection, ConnectionFactory};
use crate::error::{SqlError, SqlResult};
use crate::execute::{count_from, run_mutation, run_query};
use crate::logging::TARGET;
use crate::record::Record;

/// An open connection with auto-commit off.
///
/// Finish it with [`commit`](Self::commit) or [`rollback`](Self::rollback);
/// both return the connection, which can be closed or handed back to a builder
/// with [`SqlBuilder::retain`]. Dropping an unfinished transaction leaves the
/// rollback to the driver.
pub struct Transaction<C: Connection> {
    conn: C,
    reused: bool,
}

impl<C: Connection> Transaction<C> {
    /// Wrap a connection that already has auto-commit off.
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            reused: false,
        }
    }

    /// The underlying connection.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    /// Commit and return the still-open connection.
    pub async fn commit(mut self) -> SqlResult<C> {
        self.conn.commit().await?;
        tracing::debug!(target: TARGET, "transaction committed");
        Ok(self.conn)
    }

    /// Roll back and return the still-open connection.
    pub async fn rollback(mut self) -> SqlResult<C> {
        self.conn.rollback().await?;
        tracing::debug!(target: TARGET, "transaction rolled back");
        Ok(self.conn)
    }

    /// Give up the connection without finishing the transaction.
    pub fn into_connection(self) -> C {
        self.conn
    }
}

impl<F: ConnectionFactory> SqlBuilder<F> {
    /// Start a transaction on the held connection, or on a fresh one.
    pub async fn begin(&mut self) -> SqlResult<Transaction<F::Connection>> {
        let Acquired { conn, reused } = self.resolve().await?;
        tracing::debug!(target: TARGET, reused, "transaction started");
        Ok(Transaction { conn, reused })
    }

    /// Run `body` inside a transaction.
    ///
    /// Commits when `body` returns `Ok` and rolls back otherwise. A failed
    /// rollback is reported together with the error that caused it. The
    /// connection goes back to the builder if it was held before, and is closed
    /// otherwise.
    pub async fn transaction<R>(
        &mut self,
        body: impl AsyncFnOnce(&mut Self, &mut Transaction<F::Connection>) -> SqlResult<R>,
    ) -> SqlResult<R> {
        let mut tx = self.begin().await?;
        let outcome = body(&mut *self, &mut tx).await;
        let Transaction { mut conn, reused } = tx;
        let result = match outcome {
            Ok(value) => match conn.commit().await {
                Ok(()) => Ok(value),
                Err(e) => {
                    self.abandon(Acquired { conn, reused }).await;
                    return Err(e);
                }
            },
            Err(error) => match conn.rollback().await {
                Ok(()) => Err(error),
                Err(rollback_err) => {
                    tracing::warn!(target: TARGET, error = %rollback_err, "transaction rollback failed");
                    Err(SqlError::Other(format!(
                        "{error} (rollback failed: {rollback_err})"
                    )))
                }
            },
        };
        let released = self.release(Acquired { conn, reused }, false).await;
        match (result, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), _) => Err(e),
        }
    }

    // ==================== Execute within a transaction ====================

    /// [`get`](Self::get) on the transaction's connection.
    pub async fn get_in(&mut self, tx: &mut Transaction<F::Connection>) -> SqlResult<Vec<Record>> {
        let sql = self.render_select(None, false)?;
        let rows = run_query(&mut tx.conn, &sql, false).await?;
        self.reset();
        Ok(rows)
    }

    /// [`get_first`](Self::get_first) on the transaction's connection.
    pub async fn get_first_in(
        &mut self,
        tx: &mut Transaction<F::Connection>,
    ) -> SqlResult<Option<Record>> {
        let sql = self.render_select(None, true)?;
        let rows = run_query(&mut tx.conn, &sql, true).await?;
        self.reset();
        Ok(rows.into_iter().next())
    }

    /// [`count`](Self::count) on the transaction's connection.
    pub async fn count_in(&mut self, tx: &mut Transaction<F::Connection>) -> SqlResult<i64> {
        self.count_column_in(tx, "*").await
    }

    /// [`count_column`](Self::count_column) on the transaction's connection.
    pub async fn count_column_in(
        &mut self,
        tx: &mut Transaction<F::Connection>,
        column: &str,
    ) -> SqlResult<i64> {
        let sql = self.to_count_sql(column)?;
        let rows = run_query(&mut tx.conn, &sql, true).await?;
        self.reset();
        count_from(&rows)
    }

    /// [`insert`](Self::insert) without the commit.
    pub async fn insert_in(&mut self, tx: &mut Transaction<F::Connection>) -> SqlResult<Vec<u64>> {
        let plan = self.plan_insert()?;
        let counts = run_mutation(&mut tx.conn, &plan).await?;
        self.reset();
        Ok(counts)
    }

    /// [`update`](Self::update) without the commit.
    pub async fn update_in(&mut self, tx: &mut Transaction<F::Connection>) -> SqlResult<Vec<u64>> {
        let plan = self.plan_update()?;
        let counts = run_mutation(&mut tx.conn, &plan).await?;
        self.reset();
        Ok(counts)
    }

    /// [`delete`](Self::delete) without the commit.
    pub async fn delete_in(&mut self, tx: &mut Transaction<F::Connection>) -> SqlResult<Vec<u64>> {
        let plan = self.plan_delete()?;
        let counts = run_mutation(&mut tx.conn, &plan).await?;
        self.reset();
        Ok(counts)
    }

    /// [`increment`](Self::increment) without the commit.
    pub async fn increment_in(
        &mut self,
        tx: &mut Transaction<F::Connection>,
        column: &str,
    ) -> SqlResult<Vec<u64>> {
        let plan = self.plan_increment(column)?;
        let counts = run_mutation(&mut tx.conn, &plan).await?;
        self.reset();
        Ok(counts)
    }
}
