//! Driver seam: the traits a host implements to give the builder a database.
//!
//! The builder never opens sockets itself. A host supplies a
//! [`ConnectionFactory`] that hands out [`Connection`]s, either by logical
//! resource name (typically a pool lookup) or by explicit credentials.
//! Statements are prepared on a connection, bound through [`Statement`]'s typed
//! setters and executed back on the same connection.

use crate::config::Credentials;
use crate::error::{SqlError, SqlResult};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime};
use std::convert::Infallible;
use std::future::Future;

/// A prepared statement with positional (1-based) parameter slots.
///
/// Binding is synchronous; values are only sent when the owning connection
/// executes the statement.
pub trait Statement: Send {
    fn bind_null(&mut self, index: usize) -> SqlResult<()>;
    fn bind_text(&mut self, index: usize, value: &str) -> SqlResult<()>;
    fn bind_int(&mut self, index: usize, value: i32) -> SqlResult<()>;
    fn bind_long(&mut self, index: usize, value: i64) -> SqlResult<()>;
    fn bind_double(&mut self, index: usize, value: f64) -> SqlResult<()>;
    fn bind_float(&mut self, index: usize, value: f32) -> SqlResult<()>;
    fn bind_bool(&mut self, index: usize, value: bool) -> SqlResult<()>;
    fn bind_timestamp(&mut self, index: usize, value: NaiveDateTime) -> SqlResult<()>;
    fn bind_date(&mut self, index: usize, value: NaiveDate) -> SqlResult<()>;

    /// Generic bind for kinds without a dedicated setter (currently [`Value::Raw`]).
    ///
    /// The default implementation binds the raw text as a string.
    fn bind_object(&mut self, index: usize, value: &Value) -> SqlResult<()> {
        match value.as_str() {
            Some(s) => self.bind_text(index, s),
            None => Err(SqlError::validation(format!(
                "no generic bind for value {value:?} at index {index}"
            ))),
        }
    }

    /// Close the current parameter set and start the next one.
    fn add_batch(&mut self) -> SqlResult<()>;
}

/// Column names and raw row values returned by a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Create an empty result set with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row (consuming version, for building fixtures).
    pub fn with_row(mut self, row: Vec<Value>) -> Self {
        self.rows.push(row);
        self
    }
}

/// A live database connection.
pub trait Connection: Send {
    type Statement: Statement;

    /// Whether the connection can no longer be used.
    fn is_closed(&self) -> bool;

    /// Toggle auto-commit. The builder always turns it off after resolving.
    fn set_auto_commit(&mut self, enabled: bool) -> impl Future<Output = SqlResult<()>> + Send;

    /// Prepare `sql` on this connection.
    fn prepare(&mut self, sql: &str) -> impl Future<Output = SqlResult<Self::Statement>> + Send;

    /// Run a prepared query and return its rows.
    fn query(
        &mut self,
        stmt: &mut Self::Statement,
    ) -> impl Future<Output = SqlResult<ResultSet>> + Send;

    /// Run every batch queued on `stmt`; returns one affected-row count per batch.
    fn execute_batch(
        &mut self,
        stmt: &mut Self::Statement,
    ) -> impl Future<Output = SqlResult<Vec<u64>>> + Send;

    fn commit(&mut self) -> impl Future<Output = SqlResult<()>> + Send;

    fn rollback(&mut self) -> impl Future<Output = SqlResult<()>> + Send;

    fn close(&mut self) -> impl Future<Output = SqlResult<()>> + Send;
}

/// Hands out connections for a builder.
pub trait ConnectionFactory: Send + Sync {
    type Connection: Connection;

    /// Resolve a pooled resource by logical name.
    fn resolve_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = SqlResult<Self::Connection>> + Send;

    /// Connect directly with URL, user and password.
    fn resolve_by_credentials(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = SqlResult<Self::Connection>> + Send;
}

/// Factory for builders that only render SQL.
///
/// Every resolve attempt fails with a configuration error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl ConnectionFactory for Detached {
    type Connection = Infallible;

    async fn resolve_by_name(&self, name: &str) -> SqlResult<Infallible> {
        Err(SqlError::config(format!(
            "no connection factory attached (resource '{name}')"
        )))
    }

    async fn resolve_by_credentials(&self, credentials: &Credentials) -> SqlResult<Infallible> {
        Err(SqlError::config(format!(
            "no connection factory attached (url '{}')",
            credentials.url
        )))
    }
}

impl Statement for Infallible {
    fn bind_null(&mut self, _: usize) -> SqlResult<()> {
        match *self {}
    }
    fn bind_text(&mut self, _: usize, _: &str) -> SqlResult<()> {
        match *self {}
    }
    fn bind_int(&mut self, _: usize, _: i32) -> SqlResult<()> {
        match *self {}
    }
    fn bind_long(&mut self, _: usize, _: i64) -> SqlResult<()> {
        match *self {}
    }
    fn bind_double(&mut self, _: usize, _: f64) -> SqlResult<()> {
        match *self {}
    }
    fn bind_float(&mut self, _: usize, _: f32) -> SqlResult<()> {
        match *self {}
    }
    fn bind_bool(&mut self, _: usize, _: bool) -> SqlResult<()> {
        match *self {}
    }
    fn bind_timestamp(&mut self, _: usize, _: NaiveDateTime) -> SqlResult<()> {
        match *self {}
    }
    fn bind_date(&mut self, _: usize, _: NaiveDate) -> SqlResult<()> {
        match *self {}
    }
    fn add_batch(&mut self) -> SqlResult<()> {
        match *self {}
    }
}

impl Connection for Infallible {
    type Statement = Infallible;

    fn is_closed(&self) -> bool {
        match *self {}
    }

    async fn set_auto_commit(&mut self, _: bool) -> SqlResult<()> {
        match *self {}
    }

    async fn prepare(&mut self, _: &str) -> SqlResult<Infallible> {
        match *self {}
    }

    async fn query(&mut self, _: &mut Infallible) -> SqlResult<ResultSet> {
        match *self {}
    }

    async fn execute_batch(&mut self, _: &mut Infallible) -> SqlResult<Vec<u64>> {
        match *self {}
    }

    async fn commit(&mut self) -> SqlResult<()> {
        match *self {}
    }

    async fn rollback(&mut self) -> SqlResult<()> {
        match *self {}
    }

    async fn close(&mut self) -> SqlResult<()> {
        match *self {}
    }
}
