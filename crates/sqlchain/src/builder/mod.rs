//! Chainable statement builder.
//!
//! A [`SqlBuilder`] accumulates one statement's fragments through `&mut self`
//! calls that return the builder, then renders (`to_*_sql`) or executes
//! (`get`, `insert`, ...) it. Executing resets the fragments but keeps the
//! table, the connection settings and any held connection, so the same builder
//! can run the next statement of a chain.
//!
//! ```ignore
//! let mut qb = SqlBuilder::with_factory(factory);
//! qb.db("jdbc/app").table("users");
//!
//! let active = qb.where_eq("status", "active").order_by_desc("id").limit(10).get().await?;
//! qb.insert_data("name", "ann").insert_data("age", 31).insert().await?;
//! ```

mod payload;
mod where_builder;

#[cfg(test)]
mod tests;

use crate::config::{ConnectionConfig, Credentials};
use crate::driver::{Connection, ConnectionFactory, Detached};
use crate::ident;
use crate::record::Record;
use std::fmt;

/// Per-statement state, cleared by [`SqlBuilder::reset`].
#[derive(Debug, Clone)]
pub(crate) struct Fragments {
    pub(crate) columns: Vec<String>,
    pub(crate) wheres: Vec<String>,
    pub(crate) joins: Vec<String>,
    pub(crate) left_joins: Vec<String>,
    pub(crate) group_by: Vec<String>,
    pub(crate) having: Vec<String>,
    pub(crate) unions: Vec<String>,
    pub(crate) order_by: Vec<String>,
    pub(crate) limit: u64,
    pub(crate) offset: u64,
    pub(crate) explain: bool,
    pub(crate) distinct: bool,
    pub(crate) for_update: bool,
    pub(crate) no_wait: bool,
    pub(crate) parameterized: bool,
    /// Insert rows keyed by quoted column name.
    pub(crate) insert_rows: Vec<Record>,
    /// Update rows keyed by quoted column name; only the first is rendered.
    pub(crate) update_rows: Vec<Record>,
    /// First invalid identifier seen since the last reset.
    pub(crate) build_error: Option<String>,
}

impl Default for Fragments {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            wheres: Vec::new(),
            joins: Vec::new(),
            left_joins: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            unions: Vec::new(),
            order_by: Vec::new(),
            limit: 0,
            offset: 0,
            explain: false,
            distinct: false,
            for_update: false,
            no_wait: false,
            parameterized: true,
            insert_rows: Vec::new(),
            update_rows: Vec::new(),
            build_error: None,
        }
    }
}

/// Stateful SQL builder and executor.
///
/// `F` supplies connections; builders created with [`SqlBuilder::new`] use
/// [`Detached`] and can only render.
pub struct SqlBuilder<F: ConnectionFactory = Detached> {
    pub(crate) factory: F,
    pub(crate) connection_config: ConnectionConfig,
    pub(crate) held: Option<F::Connection>,
    pub(crate) table: Option<String>,
    pub(crate) table_error: Option<String>,
    pub(crate) state: Fragments,
}

impl SqlBuilder<Detached> {
    /// Create a render-only builder.
    pub fn new() -> Self {
        Self::with_factory(Detached)
    }
}

impl Default for SqlBuilder<Detached> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ConnectionFactory> SqlBuilder<F> {
    /// Create a builder that obtains connections from `factory`.
    pub fn with_factory(factory: F) -> Self {
        Self {
            factory,
            connection_config: ConnectionConfig::default(),
            held: None,
            table: None,
            table_error: None,
            state: Fragments::default(),
        }
    }

    // ==================== Connection settings ====================

    /// Resolve connections through the logical resource `name`.
    pub fn db(&mut self, name: &str) -> &mut Self {
        self.connection_config.resource = Some(name.to_string());
        self
    }

    /// Connect directly with `url`, `user` and `password`.
    pub fn db_credentials(&mut self, url: &str, user: &str, password: &str) -> &mut Self {
        self.connection_config.credentials = Some(Credentials::new(url, user, password));
        self
    }

    /// Replace the connection settings.
    pub fn connection_config(&mut self, config: ConnectionConfig) -> &mut Self {
        self.connection_config = config;
        self
    }

    /// The current connection settings.
    pub fn connection_settings(&self) -> &ConnectionConfig {
        &self.connection_config
    }

    /// The connection factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    // ==================== Table ====================

    /// Set the target table.
    pub fn table(&mut self, name: &str) -> &mut Self {
        let quoted = ident::quote(name);
        self.set_table(quoted)
    }

    /// Set a schema-qualified target table: `` `schema`.`name` ``.
    pub fn table_in(&mut self, schema: &str, name: &str) -> &mut Self {
        let quoted = ident::quote_qualified(schema, name);
        self.set_table(quoted)
    }

    fn set_table(&mut self, quoted: crate::SqlResult<String>) -> &mut Self {
        match quoted {
            Ok(table) => {
                self.table = Some(table);
                self.table_error = None;
            }
            Err(e) => {
                self.table = None;
                self.table_error = Some(e.to_string());
            }
        }
        self
    }

    /// The quoted table reference, if set.
    pub fn table_ref(&self) -> Option<&str> {
        self.table.as_deref()
    }

    // ==================== Flags ====================

    /// `LIMIT n`; `0` means no limit.
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.state.limit = limit;
        self
    }

    /// `OFFSET m`; only rendered together with a limit.
    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.state.offset = offset;
        self
    }

    /// Prefix the SELECT with `EXPLAIN`.
    pub fn explain(&mut self, on: bool) -> &mut Self {
        self.state.explain = on;
        self
    }

    /// `SELECT DISTINCT`.
    pub fn distinct(&mut self, on: bool) -> &mut Self {
        self.state.distinct = on;
        self
    }

    /// Append `FOR UPDATE` to the SELECT.
    pub fn for_update(&mut self, on: bool) -> &mut Self {
        self.state.for_update = on;
        self
    }

    /// `NOWAIT`; only rendered together with `FOR UPDATE`.
    pub fn no_wait(&mut self, on: bool) -> &mut Self {
        self.state.no_wait = on;
        self
    }

    /// Toggle parameterized mode (on by default).
    ///
    /// When on, insert/update/increment payloads are rendered as `?` and bound;
    /// when off they are inlined with [`Value::to_literal`](crate::Value::to_literal).
    /// Predicates are inlined either way.
    pub fn stake_holder(&mut self, on: bool) -> &mut Self {
        self.state.parameterized = on;
        self
    }

    /// Whether payloads are bound as `?` parameters.
    pub fn is_parameterized(&self) -> bool {
        self.state.parameterized
    }

    // ==================== Lifecycle ====================

    /// Clear every fragment and flag.
    ///
    /// Table, connection settings and the held connection are kept.
    pub fn reset(&mut self) -> &mut Self {
        self.state = Fragments::default();
        self
    }

    /// Whether an open connection is held for continuation.
    pub fn has_connection(&self) -> bool {
        self.held.as_ref().is_some_and(|c| !c.is_closed())
    }

    pub(crate) fn quote_or_record(&mut self, name: &str) -> String {
        match ident::quote(name) {
            Ok(quoted) => quoted,
            Err(e) => {
                self.state.build_error.get_or_insert_with(|| e.to_string());
                String::new()
            }
        }
    }
}

impl<F: ConnectionFactory> fmt::Debug for SqlBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlBuilder")
            .field("connection_config", &self.connection_config)
            .field("holds_connection", &self.held.is_some())
            .field("table", &self.table)
            .field("state", &self.state)
            .finish()
    }
}
