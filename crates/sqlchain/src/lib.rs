//! # sqlchain
//!
//! A chainable MySQL-dialect SQL builder and executor.
//!
//! ## Features
//!
//! - **Fluent building**: columns, predicates, joins, grouping, ordering and
//!   paging accumulate on one [`SqlBuilder`] through `&mut self` chaining
//! - **Rendering**: every statement can be rendered to text without a database
//!   (`to_select_sql`, `to_insert_sql`, ...)
//! - **Parameterized payloads**: insert/update/increment values are bound as
//!   `?` parameters by default; literal mode inlines them
//! - **Bulk insert**: several rows go out as one prepared statement with one
//!   batch per row
//! - **Continuation**: `get_then` keeps the connection open for the next call
//! - **Transactions**: group several statements with [`SqlBuilder::transaction`]
//!
//! The database driver is supplied by the host through [`ConnectionFactory`].
//!
//! ```ignore
//! use sqlchain::SqlBuilder;
//!
//! let mut qb = SqlBuilder::with_factory(factory);
//! qb.db("jdbc/app").table("users");
//!
//! // SELECT `id`, `name` FROM `users` WHERE `status` = 'active' ORDER BY `id` DESC LIMIT 10;
//! let users = qb
//!     .columns(["id", "name"])
//!     .where_eq("status", "active")
//!     .order_by_desc("id")
//!     .limit(10)
//!     .get()
//!     .await?;
//!
//! // INSERT INTO `users` (`name`, `age`) VALUES (?, ?);
//! qb.insert_data("name", "ann").insert_data("age", 31).insert().await?;
//!
//! let active = qb.where_eq("status", "active").count().await?;
//! ```

pub mod builder;
pub mod config;
pub mod driver;
pub mod error;
pub mod ident;
pub mod record;
pub mod render;
pub mod transaction;
pub mod value;

mod connect;
mod execute;
mod logging;

pub use builder::SqlBuilder;
pub use config::{ConnectionConfig, ConnectionTarget, Credentials};
pub use driver::{Connection, ConnectionFactory, Detached, ResultSet, Statement};
pub use error::{DriverError, SqlError, SqlResult};
pub use record::Record;
pub use render::COUNT_ALIAS;
pub use transaction::Transaction;
pub use value::Value;
