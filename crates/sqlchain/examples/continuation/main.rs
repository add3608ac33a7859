//! Continuation and transactions against a printing driver.
//!
//! Run with:
//!   cargo run --example continuation -p sqlchain
//!
//! Optional: point SQLCHAIN_CONFIG (in the environment or a .env file) at a
//! TOML connection config; otherwise the logical resource `jdbc/demo` is used.

use chrono::{NaiveDate, NaiveDateTime};
use sqlchain::{
    Connection, ConnectionConfig, ConnectionFactory, Credentials, ResultSet, SqlBuilder,
    SqlResult, Statement, Value,
};
use std::env;

/// Prints every call and answers queries with one canned row.
struct PrintingFactory;

struct PrintingConnection {
    closed: bool,
}

#[derive(Default)]
struct PrintingStatement {
    params: Vec<String>,
    batches: usize,
}

impl PrintingStatement {
    fn bind(&mut self, index: usize, value: Value) -> SqlResult<()> {
        self.params.push(format!("${index}={value:?}"));
        Ok(())
    }
}

impl Statement for PrintingStatement {
    fn bind_null(&mut self, index: usize) -> SqlResult<()> {
        self.bind(index, Value::Null)
    }
    fn bind_text(&mut self, index: usize, value: &str) -> SqlResult<()> {
        self.bind(index, Value::from(value))
    }
    fn bind_int(&mut self, index: usize, value: i32) -> SqlResult<()> {
        self.bind(index, Value::Int(value))
    }
    fn bind_long(&mut self, index: usize, value: i64) -> SqlResult<()> {
        self.bind(index, Value::Long(value))
    }
    fn bind_double(&mut self, index: usize, value: f64) -> SqlResult<()> {
        self.bind(index, Value::Double(value))
    }
    fn bind_float(&mut self, index: usize, value: f32) -> SqlResult<()> {
        self.bind(index, Value::Float(value))
    }
    fn bind_bool(&mut self, index: usize, value: bool) -> SqlResult<()> {
        self.bind(index, Value::Bool(value))
    }
    fn bind_timestamp(&mut self, index: usize, value: NaiveDateTime) -> SqlResult<()> {
        self.bind(index, Value::Timestamp(value))
    }
    fn bind_date(&mut self, index: usize, value: NaiveDate) -> SqlResult<()> {
        self.bind(index, Value::Date(value))
    }
    fn add_batch(&mut self) -> SqlResult<()> {
        println!("   batch {}: [{}]", self.batches, self.params.join(", "));
        self.params.clear();
        self.batches += 1;
        Ok(())
    }
}

impl ConnectionFactory for PrintingFactory {
    type Connection = PrintingConnection;

    async fn resolve_by_name(&self, name: &str) -> SqlResult<PrintingConnection> {
        println!("open {name}");
        Ok(PrintingConnection { closed: false })
    }

    async fn resolve_by_credentials(&self, credentials: &Credentials) -> SqlResult<PrintingConnection> {
        println!("open {} as {}", credentials.url, credentials.user);
        Ok(PrintingConnection { closed: false })
    }
}

impl Connection for PrintingConnection {
    type Statement = PrintingStatement;

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn set_auto_commit(&mut self, enabled: bool) -> SqlResult<()> {
        println!("   auto-commit {enabled}");
        Ok(())
    }

    async fn prepare(&mut self, sql: &str) -> SqlResult<PrintingStatement> {
        println!(">> {sql}");
        Ok(PrintingStatement::default())
    }

    async fn query(&mut self, _stmt: &mut PrintingStatement) -> SqlResult<ResultSet> {
        Ok(ResultSet::new(["id", "name", "RECORD_COUNT_ALIAS"])
            .with_row(vec![Value::Long(1), Value::from("ann"), Value::Long(1)]))
    }

    async fn execute_batch(&mut self, stmt: &mut PrintingStatement) -> SqlResult<Vec<u64>> {
        Ok(vec![1; stmt.batches])
    }

    async fn commit(&mut self) -> SqlResult<()> {
        println!("   commit");
        Ok(())
    }

    async fn rollback(&mut self) -> SqlResult<()> {
        println!("   rollback");
        Ok(())
    }

    async fn close(&mut self) -> SqlResult<()> {
        println!("close");
        self.closed = true;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> SqlResult<()> {
    dotenvy::dotenv().ok();

    let config = match env::var("SQLCHAIN_CONFIG") {
        Ok(path) => ConnectionConfig::load(path)?,
        Err(_) => ConnectionConfig::named("jdbc/demo"),
    };

    let mut qb = SqlBuilder::with_factory(PrintingFactory);
    qb.connection_config(config).table("users");

    // One connection for the read and the follow-up writes.
    let archived = qb
        .where_eq("status", "inactive")
        .get_then(async |rows, qb: &mut SqlBuilder<PrintingFactory>| {
            qb.table("users_archive");
            for row in &rows {
                let name = row.get("name").cloned().unwrap_or(Value::Null);
                qb.insert_row([("name", name)]);
            }
            qb.insert().await?;
            qb.table("users").where_eq("status", "inactive").delete().await?;
            Ok(rows.len())
        })
        .await?;
    println!("archived {archived} row(s)");
    qb.close().await?;

    // Several statements, one commit.
    qb.transaction(async |qb: &mut SqlBuilder<PrintingFactory>, tx| {
        qb.table("accounts")
            .update_data("balance", 90)
            .where_eq("id", 1)
            .update_in(tx)
            .await?;
        qb.update_data("balance", 110).where_eq("id", 2).update_in(tx).await?;
        let total = qb.count_in(tx).await?;
        println!("   {total} account(s)");
        Ok(())
    })
    .await?;

    qb.table("page_views").insert_data("page", "/home").increment("views").await?;

    Ok(())
}
