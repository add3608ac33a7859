//! Rendering statements without a database.
//!
//! Run with:
//!   cargo run --example render_sql -p sqlchain

use chrono::NaiveDate;
use sqlchain::{SqlBuilder, SqlResult, Value};

#[derive(Debug)]
struct Filters {
    status: Option<String>,
    roles_any_of: Vec<String>,
    include_deleted: bool,
    page: u64,
    per_page: u64,
}

fn list_users(qb: &mut SqlBuilder, filters: &Filters) -> SqlResult<String> {
    qb.columns(["id", "name", "status", "role"]);
    if let Some(status) = &filters.status {
        qb.where_eq("status", status.as_str());
    }
    if !filters.roles_any_of.is_empty() {
        qb.where_in("role", &filters.roles_any_of);
    }
    if !filters.include_deleted {
        qb.where_raw("`deleted_at` IS NULL");
    }
    qb.order_by_desc("created_at")
        .limit(filters.per_page)
        .offset(filters.page.saturating_sub(1) * filters.per_page);
    qb.to_select_sql()
}

fn main() -> SqlResult<()> {
    let mut qb = SqlBuilder::new();
    qb.table("users");

    let filters = Filters {
        status: Some("active".to_string()),
        roles_any_of: vec!["admin".to_string(), "owner".to_string()],
        include_deleted: false,
        page: 3,
        per_page: 20,
    };
    println!("-- list\n{}", list_users(&mut qb, &filters)?);
    println!("-- count\n{}", qb.to_count_sql("*")?);
    qb.reset();

    qb.join("orders", "users", "id", "orders", "user_id")
        .column("name")
        .group_by("name")
        .having("COUNT(*) > 5");
    println!("-- join\n{}", qb.to_select_sql()?);
    qb.reset();

    let joined = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default();
    qb.insert_row([
        ("name", Value::from("ann")),
        ("joined", Value::from(joined)),
    ])
    .insert_row([("name", Value::from("bob")), ("joined", Value::from(joined))]);
    println!("-- insert (parameterized)\n{}", qb.to_insert_sql()?);
    qb.stake_holder(false);
    println!("-- insert (literal)\n{}", qb.to_insert_sql()?);
    qb.reset();

    qb.update_data("status", "inactive").where_eq("id", 42);
    println!("-- update\n{}", qb.to_update_sql()?);
    qb.reset();

    qb.where_eq("id", 42);
    println!("-- delete\n{}", qb.to_delete_sql()?);
    qb.reset();

    qb.table("page_views").insert_data("page", "/home");
    println!("-- increment\n{}", qb.to_increment_sql("views")?);

    Ok(())
}
