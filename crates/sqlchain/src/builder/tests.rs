use super::*;
use crate::error::SqlError;
use crate::value::Value;
use chrono::NaiveDate;

fn builder(table: &str) -> SqlBuilder {
    let mut qb = SqlBuilder::new();
    qb.table(table);
    qb
}

#[test]
fn test_select_all() {
    assert_eq!(
        builder("test_table").to_select_sql().unwrap(),
        "SELECT * FROM `test_table`;"
    );
}

#[test]
fn test_select_columns() {
    let mut qb = builder("test_table");
    qb.column("id");
    assert_eq!(qb.to_select_sql().unwrap(), "SELECT `id` FROM `test_table`;");

    qb.columns(["name", "email"]);
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT `id`, `name`, `email` FROM `test_table`;"
    );
}

#[test]
fn test_schema_qualified_table() {
    let mut qb = SqlBuilder::new();
    qb.table_in("app", "users");
    assert_eq!(qb.to_select_sql().unwrap(), "SELECT * FROM `app`.`users`;");
}

#[test]
fn test_where_number_and_text() {
    let mut qb = builder("test_table");
    qb.where_eq("id", 1);
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `test_table` WHERE `id` = 1;"
    );

    let mut qb = builder("test_table");
    qb.where_eq("id", "A");
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `test_table` WHERE `id` = 'A';"
    );
}

#[test]
fn test_where_not() {
    let mut qb = builder("test_table");
    qb.where_not("id", 1);
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `test_table` WHERE `id` <> 1;"
    );

    let mut qb = builder("test_table");
    qb.where_not("id", "A");
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `test_table` WHERE `id` <> 'A';"
    );
}

#[test]
fn test_where_operator() {
    let mut qb = builder("test_table");
    qb.where_op("id", "=", "A").where_op("age", ">=", 18);
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `test_table` WHERE `id` = 'A' AND `age` >= 18;"
    );
}

#[test]
fn test_where_literal_even_when_parameterized() {
    let mut qb = builder("t");
    assert!(qb.is_parameterized());
    qb.where_eq("name", "ann");
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `t` WHERE `name` = 'ann';"
    );
}

#[test]
fn test_where_values_are_not_escaped() {
    let mut qb = builder("t");
    qb.where_eq("name", "x' OR '1'='1");
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `t` WHERE `name` = 'x' OR '1'='1';"
    );
}

#[test]
fn test_where_raw() {
    let mut qb = builder("t");
    qb.where_raw("`deleted_at` IS NULL").where_eq("id", 3);
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `t` WHERE `deleted_at` IS NULL AND `id` = 3;"
    );
}

#[test]
fn test_where_in() {
    let mut qb = builder("test_table");
    qb.where_in("id", ["A", "B", "C"]);
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `test_table` WHERE `id` IN ('A', 'B', 'C');"
    );
}

#[test]
fn test_where_not_in() {
    let mut qb = builder("test_table");
    qb.where_not_in("id", ["A", "B", "C"]);
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `test_table` WHERE `id` NOT IN ('A', 'B', 'C');"
    );
}

#[test]
fn test_where_in_empty() {
    let mut qb = builder("t");
    qb.where_in("id", Vec::<i32>::new());
    assert_eq!(qb.to_select_sql().unwrap(), "SELECT * FROM `t` WHERE 1=0;");

    let mut qb = builder("t");
    qb.where_not_in("id", Vec::<i32>::new());
    assert_eq!(qb.to_select_sql().unwrap(), "SELECT * FROM `t`;");
}

#[test]
fn test_where_not_in_empty_keeps_other_predicates() {
    let mut qb = builder("t");
    qb.where_eq("status", "on")
        .where_not_in("id", Vec::<i64>::new())
        .where_eq("kind", 2);
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `t` WHERE `status` = 'on' AND `kind` = 2;"
    );
}

#[test]
fn test_order_by() {
    let mut qb = builder("test_table");
    qb.order_by("id");
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `test_table` ORDER BY `id` ASC;"
    );

    let mut qb = builder("test_table");
    qb.order_by_asc("id");
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `test_table` ORDER BY `id` ASC;"
    );

    let mut qb = builder("test_table");
    qb.order_by_desc("id").order_by_asc("name");
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `test_table` ORDER BY `id` DESC, `name` ASC;"
    );
}

#[test]
fn test_join() {
    let mut qb = builder("test_table1");
    qb.join("test_table2", "test_table1", "test_id", "test_table2", "id");
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `test_table1` JOIN `test_table2` ON `test_table1`.`test_id` = `test_table2`.`id`;"
    );
}

#[test]
fn test_joins_render_before_left_joins() {
    let mut qb = builder("a");
    qb.left_join("c", "a", "c_id", "c", "id")
        .join("b", "a", "b_id", "b", "id");
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT * FROM `a` JOIN `b` ON `a`.`b_id` = `b`.`id` LEFT JOIN `c` ON `a`.`c_id` = `c`.`id`;"
    );
}

#[test]
fn test_group_having_union() {
    let mut qb = builder("orders");
    qb.column("user_id")
        .group_by("user_id")
        .having("COUNT(*) > 1")
        .union("SELECT `user_id` FROM `archived_orders`");
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "SELECT `user_id` FROM `orders` GROUP BY `user_id` HAVING COUNT(*) > 1 UNION SELECT `user_id` FROM `archived_orders`;"
    );
}

#[test]
fn test_explain_distinct_lock() {
    let mut qb = builder("t");
    qb.explain(true)
        .distinct(true)
        .column("id")
        .for_update(true)
        .no_wait(true);
    assert_eq!(
        qb.to_select_sql().unwrap(),
        "EXPLAIN SELECT DISTINCT `id` FROM `t` FOR UPDATE NOWAIT;"
    );
}

#[test]
fn test_no_wait_requires_for_update() {
    let mut qb = builder("t");
    qb.no_wait(true);
    assert_eq!(qb.to_select_sql().unwrap(), "SELECT * FROM `t`;");
}

#[test]
fn test_limit_offset() {
    for limit in [1u64, 2, 10, 500] {
        for offset in [0u64, 1, 20] {
            let mut qb = builder("t");
            qb.limit(limit).offset(offset);
            let sql = qb.to_select_sql().unwrap();
            assert!(sql.contains(&format!("LIMIT {limit}")), "{sql}");
            assert_eq!(sql.contains("OFFSET"), offset > 0, "{sql}");
            if offset > 0 {
                assert!(sql.ends_with(&format!("LIMIT {limit} OFFSET {offset};")));
            }
        }
    }
}

#[test]
fn test_offset_without_limit_is_ignored() {
    let mut qb = builder("t");
    qb.offset(5);
    assert_eq!(qb.to_select_sql().unwrap(), "SELECT * FROM `t`;");
}

#[test]
fn test_count_sql() {
    let mut qb = builder("t");
    qb.column("id").where_eq("status", "on").limit(50);
    assert_eq!(
        qb.to_count_sql("*").unwrap(),
        "SELECT COUNT(*) AS RECORD_COUNT_ALIAS FROM `t` WHERE `status` = 'on' LIMIT 1;"
    );
    assert_eq!(
        qb.to_count_sql("id").unwrap(),
        "SELECT COUNT(`id`) AS RECORD_COUNT_ALIAS FROM `t` WHERE `status` = 'on' LIMIT 1;"
    );
    // the declared limit is left untouched
    assert!(qb.to_select_sql().unwrap().ends_with("LIMIT 50;"));
}

#[test]
fn test_delete_sql() {
    let mut qb = builder("t");
    assert_eq!(qb.to_delete_sql().unwrap(), "DELETE FROM `t`;");
    qb.where_eq("id", 9);
    assert_eq!(qb.to_delete_sql().unwrap(), "DELETE FROM `t` WHERE `id` = 9;");
}

#[test]
fn test_insert_single_row_parameterized() {
    let mut qb = builder("users");
    qb.insert_data("name", "ann").insert_data("age", 31);
    assert_eq!(
        qb.to_insert_sql().unwrap(),
        "INSERT INTO `users` (`name`, `age`) VALUES (?, ?);"
    );
}

#[test]
fn test_insert_bulk_parameterized_emits_one_group() {
    let mut qb = builder("users");
    qb.insert_row([("name", Value::from("ann")), ("age", Value::from(31))])
        .insert_row([("name", Value::from("bob")), ("age", Value::from(42))]);
    assert_eq!(qb.insert_row_count(), 2);
    assert_eq!(
        qb.to_insert_sql().unwrap(),
        "INSERT INTO `users` (`name`, `age`) VALUES (?, ?);"
    );
}

#[test]
fn test_insert_bulk_literal_emits_tuple_per_row() {
    let mut qb = builder("users");
    qb.stake_holder(false)
        .insert_row([("name", Value::from("ann")), ("age", Value::from(31))])
        .insert_row([("name", Value::from("bob")), ("age", Value::from(42))]);
    assert_eq!(
        qb.to_insert_sql().unwrap(),
        "INSERT INTO `users` (`name`, `age`) VALUES ('ann', 31), ('bob', 42);"
    );
}

#[test]
fn test_insert_literal_follows_column_order() {
    let mut qb = builder("users");
    qb.stake_holder(false)
        .insert_row([("name", Value::from("ann")), ("age", Value::from(31))])
        .insert_row([("age", Value::from(42)), ("name", Value::from("bob"))]);
    assert_eq!(
        qb.to_insert_sql().unwrap(),
        "INSERT INTO `users` (`name`, `age`) VALUES ('ann', 31), ('bob', 42);"
    );
}

#[test]
fn test_insert_data_extends_last_row() {
    let mut qb = builder("users");
    qb.stake_holder(false)
        .insert_row([("name", "ann")])
        .insert_data("email", "ann@example.com")
        .insert_data("name", "anne");
    assert_eq!(
        qb.to_insert_sql().unwrap(),
        "INSERT INTO `users` (`name`, `email`) VALUES ('anne', 'ann@example.com');"
    );
}

#[test]
fn test_insert_empty_row_is_ignored() {
    let mut qb = builder("users");
    qb.insert_row(Vec::<(&str, Value)>::new());
    assert_eq!(qb.insert_row_count(), 0);
    assert!(matches!(
        qb.to_insert_sql().unwrap_err(),
        SqlError::Validation(_)
    ));
}

#[test]
fn test_insert_row_count_mismatch() {
    let mut qb = builder("users");
    qb.insert_row([("name", Value::from("ann")), ("age", Value::from(31))])
        .insert_row([("name", Value::from("bob"))]);
    let err = qb.to_insert_sql().unwrap_err();
    assert!(err.is_data_mismatch());
    assert!(matches!(
        err,
        SqlError::DataMismatch {
            expected: 2,
            found: 1
        }
    ));
}

#[test]
fn test_insert_row_key_mismatch() {
    let mut qb = builder("users");
    qb.insert_row([("name", "ann")]).insert_row([("email", "b@x")]);
    assert!(qb.to_insert_sql().unwrap_err().is_data_mismatch());
}

#[test]
fn test_insert_temporal_and_null_literals() {
    let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let mut qb = builder("events");
    qb.stake_holder(false)
        .insert_data("day", day)
        .insert_data("at", day.and_hms_opt(8, 30, 0).unwrap())
        .insert_data("note", None::<String>);
    assert_eq!(
        qb.to_insert_sql().unwrap(),
        "INSERT INTO `events` (`day`, `at`, `note`) VALUES ('2024-01-31', '2024-01-31', );"
    );
}

#[test]
fn test_update_sql() {
    let mut qb = builder("users");
    qb.update_data("name", "ann")
        .update_data("age", 32)
        .where_eq("id", 1);
    assert_eq!(
        qb.to_update_sql().unwrap(),
        "UPDATE `users` SET `name` = ?, `age` = ? WHERE `id` = 1;"
    );

    qb.stake_holder(false);
    assert_eq!(
        qb.to_update_sql().unwrap(),
        "UPDATE `users` SET `name` = 'ann', `age` = 32 WHERE `id` = 1;"
    );
}

#[test]
fn test_update_uses_first_row_only() {
    let mut qb = builder("users");
    qb.stake_holder(false)
        .update_row([("name", "ann")])
        .update_row([("name", "bob")]);
    assert_eq!(
        qb.to_update_sql().unwrap(),
        "UPDATE `users` SET `name` = 'ann';"
    );
}

#[test]
fn test_update_without_data() {
    assert!(matches!(
        builder("users").to_update_sql().unwrap_err(),
        SqlError::Validation(_)
    ));
}

#[test]
fn test_increment_sql() {
    let qb = builder("counters");
    assert_eq!(
        qb.to_increment_sql("count").unwrap(),
        "INSERT INTO `counters` (`count`) VALUES (?) ON DUPLICATE KEY UPDATE `count` = `count` + 1;"
    );
}

#[test]
fn test_increment_sql_with_key() {
    let mut qb = builder("page_views");
    qb.insert_data("page", "/home");
    assert_eq!(
        qb.to_increment_sql("views").unwrap(),
        "INSERT INTO `page_views` (`page`, `views`) VALUES (?, ?) ON DUPLICATE KEY UPDATE `views` = `views` + 1;"
    );

    qb.stake_holder(false);
    assert_eq!(
        qb.to_increment_sql("views").unwrap(),
        "INSERT INTO `page_views` (`page`, `views`) VALUES ('/home', 1) ON DUPLICATE KEY UPDATE `views` = `views` + 1;"
    );
    // rendering leaves the queued row untouched
    assert_eq!(
        qb.to_insert_sql().unwrap(),
        "INSERT INTO `page_views` (`page`) VALUES ('/home');"
    );
}

#[test]
fn test_table_required() {
    let qb = SqlBuilder::new();
    assert!(qb.to_select_sql().unwrap_err().is_config());
    assert!(qb.to_delete_sql().unwrap_err().is_config());
    assert!(qb.to_insert_sql().unwrap_err().is_config());
    assert!(qb.to_update_sql().unwrap_err().is_config());
    assert!(qb.to_increment_sql("n").unwrap_err().is_config());
}

#[test]
fn test_invalid_identifier_surfaces_at_render() {
    let mut qb = builder("t");
    qb.column("");
    assert!(matches!(
        qb.to_select_sql().unwrap_err(),
        SqlError::Validation(_)
    ));
    qb.reset();
    assert_eq!(qb.to_select_sql().unwrap(), "SELECT * FROM `t`;");

    let mut qb = SqlBuilder::new();
    qb.table("bad\0name");
    assert!(matches!(
        qb.to_select_sql().unwrap_err(),
        SqlError::Validation(_)
    ));
}

#[test]
fn test_reset_keeps_table_and_config() {
    let mut qb = builder("t");
    qb.db("jdbc/app")
        .column("id")
        .where_eq("id", 1)
        .order_by_desc("id")
        .insert_data("id", 1)
        .update_data("id", 2)
        .limit(5)
        .offset(5)
        .explain(true)
        .distinct(true)
        .for_update(true)
        .stake_holder(false);
    qb.reset();
    assert_eq!(qb.to_select_sql().unwrap(), "SELECT * FROM `t`;");
    assert_eq!(qb.insert_row_count(), 0);
    assert!(qb.is_parameterized());
    assert_eq!(qb.table_ref(), Some("`t`"));
    assert_eq!(qb.connection_settings().resource.as_deref(), Some("jdbc/app"));
}
