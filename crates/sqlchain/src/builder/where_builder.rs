//! Projection, predicate, join, grouping and ordering fragments.
//!
//! Predicate helpers inline their values with [`Value::to_literal`]: text is
//! wrapped in single quotes and nothing is escaped. They are meant for trusted
//! values only; the caller is responsible for anything user-supplied.

use super::SqlBuilder;
use crate::driver::ConnectionFactory;
use crate::value::Value;

impl<F: ConnectionFactory> SqlBuilder<F> {
    // ==================== Projection ====================

    /// Append one projected column.
    pub fn column(&mut self, name: &str) -> &mut Self {
        let quoted = self.quote_or_record(name);
        self.state.columns.push(quoted);
        self
    }

    /// Append several projected columns.
    pub fn columns<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.column(name.as_ref());
        }
        self
    }

    // ==================== WHERE ====================

    /// Add `` `column` = <literal> ``.
    pub fn where_eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.where_op(column, "=", value)
    }

    /// Add `` `column` <> <literal> ``.
    pub fn where_not(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.where_op(column, "<>", value)
    }

    /// Add `` `column` <operator> <literal> ``.
    ///
    /// `operator` is written as given (`=`, `>=`, `LIKE`, ...).
    pub fn where_op(&mut self, column: &str, operator: &str, value: impl Into<Value>) -> &mut Self {
        let quoted = self.quote_or_record(column);
        let literal = value.into().to_literal();
        self.state
            .wheres
            .push(format!("{quoted} {operator} {literal}"));
        self
    }

    /// Add a raw predicate, written verbatim.
    pub fn where_raw(&mut self, expression: &str) -> &mut Self {
        self.state.wheres.push(expression.to_string());
        self
    }

    /// Add `` `column` IN (<literal>, ...) ``.
    ///
    /// An empty list adds `1=0`.
    pub fn where_in<I, V>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = literal_list(values);
        if list.is_empty() {
            self.state.wheres.push("1=0".to_string());
            return self;
        }
        let quoted = self.quote_or_record(column);
        self.state.wheres.push(format!("{quoted} IN ({list})"));
        self
    }

    /// Add `` `column` NOT IN (<literal>, ...) ``.
    ///
    /// An empty list adds nothing.
    pub fn where_not_in<I, V>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = literal_list(values);
        if list.is_empty() {
            return self;
        }
        let quoted = self.quote_or_record(column);
        self.state.wheres.push(format!("{quoted} NOT IN ({list})"));
        self
    }

    // ==================== JOIN ====================

    /// Add `` JOIN `table` ON `left_table`.`left_column` = `right_table`.`right_column` ``.
    pub fn join(
        &mut self,
        table: &str,
        left_table: &str,
        left_column: &str,
        right_table: &str,
        right_column: &str,
    ) -> &mut Self {
        let clause = self.join_clause(table, left_table, left_column, right_table, right_column);
        self.state.joins.push(clause);
        self
    }

    /// Same as [`join`](Self::join) but rendered as `LEFT JOIN`.
    pub fn left_join(
        &mut self,
        table: &str,
        left_table: &str,
        left_column: &str,
        right_table: &str,
        right_column: &str,
    ) -> &mut Self {
        let clause = self.join_clause(table, left_table, left_column, right_table, right_column);
        self.state.left_joins.push(clause);
        self
    }

    fn join_clause(
        &mut self,
        table: &str,
        left_table: &str,
        left_column: &str,
        right_table: &str,
        right_column: &str,
    ) -> String {
        let table = self.quote_or_record(table);
        let lt = self.quote_or_record(left_table);
        let lc = self.quote_or_record(left_column);
        let rt = self.quote_or_record(right_table);
        let rc = self.quote_or_record(right_column);
        format!("{table} ON {lt}.{lc} = {rt}.{rc}")
    }

    // ==================== GROUP BY / HAVING / UNION ====================

    /// Add a `GROUP BY` column.
    pub fn group_by(&mut self, column: &str) -> &mut Self {
        let quoted = self.quote_or_record(column);
        self.state.group_by.push(quoted);
        self
    }

    /// Add a raw HAVING condition (AND-joined), written verbatim.
    pub fn having(&mut self, expression: &str) -> &mut Self {
        self.state.having.push(expression.to_string());
        self
    }

    /// Append `UNION <select>`; the statement is written verbatim.
    pub fn union(&mut self, select_sql: &str) -> &mut Self {
        self.state.unions.push(select_sql.to_string());
        self
    }

    // ==================== ORDER BY ====================

    /// Ascending order; same as [`order_by_asc`](Self::order_by_asc).
    pub fn order_by(&mut self, column: &str) -> &mut Self {
        self.order_by_asc(column)
    }

    /// Add `` `column` ASC `` to the ordering.
    pub fn order_by_asc(&mut self, column: &str) -> &mut Self {
        let quoted = self.quote_or_record(column);
        self.state.order_by.push(format!("{quoted} ASC"));
        self
    }

    /// Add `` `column` DESC `` to the ordering.
    pub fn order_by_desc(&mut self, column: &str) -> &mut Self {
        let quoted = self.quote_or_record(column);
        self.state.order_by.push(format!("{quoted} DESC"));
        self
    }
}

fn literal_list<I, V>(values: I) -> String
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    values
        .into_iter()
        .map(|v| v.into().to_literal())
        .collect::<Vec<_>>()
        .join(", ")
}
