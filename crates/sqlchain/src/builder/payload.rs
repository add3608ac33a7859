//! Insert and update payloads.

use super::SqlBuilder;
use crate::driver::ConnectionFactory;
use crate::record::Record;
use crate::value::Value;

impl<F: ConnectionFactory> SqlBuilder<F> {
    /// Set `column` on the most recent insert row, starting one if none exists.
    pub fn insert_data(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let quoted = self.quote_or_record(column);
        set_on_last(&mut self.state.insert_rows, quoted, value.into());
        self
    }

    /// Queue a new insert row. An empty row is ignored.
    ///
    /// Every row of a multi-row insert must carry the same columns.
    pub fn insert_row<I, K, V>(&mut self, row: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        if let Some(record) = self.quoted_record(row) {
            self.state.insert_rows.push(record);
        }
        self
    }

    /// Set `column` on the most recent update row, starting one if none exists.
    pub fn update_data(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let quoted = self.quote_or_record(column);
        set_on_last(&mut self.state.update_rows, quoted, value.into());
        self
    }

    /// Queue a new update row. An empty row is ignored; only the first row is used.
    pub fn update_row<I, K, V>(&mut self, row: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        if let Some(record) = self.quoted_record(row) {
            self.state.update_rows.push(record);
        }
        self
    }

    /// Number of queued insert rows.
    pub fn insert_row_count(&self) -> usize {
        self.state.insert_rows.len()
    }

    fn quoted_record<I, K, V>(&mut self, row: I) -> Option<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut record = Record::new();
        for (column, value) in row {
            let quoted = self.quote_or_record(column.as_ref());
            record.insert(quoted, value.into());
        }
        (!record.is_empty()).then_some(record)
    }
}

fn set_on_last(rows: &mut Vec<Record>, column: String, value: Value) {
    match rows.last_mut() {
        Some(row) => row.insert(column, value),
        None => {
            let mut row = Record::new();
            row.insert(column, value);
            rows.push(row);
        }
    }
}
