//! In-memory driver that records every call made against it.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use sqlchain::{
    Connection, ConnectionFactory, Credentials, ResultSet, SqlError, SqlResult, Statement, Value,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Resolve(String),
    AutoCommit(bool),
    Prepare(String),
    Bind(usize, Value),
    AddBatch,
    Query,
    ExecuteBatch,
    Commit,
    Rollback,
    Close,
}

#[derive(Default)]
struct Script {
    events: Vec<Event>,
    results: VecDeque<ResultSet>,
    fail_execute: bool,
    fail_rollback: bool,
}

/// Shared log of driver calls plus canned results.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Script>>);

impl Recorder {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().events.push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().events.clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().events.clear();
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    pub fn resolves(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Resolve(_)))
            .count()
    }

    pub fn prepared(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Prepare(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    pub fn binds(&self) -> Vec<(usize, Value)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Bind(i, v) => Some((i, v)),
                _ => None,
            })
            .collect()
    }

    /// Queue the result of the next query.
    pub fn push_result(&self, result: ResultSet) {
        self.0.lock().unwrap().results.push_back(result);
    }

    pub fn fail_execute(&self) {
        self.0.lock().unwrap().fail_execute = true;
    }

    pub fn fail_rollback(&self) {
        self.0.lock().unwrap().fail_rollback = true;
    }
}

pub struct FakeFactory {
    pub recorder: Recorder,
}

impl FakeFactory {
    pub fn new() -> (Self, Recorder) {
        let recorder = Recorder::default();
        (
            Self {
                recorder: recorder.clone(),
            },
            recorder,
        )
    }

    fn open(&self, route: String) -> FakeConnection {
        self.recorder.push(Event::Resolve(route));
        FakeConnection {
            recorder: self.recorder.clone(),
            closed: false,
        }
    }
}

impl ConnectionFactory for FakeFactory {
    type Connection = FakeConnection;

    async fn resolve_by_name(&self, name: &str) -> SqlResult<FakeConnection> {
        Ok(self.open(name.to_string()))
    }

    async fn resolve_by_credentials(&self, credentials: &Credentials) -> SqlResult<FakeConnection> {
        Ok(self.open(credentials.url.clone()))
    }
}

pub struct FakeConnection {
    recorder: Recorder,
    closed: bool,
}

pub struct FakeStatement {
    recorder: Recorder,
    batches: usize,
}

impl FakeStatement {
    fn bind(&mut self, index: usize, value: Value) -> SqlResult<()> {
        self.recorder.push(Event::Bind(index, value));
        Ok(())
    }
}

impl Statement for FakeStatement {
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
        self.batches += 1;
        self.recorder.push(Event::AddBatch);
        Ok(())
    }
}

impl Connection for FakeConnection {
    type Statement = FakeStatement;

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn set_auto_commit(&mut self, enabled: bool) -> SqlResult<()> {
        self.recorder.push(Event::AutoCommit(enabled));
        Ok(())
    }

    async fn prepare(&mut self, sql: &str) -> SqlResult<FakeStatement> {
        self.recorder.push(Event::Prepare(sql.to_string()));
        Ok(FakeStatement {
            recorder: self.recorder.clone(),
            batches: 0,
        })
    }

    async fn query(&mut self, _stmt: &mut FakeStatement) -> SqlResult<ResultSet> {
        self.recorder.push(Event::Query);
        let next = self.recorder.0.lock().unwrap().results.pop_front();
        Ok(next.unwrap_or_default())
    }

    async fn execute_batch(&mut self, stmt: &mut FakeStatement) -> SqlResult<Vec<u64>> {
        self.recorder.push(Event::ExecuteBatch);
        if self.recorder.0.lock().unwrap().fail_execute {
            return Err(SqlError::driver("duplicate entry"));
        }
        Ok(vec![1; stmt.batches])
    }

    async fn commit(&mut self) -> SqlResult<()> {
        self.recorder.push(Event::Commit);
        Ok(())
    }

    async fn rollback(&mut self) -> SqlResult<()> {
        self.recorder.push(Event::Rollback);
        if self.recorder.0.lock().unwrap().fail_rollback {
            return Err(SqlError::driver("connection lost"));
        }
        Ok(())
    }

    async fn close(&mut self) -> SqlResult<()> {
        self.recorder.push(Event::Close);
        self.closed = true;
        Ok(())
    }
}
