#![allow(dead_code)]

use std::collections::VecDeque;

use oxide_dml_core::error::BackendError;
use oxide_dml_core::{Connection, PreparedStatement, Row, SqlType, SqlValue};

/// Everything the engine asked the backend to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Prepare(String),
    Bind(usize, SqlValue),
    BindNull(usize, SqlType),
    ExecuteUpdate,
    ExecuteQuery,
    Close,
}

/// A recording backend double with scripted results and fault injection.
#[derive(Debug, Default)]
pub struct MockConnection {
    events: Vec<Event>,
    query_results: VecDeque<Vec<Row>>,
    update_counts: VecDeque<u64>,
    fail_prepare: bool,
    fail_bind_at: Option<usize>,
    fail_execute: bool,
    fail_close: bool,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the rows returned by the next query.
    pub fn with_rows(mut self, rows: Vec<Vec<SqlValue>>) -> Self {
        self.query_results
            .push_back(rows.into_iter().map(Row::new).collect());
        self
    }

    /// Queues the count returned by the next update (default 1).
    pub fn with_update_count(mut self, count: u64) -> Self {
        self.update_counts.push_back(count);
        self
    }

    pub fn failing_prepare(mut self) -> Self {
        self.fail_prepare = true;
        self
    }

    pub fn failing_bind_at(mut self, position: usize) -> Self {
        self.fail_bind_at = Some(position);
        self
    }

    pub fn failing_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// SQL text of every prepared statement.
    pub fn statements(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Prepare(sql) => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn close_count(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Close).count()
    }

    /// Bind events issued for the `n`-th prepared statement (0-based).
    pub fn binds_of(&self, n: usize) -> Vec<Event> {
        self.events
            .split(|event| matches!(event, Event::Prepare(_)))
            .nth(n + 1)
            .unwrap_or_default()
            .iter()
            .filter(|event| matches!(event, Event::Bind(..) | Event::BindNull(..)))
            .cloned()
            .collect()
    }
}

impl Connection for MockConnection {
    fn prepare<'s>(
        &'s mut self,
        sql: &str,
    ) -> Result<Box<dyn PreparedStatement + 's>, BackendError> {
        self.events.push(Event::Prepare(sql.to_string()));
        if self.fail_prepare {
            return Err("syntax error".into());
        }
        Ok(Box::new(MockStatement { conn: self }))
    }
}

struct MockStatement<'s> {
    conn: &'s mut MockConnection,
}

impl MockStatement<'_> {
    fn check_bind(&self, position: usize) -> Result<(), BackendError> {
        if self.conn.fail_bind_at == Some(position) {
            Err(format!("cannot bind parameter {position}").into())
        } else {
            Ok(())
        }
    }
}

impl PreparedStatement for MockStatement<'_> {
    fn bind(&mut self, position: usize, value: SqlValue) -> Result<(), BackendError> {
        self.check_bind(position)?;
        self.conn.events.push(Event::Bind(position, value));
        Ok(())
    }

    fn bind_null(&mut self, position: usize, sql_type: SqlType) -> Result<(), BackendError> {
        self.check_bind(position)?;
        self.conn.events.push(Event::BindNull(position, sql_type));
        Ok(())
    }

    fn execute_update(&mut self) -> Result<u64, BackendError> {
        self.conn.events.push(Event::ExecuteUpdate);
        if self.conn.fail_execute {
            return Err("constraint violated".into());
        }
        Ok(self.conn.update_counts.pop_front().unwrap_or(1))
    }

    fn execute_query(&mut self) -> Result<Vec<Row>, BackendError> {
        self.conn.events.push(Event::ExecuteQuery);
        if self.conn.fail_execute {
            return Err("query failed".into());
        }
        Ok(self.conn.query_results.pop_front().unwrap_or_default())
    }

    fn close(self: Box<Self>) -> Result<(), BackendError> {
        self.conn.events.push(Event::Close);
        if self.conn.fail_close {
            return Err("close failed".into());
        }
        Ok(())
    }
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}
