//! In-memory client used by unit tests.

use crate::client::GenericClient;
use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::statement::Placeholders;
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Records every call and answers from scripted queues.
///
/// `query` pops the next row set (empty when the queue is drained), `execute`
/// pops the next affected count (0 when drained).
#[derive(Default)]
pub(crate) struct RecordingClient {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    rows: Mutex<VecDeque<Vec<Record>>>,
    affected: Mutex<VecDeque<u64>>,
    fail_with: Option<String>,
    placeholders: Placeholders,
}

impl RecordingClient {
    /// A client that receives `?` placeholders.
    pub(crate) fn new() -> Self {
        Self {
            placeholders: Placeholders::Question,
            ..Default::default()
        }
    }

    /// A client that receives `$n` placeholders.
    pub(crate) fn numbered() -> Self {
        Self {
            placeholders: Placeholders::Numbered,
            ..Default::default()
        }
    }

    /// Every call fails with a `Connection` error carrying `message`.
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub(crate) fn with_rows(self, rows: Vec<Record>) -> Self {
        self.rows.lock().unwrap().push_back(rows);
        self
    }

    pub(crate) fn with_affected(self, n: u64) -> Self {
        self.affected.lock().unwrap().push_back(n);
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.calls().into_iter().map(|(sql, _)| sql).collect()
    }

    fn record(&self, sql: &str, params: &[Value]) -> OrmResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        match &self.fail_with {
            Some(message) => Err(OrmError::Connection(message.clone())),
            None => Ok(()),
        }
    }
}

impl GenericClient for RecordingClient {
    fn placeholders(&self) -> Placeholders {
        self.placeholders
    }

    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Record>> {
        self.record(sql, params)?;
        Ok(self.rows.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        self.record(sql, params)?;
        Ok(self.affected.lock().unwrap().pop_front().unwrap_or(0))
    }
}
