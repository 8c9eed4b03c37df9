use super::{starts_with_keyword, strip_sql_prefix};
use std::fmt;
use std::time::Duration;

/// The kind of statement being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    /// DDL and anything else.
    Other,
}

impl QueryType {
    /// Detect the statement kind from its leading keyword.
    ///
    /// For `WITH ...` the keyword after the last top-level parenthesis decides.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "WITH") {
            return Self::detect_cte_dml(trimmed);
        }
        Self::from_keyword(trimmed).unwrap_or(QueryType::Other)
    }

    fn from_keyword(s: &str) -> Option<Self> {
        [
            ("SELECT", QueryType::Select),
            ("INSERT", QueryType::Insert),
            ("UPDATE", QueryType::Update),
            ("DELETE", QueryType::Delete),
        ]
        .into_iter()
        .find(|(kw, _)| starts_with_keyword(s, kw))
        .map(|(_, ty)| ty)
    }

    fn detect_cte_dml(sql: &str) -> Self {
        let bytes = sql.as_bytes();
        let mut depth: i32 = 0;
        let mut last_top_level = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        last_top_level = i + 1;
                    }
                }
                b'\'' => {
                    i += 1;
                    while i < bytes.len() {
                        if bytes[i] == b'\'' {
                            if bytes.get(i + 1) == Some(&b'\'') {
                                i += 1;
                            } else {
                                break;
                            }
                        }
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        Self::from_keyword(sql[last_top_level..].trim_start()).unwrap_or(QueryType::Select)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Select => "select",
            QueryType::Insert => "insert",
            QueryType::Update => "update",
            QueryType::Delete => "delete",
            QueryType::Other => "other",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a monitor knows about a statement.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// SQL as sent to the client.
    pub sql: String,
    pub param_count: usize,
    pub query_type: QueryType,
    /// Optional label set on the instrumented client.
    pub tag: Option<String>,
}

impl QueryContext {
    pub fn new(sql: &str, param_count: usize) -> Self {
        Self {
            sql: sql.to_string(),
            param_count,
            query_type: QueryType::from_sql(sql),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

const MAX_ERROR_LEN: usize = 512;

/// Outcome of a monitored call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// A query returned this many rows.
    Rows(usize),
    /// A statement affected this many rows.
    Affected(u64),
    /// The call failed. The message is capped at 512 bytes.
    Error(String),
}

impl QueryResult {
    pub fn error(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!(
                "{}...",
                super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)
            ))
        } else {
            Self::Error(msg)
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Error(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Affected(n) => write!(f, "{n} affected"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Receives timing events from an [`InstrumentedClient`](super::InstrumentedClient).
pub trait QueryMonitor: Send + Sync {
    /// Called before the statement is sent.
    fn on_query_start(&self, _ctx: &QueryContext) {}

    /// Called after every call, successful or not.
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult);

    /// Called after `on_query_complete` when the call exceeded the slow threshold.
    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {}
}
