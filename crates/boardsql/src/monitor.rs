//! Query timing and monitoring.
//!
//! [`InstrumentedClient`] wraps any [`GenericClient`](crate::GenericClient), times each
//! call and reports it to a [`QueryMonitor`].
//!
//! # Example
//!
//! ```rust,ignore
//! use boardsql::monitor::{InstrumentedClient, LoggingMonitor};
//! use std::time::Duration;
//!
//! let client = InstrumentedClient::new(db_client)
//!     .with_monitor(LoggingMonitor::new())
//!     .with_slow_query_threshold(Duration::from_millis(500));
//!
//! let rows = boardsql::crud::read(&client, "board", &Columns::All, &conditions, None).await?;
//! ```

mod instrumented;
mod monitors;
mod types;


pub use instrumented::InstrumentedClient;
pub use monitors::{CompositeMonitor, LoggingMonitor, NoopMonitor, QueryStats, StatsMonitor};
pub use types::{QueryContext, QueryMonitor, QueryResult, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Skip leading whitespace, comments and parentheses.
pub(crate) fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s;
        s = s.trim_start();
        if s.starts_with("--") {
            match s.find('\n') {
                Some(pos) => {
                    s = &s[pos + 1..];
                    continue;
                }
                None => return "",
            }
        }
        if s.starts_with("/*") {
            match s.find("*/") {
                Some(pos) => {
                    s = &s[pos + 2..];
                    continue;
                }
                None => return "",
            }
        }
        if let Some(rest) = s.strip_prefix('(') {
            s = rest;
            continue;
        }
        if s == before {
            return s;
        }
    }
}

/// Case-insensitive keyword match that does not accept `SELECTED` for `SELECT`.
pub(crate) fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    let Some(prefix) = s.get(..keyword.len()) else {
        return false;
    };
    prefix.eq_ignore_ascii_case(keyword)
        && s[keyword.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}
