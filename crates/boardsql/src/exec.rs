//! Single-statement execution.
//!
//! Both entry points render the statement for the client, log it on the
//! `boardsql.sql` target, run exactly one client call and hand back the result or
//! the client's error unchanged.

use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::record::Record;
use crate::statement::Statement;
use serde::Serialize;

/// Outcome of an INSERT / UPDATE / DELETE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MutationResult {
    /// Rows written by the statement.
    pub affected_rows: u64,
    /// Identifier of the inserted row, when the statement reported one.
    pub insert_id: Option<i64>,
}

impl MutationResult {
    pub fn affected(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            insert_id: None,
        }
    }
}

/// Run a statement that returns rows.
pub async fn query_async(conn: &impl GenericClient, stmt: &Statement) -> OrmResult<Vec<Record>> {
    let sql = stmt.render(conn.placeholders());
    tracing::debug!(target: "boardsql.sql", sql = %sql, params = ?stmt.params(), "query");

    match conn.query(&sql, stmt.params()).await {
        Ok(rows) => Ok(rows),
        Err(e) => {
            tracing::warn!(target: "boardsql.sql", sql = %sql, params = ?stmt.params(), error = %e, "query failed");
            Err(e)
        }
    }
}

/// Run a statement for its side effect.
pub async fn execute_async(
    conn: &impl GenericClient,
    stmt: &Statement,
) -> OrmResult<MutationResult> {
    let sql = stmt.render(conn.placeholders());
    tracing::debug!(target: "boardsql.sql", sql = %sql, params = ?stmt.params(), "execute");

    match conn.execute(&sql, stmt.params()).await {
        Ok(n) => Ok(MutationResult::affected(n)),
        Err(e) => {
            tracing::warn!(target: "boardsql.sql", sql = %sql, params = ?stmt.params(), error = %e, "execute failed");
            Err(e)
        }
    }
}
