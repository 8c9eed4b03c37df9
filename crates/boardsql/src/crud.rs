//! CRUD helpers over a table name, a payload and a condition map.
//!
//! ```ignore
//! use boardsql::{crud, ConditionMap, Columns, Record};
//!
//! crud::create(&client, "board", &Record::new().set("title", "a").set("contents", "b")).await?;
//!
//! let rows = crud::read(
//!     &client,
//!     "board",
//!     &Columns::All,
//!     &ConditionMap::new().eq("title", "a"),
//!     Some("publish_date DESC"),
//! )
//! .await?;
//!
//! crud::update(&client, "board", &Record::new().set("title", "b"), &ConditionMap::new().eq("board_id", 1)).await?;
//! crud::remove(&client, "board", &ConditionMap::new().eq("board_id", 1)).await?;
//! ```

use crate::client::GenericClient;
use crate::condition::ConditionMap;
use crate::error::{OrmError, OrmResult};
use crate::exec::{MutationResult, execute_async, query_async};
use crate::record::Record;
use crate::statement::{self, Columns};
use crate::value::Value;

/// Insert one row.
pub async fn create(
    conn: &impl GenericClient,
    table: &str,
    data: &Record,
) -> OrmResult<MutationResult> {
    let stmt = statement::insert(table, data)?;
    execute_async(conn, &stmt).await
}

/// Insert one row and report `id_column` of the new row as `insert_id`.
pub async fn create_returning(
    conn: &impl GenericClient,
    table: &str,
    data: &Record,
    id_column: &str,
) -> OrmResult<MutationResult> {
    let stmt = statement::insert_returning(table, data, id_column)?;
    let rows = query_async(conn, &stmt).await?;

    let insert_id = match rows.first().and_then(|row| row.get(id_column)) {
        None | Some(Value::Null) => None,
        Some(Value::Int(id)) => Some(*id),
        Some(other) => {
            return Err(OrmError::decode(
                id_column,
                format!("expected an integer identifier, got {other:?}"),
            ));
        }
    };

    Ok(MutationResult {
        affected_rows: rows.len() as u64,
        insert_id,
    })
}

/// Select rows. An empty result is not an error.
pub async fn read(
    conn: &impl GenericClient,
    table: &str,
    columns: &Columns,
    conditions: &ConditionMap,
    order_by: Option<&str>,
) -> OrmResult<Vec<Record>> {
    let stmt = statement::select(table, columns, conditions, order_by)?;
    query_async(conn, &stmt).await
}

/// Update matching rows and return the affected count.
///
/// Fails with [`OrmError::InvalidCondition`] when `conditions` compiles to nothing.
pub async fn update(
    conn: &impl GenericClient,
    table: &str,
    data: &Record,
    conditions: &ConditionMap,
) -> OrmResult<u64> {
    let stmt = statement::update(table, data, conditions)?;
    Ok(execute_async(conn, &stmt).await?.affected_rows)
}

/// Delete matching rows and return the affected count.
///
/// Fails with [`OrmError::InvalidCondition`] when `conditions` compiles to nothing.
pub async fn remove(
    conn: &impl GenericClient,
    table: &str,
    conditions: &ConditionMap,
) -> OrmResult<u64> {
    let stmt = statement::delete(table, conditions)?;
    Ok(execute_async(conn, &stmt).await?.affected_rows)
}
