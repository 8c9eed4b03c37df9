//! # boardsql
//!
//! Condition-map SQL compilation and CRUD helpers for a bulletin-board backend on Postgres.
//!
//! ## Features
//!
//! - **Condition maps**: column → condition entries compile to a parameterized WHERE clause
//! - **Bind everything**: values never reach the SQL text
//! - **Safe defaults**: UPDATE and DELETE refuse to run without a WHERE clause
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//! - **Query monitoring**: timing and logging of every statement
//! - **Repositories**: posts, comments and member accounts with soft delete
//!
//! ## CRUD
//!
//! ```ignore
//! use boardsql::{crud, Columns, ConditionMap, Record};
//!
//! crud::create(&client, "board", &Record::new().set("title", "a").set("contents", "b")).await?;
//!
//! let posts = crud::read(
//!     &client,
//!     "board",
//!     &Columns::from(["board_id", "title"]),
//!     &ConditionMap::new().eq("is_deleted", false).between("views", 10, 100),
//!     Some("publish_date DESC"),
//! )
//! .await?;
//!
//! crud::update(&client, "board", &Record::new().set("title", "b"), &ConditionMap::new().eq("board_id", 1)).await?;
//! crud::remove(&client, "comment", &ConditionMap::new().any_of("comment_id", [1, 2])).await?;
//! ```
//!
//! ## Condition maps from JSON
//!
//! ```ignore
//! let conditions = boardsql::ConditionMap::from_json(r#"{"views": {"type": "gte", "value": 10}}"#)?;
//! let clause = boardsql::compile(&conditions)?;
//! assert_eq!(clause.sql(), "views >= ?");
//! ```

pub mod board;
pub mod client;
pub mod condition;
pub mod config;
pub mod crud;
pub mod error;
pub mod exec;
pub mod monitor;
pub mod record;
pub mod registry;
pub mod statement;
pub mod user;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(test)]
pub(crate) mod testing;

pub use board::{BoardRepo, NewComment, NewPost};
pub use client::GenericClient;
pub use condition::{CompiledClause, Condition, ConditionMap, Op, Operand, compile};
pub use config::DbConfig;
pub use crud::{create, create_returning, read, remove, update};
pub use error::{OrmError, OrmResult};
pub use exec::{MutationResult, execute_async, query_async};
pub use monitor::{
    CompositeMonitor, InstrumentedClient, LoggingMonitor, NoopMonitor, QueryContext, QueryMonitor,
    QueryResult, QueryStats, QueryType, StatsMonitor,
};
pub use record::Record;
pub use registry::{ConnectionId, ConnectionRegistry};
pub use statement::{Columns, Placeholders, Statement};
pub use user::{NewUser, UserAction, UserRepo};
pub use value::Value;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
