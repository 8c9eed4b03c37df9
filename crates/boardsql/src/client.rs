//! Generic client trait for unified database access.

use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::statement::Placeholders;
use crate::value::Value;
use tokio_postgres::types::ToSql;

/// A trait that unifies database clients and transactions.
///
/// This allows CRUD helpers to accept either a direct client connection, a pooled
/// connection or a transaction. SQL arrives already rendered in the client's
/// [`Placeholders`] style.
pub trait GenericClient: Send + Sync {
    /// Placeholder syntax this client expects.
    fn placeholders(&self) -> Placeholders {
        Placeholders::Numbered
    }

    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Record>>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;
}

fn as_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

fn to_records(rows: Vec<tokio_postgres::Row>) -> OrmResult<Vec<Record>> {
    rows.iter().map(Record::from_row).collect()
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Record>> {
        let rows = tokio_postgres::Client::query(self, sql, &as_refs(params))
            .await
            .map_err(|e| OrmError::from_db_error(e, sql, params))?;
        to_records(rows)
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        tokio_postgres::Client::execute(self, sql, &as_refs(params))
            .await
            .map_err(|e| OrmError::from_db_error(e, sql, params))
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Record>> {
        let rows = tokio_postgres::Transaction::query(self, sql, &as_refs(params))
            .await
            .map_err(|e| OrmError::from_db_error(e, sql, params))?;
        to_records(rows)
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, &as_refs(params))
            .await
            .map_err(|e| OrmError::from_db_error(e, sql, params))
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Record>> {
        // Delegate to the deref target (ClientWrapper / tokio_postgres::Client).
        let client: &tokio_postgres::Client = self;
        GenericClient::query(client, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let client: &tokio_postgres::Client = self;
        GenericClient::execute(client, sql, params).await
    }
}

impl<C: GenericClient> GenericClient for &C {
    fn placeholders(&self) -> Placeholders {
        (**self).placeholders()
    }

    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Record>>> + Send {
        (**self).query(sql, params)
    }

    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        (**self).execute(sql, params)
    }
}
