//! Error types for boardsql

use crate::value::Value;
use thiserror::Error;

/// Result type alias for boardsql operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Malformed condition: bad `between` bounds, unknown operator, or a
    /// mutation whose conditions compile to nothing.
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// Query execution error, annotated with the statement that failed
    #[error("Query error: {source}; sql: {sql}")]
    Query {
        #[source]
        source: tokio_postgres::Error,
        sql: String,
        params: Vec<Value>,
    },

    /// Unique constraint violation
    #[error("Duplicate key: {constraint}: {message}")]
    DuplicateKey {
        constraint: String,
        message: String,
        sql: String,
        params: Vec<Value>,
    },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl OrmError {
    /// Create an invalid condition error
    pub fn invalid_condition(message: impl Into<String>) -> Self {
        Self::InvalidCondition(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a unique violation error
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is an invalid condition error
    pub fn is_invalid_condition(&self) -> bool {
        matches!(self, Self::InvalidCondition(_))
    }

    /// The SQL text of the failing statement, for errors raised by the driver.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Query { sql, .. } | Self::DuplicateKey { sql, .. } => Some(sql),
            _ => None,
        }
    }

    /// The bind values of the failing statement, for errors raised by the driver.
    pub fn params(&self) -> Option<&[Value]> {
        match self {
            Self::Query { params, .. } | Self::DuplicateKey { params, .. } => Some(params),
            _ => None,
        }
    }

    /// Classify a tokio_postgres error and attach the statement that produced it.
    pub fn from_db_error(err: tokio_postgres::Error, sql: &str, params: &[Value]) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let classified = Self::classify(
                db_err.code().code(),
                db_err.constraint(),
                db_err.message(),
                sql,
                params,
            );
            if let Some(classified) = classified {
                return classified;
            }
        }
        Self::Query {
            source: err,
            sql: sql.to_string(),
            params: params.to_vec(),
        }
    }

    /// Map a server-reported SQLSTATE onto a specific variant. `None` keeps the
    /// driver error as a plain `Query`.
    fn classify(
        code: &str,
        constraint: Option<&str>,
        message: &str,
        sql: &str,
        params: &[Value],
    ) -> Option<Self> {
        match code {
            "23505" => Some(Self::DuplicateKey {
                constraint: constraint.unwrap_or("unknown").to_string(),
                message: message.to_string(),
                sql: sql.to_string(),
                params: params.to_vec(),
            }),
            _ => None,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
