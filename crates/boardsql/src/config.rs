//! Database connection settings.

use crate::error::{OrmError, OrmResult};
use serde::Deserialize;

/// Default maximum number of pooled connections.
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Where to connect and how many connections to keep.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DbConfig {
    /// `postgres://` URL or key/value connection string.
    pub url: String,
    #[serde(default = "default_pool_size", alias = "pool_size")]
    pub max_pool_size: usize,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pool_size: DEFAULT_POOL_SIZE,
        }
    }

    pub fn with_max_pool_size(mut self, max_pool_size: usize) -> Self {
        self.max_pool_size = max_pool_size;
        self
    }

    /// Read `DATABASE_URL` (required) and `DATABASE_POOL_SIZE` (optional).
    pub fn from_env() -> OrmResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> OrmResult<Self> {
        let url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| OrmError::Config("DATABASE_URL is not set".to_string()))?;

        let max_pool_size = match lookup("DATABASE_POOL_SIZE") {
            None => DEFAULT_POOL_SIZE,
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                OrmError::Config(format!(
                    "DATABASE_POOL_SIZE must be a positive integer, got '{raw}'"
                ))
            })?,
        };

        let config = Self { url, max_pool_size };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> OrmResult<()> {
        if self.url.trim().is_empty() {
            return Err(OrmError::Config("database url is empty".to_string()));
        }
        if self.max_pool_size == 0 {
            return Err(OrmError::Config(
                "pool size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
