use boardsql::DbConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "boardsql.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: Option<usize>,
}

impl ConfigFile {
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;
        Self::parse(&raw, |key| std::env::var(key).ok()).map_err(|e| {
            anyhow::anyhow!(
                "invalid config file {}: {e:#}",
                config_path.display()
            )
        })
    }

    fn parse(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.database.url = expand_env_vars(&file.database.url, lookup)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if self.database.url.trim().is_empty() {
            anyhow::bail!("database.url must not be empty");
        }
        if self.database.pool_size == Some(0) {
            anyhow::bail!("database.pool_size must be greater than zero");
        }
        Ok(())
    }

    pub fn db_config(&self) -> DbConfig {
        let config = DbConfig::new(self.database.url.clone());
        match self.database.pool_size {
            Some(n) => config.with_max_pool_size(n),
            None => config,
        }
    }
}

/// Decide where to connect: `--database`, then the config file, then `DATABASE_URL`.
///
/// An explicit `--config` must exist; the default path is optional.
pub fn resolve_db_config(
    config: Option<&Path>,
    database: Option<&str>,
) -> anyhow::Result<DbConfig> {
    let file = match config {
        Some(path) => Some(ConfigFile::load(path)?),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default.exists() {
                Some(ConfigFile::load(&default)?)
            } else {
                None
            }
        }
    };

    let resolved = match (database, file) {
        (Some(url), Some(file)) => DbConfig {
            url: url.to_string(),
            ..file.db_config()
        },
        (Some(url), None) => DbConfig::new(url),
        (None, Some(file)) => file.db_config(),
        (None, None) => DbConfig::from_env()?,
    };
    resolved.validate()?;
    Ok(resolved)
}

/// Replace every `${VAR}` with the value from `lookup`.
fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = lookup(&key)
                .ok_or_else(|| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
