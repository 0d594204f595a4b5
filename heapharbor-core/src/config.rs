//! Configuration loading
//!
//! Sources, highest priority first:
//! 1. Explicit overrides from the caller (CLI flags)
//! 2. `DATABASE_URL` / `HEAPHARBOR_MAX_CONNECTIONS` environment variables
//! 3. `~/.heapharbor/config.toml`
//! 4. Built-in defaults
//!
//! `.env` files in the current directory and `~/.heapharbor/` are loaded into
//! the environment first; they never override variables that are already set.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/heapharbor";

/// Load environment variables from .env files
pub fn load_dotenv() -> Result<()> {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded .env from current directory: {}", path.display());
        loaded_from.push(path.display().to_string());
    }

    if let Some(dir) = config_dir() {
        let env_file = dir.join(".env");
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(()) => loaded_from.push(env_file.display().to_string()),
                Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
            }
        }
    }

    if loaded_from.is_empty() {
        debug!("No .env files found");
    } else {
        info!("Loaded environment from: {}", loaded_from.join(", "));
    }

    Ok(())
}

/// Get the heapharbor config directory path (~/.heapharbor)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".heapharbor"))
}

/// Default config file location (~/.heapharbor/config.toml)
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarborConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub unit_of_work: UnitOfWorkConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Bounds applied to every transaction the core opens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOfWorkConfig {
    /// Wall-clock budget for a whole operation, retries included
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Per-statement limit enforced by PostgreSQL
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,

    /// Limit on waiting for row or advisory locks
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Attempts for serialization failures and deadlocks
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for UnitOfWorkConfig {
    fn default() -> Self {
        Self {
            deadline_ms: default_deadline_ms(),
            statement_timeout_ms: default_statement_timeout_ms(),
            lock_timeout_ms: default_lock_timeout_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_deadline_ms() -> u64 {
    5_000
}

fn default_statement_timeout_ms() -> u64 {
    2_000
}

fn default_lock_timeout_ms() -> u64 {
    1_000
}

fn default_max_attempts() -> u32 {
    3
}

impl UnitOfWorkConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

impl HarborConfig {
    /// Load from the default path, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(raw) = std::env::var("HEAPHARBOR_MAX_CONNECTIONS") {
            self.database.max_connections = raw
                .parse()
                .with_context(|| format!("HEAPHARBOR_MAX_CONNECTIONS is not a number: {raw}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            bail!("database.url cannot be empty");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }
        let uow = &self.unit_of_work;
        if uow.max_attempts == 0 {
            bail!("unit_of_work.max_attempts must be at least 1");
        }
        if uow.deadline_ms == 0 || uow.statement_timeout_ms == 0 || uow.lock_timeout_ms == 0 {
            bail!("unit_of_work timeouts must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = HarborConfig::default();
        config.validate().unwrap();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.unit_of_work.deadline(), Duration::from_secs(5));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: HarborConfig = toml::from_str(
            r#"
            [unit_of_work]
            deadline_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.unit_of_work.deadline_ms, 250);
        assert_eq!(config.unit_of_work.max_attempts, 3);
        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[database]\nurl = \"postgres://db/forum\"\nmax_connections = 12"
        )
        .unwrap();

        let config = HarborConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database.url, "postgres://db/forum");
        assert_eq!(config.database.max_connections, 12);
    }

    #[test]
    fn rejects_zero_attempts() {
        let mut config = HarborConfig::default();
        config.unit_of_work.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_pool() {
        let mut config = HarborConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }
}
