//! Configuration for the ledger's store connection
//!
//! Values are read from the environment, after loading an optional `.env`
//! file with `dotenvy`.

use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::error::{LedgerError, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite://food_wastage_system.db";
const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub connection_timeout: Duration,
    /// Create the database file when it does not exist yet
    pub create_if_missing: bool,
    /// Let `run_ad_hoc` execute statements that are not pure reads
    pub allow_mutating_ad_hoc: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            connection_timeout: Duration::from_secs(30),
            create_if_missing: false,
            allow_mutating_ad_hoc: false,
        }
    }
}

impl DatabaseConfig {
    /// Build a configuration from `DATABASE_URL`, `DATABASE_CONNECT_TIMEOUT_SECS`,
    /// `DATABASE_CREATE_IF_MISSING` and `LEDGER_ALLOW_MUTATING_AD_HOC`.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DatabaseConfig::from_env`] but reads from an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);
        let connection_timeout = match lookup("DATABASE_CONNECT_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_var("DATABASE_CONNECT_TIMEOUT_SECS", &raw)?),
            None => defaults.connection_timeout,
        };
        let create_if_missing = match lookup("DATABASE_CREATE_IF_MISSING") {
            Some(raw) => parse_flag("DATABASE_CREATE_IF_MISSING", &raw)?,
            None => defaults.create_if_missing,
        };
        let allow_mutating_ad_hoc = match lookup("LEDGER_ALLOW_MUTATING_AD_HOC") {
            Some(raw) => parse_flag("LEDGER_ALLOW_MUTATING_AD_HOC", &raw)?,
            None => defaults.allow_mutating_ad_hoc,
        };

        Ok(Self {
            database_url,
            connection_timeout,
            create_if_missing,
            allow_mutating_ad_hoc,
        })
    }

    /// Private in-memory store, used by tests and demos
    pub fn in_memory() -> Self {
        Self {
            database_url: IN_MEMORY_URL.to_string(),
            ..Self::default()
        }
    }

    pub fn with_mutating_ad_hoc(mut self, allow: bool) -> Self {
        self.allow_mutating_ad_hoc = allow;
        self
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| LedgerError::Config(format!("{key} has invalid value '{raw}'")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(LedgerError::Config(format!(
            "{key} has invalid value '{raw}'"
        ))),
    }
}
