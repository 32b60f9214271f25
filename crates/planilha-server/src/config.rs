use std::env;
use std::str::FromStr;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// SQLite connection URL
    pub database_url: String,
    /// Upper bound for the connection pool
    pub max_connections: u32,
    /// Largest accepted import body, in bytes
    pub max_upload_bytes: usize,
    /// Store behaviour knobs
    pub store: StoreOptions,
}

/// Behaviour knobs handed to the grid store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Default number of change records returned by a history query
    pub history_limit: u32,
    /// Append a change record even when a write leaves the value unchanged
    pub log_unchanged_writes: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            history_limit: 100,
            log_unchanged_writes: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("PORT", 3000)?;
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://planilha.db".to_string());
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5)?;
        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", 16 * 1024 * 1024)?;

        let defaults = StoreOptions::default();
        let store = StoreOptions {
            history_limit: parse_var("HISTORY_LIMIT", defaults.history_limit)?,
            log_unchanged_writes: parse_var("LOG_UNCHANGED_WRITES", defaults.log_unchanged_writes)?,
        };

        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
            max_upload_bytes,
            store,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {name}={raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}
