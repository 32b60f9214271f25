pub mod cells;
pub mod grid_config;
pub mod history;
pub mod models;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::AppResult;

/// Database connection wrapper.
///
/// Opened once by the caller and handed to [`crate::store::GridStore`];
/// there is no process-wide handle.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

/// A transaction that intends to write, holding the single writer slot
pub(crate) struct WriteTx {
    pub tx: Transaction<'static, Sqlite>,
    _slot: OwnedMutexGuard<()>,
}

impl Database {
    /// Connect to the database, creating the file if needed
    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?;
        Self::connect_with(options, max_connections).await
    }

    /// Connect with explicit SQLite options
    pub async fn connect_with(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> AppResult<Self> {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        Ok(Self {
            pool,
            writer: Arc::new(Mutex::new(())),
        })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Close every pooled connection; the handle is unusable afterwards
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Whether a trivial query succeeds
    pub async fn ping(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("database ping failed: {}", err);
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a transaction that reads and then writes.
    ///
    /// SQLite admits one writer at a time, and a deferred transaction whose
    /// snapshot went stale before its first write fails instead of waiting.
    /// Writers therefore queue for the slot before they begin.
    pub(crate) async fn begin_write(&self) -> AppResult<WriteTx> {
        let slot = self.write_slot().await;
        let tx = self.pool.begin().await?;
        Ok(WriteTx { tx, _slot: slot })
    }

    /// Exclusive right to write, for statements run outside [`Self::begin_write`]
    pub(crate) async fn write_slot(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.writer).lock_owned().await
    }
}
