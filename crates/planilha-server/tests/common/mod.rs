//! Shared setup: a migrated store backed by a throwaway SQLite file.

#![allow(dead_code)]

use planilha_core::Tenant;
use planilha_server::config::StoreOptions;
use planilha_server::db::Database;
use planilha_server::GridStore;
use std::path::PathBuf;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use tempfile::TempDir;

/// Keeps the temporary directory alive for as long as the store is used
pub struct TestStore {
    pub store: GridStore,
    path: PathBuf,
    _dir: TempDir,
}

impl TestStore {
    /// Run raw SQL on a connection of its own, outside the store's pool.
    /// Used to install triggers that make specific writes fail.
    pub async fn execute(&self, sql: &str) {
        let mut conn = SqliteConnection::connect_with(
            &SqliteConnectOptions::new().filename(&self.path),
        )
        .await
        .unwrap();
        sqlx::raw_sql(sql).execute(&mut conn).await.unwrap();
        conn.close().await.unwrap();
    }
}

pub async fn store() -> TestStore {
    store_with(StoreOptions::default()).await
}

pub async fn store_with(options: StoreOptions) -> TestStore {
    store_with_pool(options, 4).await
}

pub async fn store_with_pool(options: StoreOptions, max_connections: u32) -> TestStore {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.db");
    let db = Database::connect_with(SqliteConnectOptions::new().filename(&path), max_connections)
        .await
        .unwrap();
    db.migrate().await.unwrap();

    TestStore {
        store: GridStore::new(db, options),
        path,
        _dir: dir,
    }
}

pub fn tenant(name: &str) -> Tenant {
    Tenant::parse(name).unwrap()
}

pub fn rows(source: &[&[&str]]) -> Vec<Vec<String>> {
    source
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect()
}
