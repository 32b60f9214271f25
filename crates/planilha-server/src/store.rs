use std::sync::Arc;

use chrono::{DateTime, Utc};
use planilha_core::{Cell, CellCoord, CellWrite, GridDimensions, Tenant, TypeTag};
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::config::StoreOptions;
use crate::db::models::{index, ChangeRecord, TenantStats};
use crate::db::{cells, grid_config, history, Database};
use crate::error::AppResult;
use crate::locks::TenantLocks;

/// What a single cell write replaced, and how the new value was stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutOutcome {
    pub previous: Option<String>,
    #[serde(rename = "type")]
    pub kind: TypeTag,
}

/// The grid store: cells, their change log and per-tenant dimensions.
///
/// Cheap to clone; every clone shares the pool and the tenant locks.
#[derive(Clone)]
pub struct GridStore {
    db: Database,
    locks: Arc<TenantLocks>,
    options: StoreOptions,
}

impl GridStore {
    pub fn new(db: Database, options: StoreOptions) -> Self {
        Self {
            db,
            locks: Arc::new(TenantLocks::new()),
            options,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub(crate) fn locks(&self) -> &TenantLocks {
        &self.locks
    }

    /// Classify and write one cell, returning the value it replaced and the
    /// type tag that was persisted.
    ///
    /// The upsert and its change record commit together.
    pub async fn put_cell(
        &self,
        tenant: Tenant,
        row: i64,
        col: i64,
        value: &str,
    ) -> AppResult<PutOutcome> {
        let write = CellWrite::new(CellCoord::try_new(row, col)?, value);

        let _guard = self.locks.write(tenant).await;
        let mut write_tx = self.db.begin_write().await?;
        let tx = &mut write_tx.tx;

        let previous = cells::fetch_value(tx, tenant, write.coord).await?;
        self.write_logged(tx, tenant, &write, previous.as_deref(), Utc::now())
            .await?;

        write_tx.tx.commit().await?;

        tracing::debug!(%tenant, coord = %write.coord, kind = %write.kind, "cell written");
        Ok(PutOutcome {
            previous,
            kind: write.kind,
        })
    }

    /// Upsert plus change record, on whatever connection the caller holds
    pub(crate) async fn write_logged(
        &self,
        conn: &mut SqliteConnection,
        tenant: Tenant,
        write: &CellWrite,
        previous: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        cells::upsert_cell(conn, tenant, write, now).await?;

        let unchanged = previous == Some(write.value.as_str());
        if self.options.log_unchanged_writes || !unchanged {
            history::append(
                conn,
                tenant,
                write.coord,
                previous.unwrap_or(""),
                &write.value,
                now,
            )
            .await?;
        }

        Ok(())
    }

    pub async fn get_cell(&self, tenant: Tenant, row: i64, col: i64) -> AppResult<Option<Cell>> {
        let coord = CellCoord::try_new(row, col)?;

        let _guard = self.locks.read(tenant).await;
        let mut conn = self.db.pool().acquire().await?;
        cells::fetch_cell(&mut conn, tenant, coord).await
    }

    /// Cells of a tenant in row-major order; `filter` keeps only values
    /// containing it (case-sensitive)
    pub async fn list_cells(&self, tenant: Tenant, filter: Option<&str>) -> AppResult<Vec<Cell>> {
        let _guard = self.locks.read(tenant).await;
        let mut conn = self.db.pool().acquire().await?;
        let mut found = cells::fetch_cells(&mut conn, tenant, filter).await?;
        found.sort_by_key(Cell::coord);
        Ok(found)
    }

    /// Delete every cell of a tenant; history and dimensions are kept
    pub async fn clear_tenant(&self, tenant: Tenant) -> AppResult<u64> {
        let _guard = self.locks.write(tenant).await;
        let _slot = self.db.write_slot().await;
        let mut conn = self.db.pool().acquire().await?;
        let removed = cells::delete_tenant_cells(&mut conn, tenant).await?;

        tracing::info!(%tenant, removed, "tenant cleared");
        Ok(removed)
    }

    /// Tenant-wide wipe: cells, change log and configured dimensions
    pub async fn purge_tenant(&self, tenant: Tenant) -> AppResult<()> {
        let _guard = self.locks.write(tenant).await;
        let mut write_tx = self.db.begin_write().await?;
        let tx = &mut write_tx.tx;

        let removed_cells = cells::delete_tenant_cells(tx, tenant).await?;
        let removed_history = history::delete_tenant(tx, tenant).await?;
        grid_config::delete(tx, tenant).await?;

        write_tx.tx.commit().await?;

        tracing::info!(%tenant, removed_cells, removed_history, "tenant purged");
        Ok(())
    }

    pub async fn get_config(&self, tenant: Tenant) -> AppResult<GridDimensions> {
        let mut conn = self.db.pool().acquire().await?;
        grid_config::fetch(&mut conn, tenant).await
    }

    /// Overwrite a tenant's dimensions. Anything up to a full worksheet is
    /// accepted; the HTTP layer applies the tighter interactive limits.
    pub async fn set_config(&self, tenant: Tenant, rows: i64, cols: i64) -> AppResult<GridDimensions> {
        let dimensions = GridDimensions::try_new(rows, cols)?;

        let _guard = self.locks.write(tenant).await;
        let _slot = self.db.write_slot().await;
        let mut conn = self.db.pool().acquire().await?;
        grid_config::upsert(&mut conn, tenant, dimensions).await?;

        Ok(dimensions)
    }

    /// Newest change records first; `None` uses the configured limit
    pub async fn recent_history(
        &self,
        tenant: Tenant,
        limit: Option<u32>,
    ) -> AppResult<Vec<ChangeRecord>> {
        let limit = limit.unwrap_or(self.options.history_limit);
        let mut conn = self.db.pool().acquire().await?;
        history::recent(&mut conn, tenant, limit).await
    }

    /// Total number of change records kept for a tenant
    pub async fn history_len(&self, tenant: Tenant) -> AppResult<u64> {
        let mut conn = self.db.pool().acquire().await?;
        history::count(&mut conn, tenant).await
    }

    pub async fn tenant_stats(&self, tenant: Tenant) -> AppResult<TenantStats> {
        let _guard = self.locks.read(tenant).await;
        let mut conn = self.db.pool().acquire().await?;
        let stats = cells::fetch_stats(&mut conn, tenant).await?;

        Ok(TenantStats {
            tenant,
            rows: stats.row_total.max(0) as u64,
            first_row: stats.first_row.map(|r| index(r, "row")).transpose()?,
            last_row: stats.last_row.map(|r| index(r, "row")).transpose()?,
            cells: stats.cell_total.max(0) as u64,
            filled_cells: stats.filled_cells.max(0) as u64,
        })
    }
}
