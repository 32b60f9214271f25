//! Offline maintenance over a tenant's row structure.
//!
//! Every operation snapshots the tenant, plans in memory, then applies one
//! row at a time under the tenant's write lock. Each row is its own write
//! transaction, so the writer slot is held only for that row. A row is the
//! unit of both cancellation and failure: a failed removal is recorded and
//! the run moves on, a failed move ends the renumbering. None of these
//! operations append to the change log.

use planilha_core::{RowView, SparseGrid, Tenant};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::db::cells;
use crate::error::{AppError, AppResult};
use crate::store::GridStore;

/// A unit of work that could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// `None` when the tenant could not be processed at all
    pub row: Option<u32>,
    pub error: String,
}

/// Accumulated result of a maintenance run over one tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    pub tenant: Tenant,
    pub rows_examined: usize,
    pub rows_removed: usize,
    pub cells_removed: u64,
    pub rows_moved: usize,
    pub failures: Vec<RowFailure>,
    pub cancelled: bool,
}

impl MaintenanceReport {
    fn new(tenant: Tenant) -> Self {
        Self {
            tenant,
            rows_examined: 0,
            rows_removed: 0,
            cells_removed: 0,
            rows_moved: 0,
            failures: Vec::new(),
            cancelled: false,
        }
    }

    /// No failures and not cancelled
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    fn absorb(&mut self, other: MaintenanceReport) {
        self.rows_examined = self.rows_examined.max(other.rows_examined);
        self.rows_removed += other.rows_removed;
        self.cells_removed += other.cells_removed;
        self.rows_moved += other.rows_moved;
        self.failures.extend(other.failures);
        self.cancelled |= other.cancelled;
    }
}

impl GridStore {
    /// Remove every row whose stored cells are all blank after trimming
    pub async fn prune_empty_rows(
        &self,
        tenant: Tenant,
        cancel: &CancellationToken,
    ) -> AppResult<MaintenanceReport> {
        self.remove_planned_rows(tenant, cancel, "prune", |grid| grid.blank_rows())
            .await
    }

    /// Remove every row for which `predicate` holds
    pub async fn remove_rows_matching<F>(
        &self,
        tenant: Tenant,
        predicate: F,
        cancel: &CancellationToken,
    ) -> AppResult<MaintenanceReport>
    where
        F: Fn(&RowView<'_>) -> bool,
    {
        self.remove_planned_rows(tenant, cancel, "remove-matching", |grid| {
            grid.rows_matching(&predicate)
        })
        .await
    }

    /// Remove an explicit list of 0-based row indices; absent rows are no-ops
    pub async fn remove_row_indices(
        &self,
        tenant: Tenant,
        rows: &[u32],
        cancel: &CancellationToken,
    ) -> AppResult<MaintenanceReport> {
        self.remove_planned_rows(tenant, cancel, "remove-rows", |grid| {
            grid.row_indices().filter(|r| rows.contains(r)).collect()
        })
        .await
    }

    /// Compact the occupied rows onto `0..k`, keeping their relative order.
    /// Cells move with their row; nothing is logged. The first failed move
    /// ends the run, leaving the remaining rows where they were.
    pub async fn renumber_rows(
        &self,
        tenant: Tenant,
        cancel: &CancellationToken,
    ) -> AppResult<MaintenanceReport> {
        let _guard = self.locks().write(tenant).await;
        let grid = self.snapshot(tenant).await?;
        let plan = grid.renumber_plan();

        let mut report = MaintenanceReport::new(tenant);
        report.rows_examined = grid.row_indices().count();

        for (from, to) in plan {
            if cancel.is_cancelled() {
                report.cancelled = true;
                tracing::warn!(%tenant, moved = report.rows_moved, "renumber cancelled");
                break;
            }
            let moved = async {
                let mut write = self.database().begin_write().await?;
                let moved = cells::move_row(&mut write.tx, tenant, from, to).await?;
                write.tx.commit().await?;
                Ok::<_, AppError>(moved)
            }
            .await;
            match moved {
                Ok(moved) => {
                    report.rows_moved += 1;
                    tracing::debug!(%tenant, from, to, cells = moved, "row renumbered");
                }
                // Later targets assume every earlier row already moved.
                Err(err) => {
                    tracing::warn!(%tenant, from, to, "renumber stopped: {}", err);
                    report.failures.push(RowFailure {
                        row: Some(from),
                        error: err.to_string(),
                    });
                    break;
                }
            }
        }

        tracing::info!(
            %tenant,
            rows = report.rows_examined,
            moved = report.rows_moved,
            failures = report.failures.len(),
            "renumber finished"
        );
        Ok(report)
    }

    /// Prune then renumber every tenant in registry order.
    ///
    /// Best-effort: a tenant that fails is reported and the next one runs.
    /// Cancellation stops the current tenant at a row boundary and skips the
    /// tenants after it.
    pub async fn tidy_all(&self, cancel: &CancellationToken) -> Vec<MaintenanceReport> {
        let mut reports = Vec::new();
        for tenant in Tenant::all() {
            if cancel.is_cancelled() {
                break;
            }

            let mut report = MaintenanceReport::new(tenant);
            match self.prune_empty_rows(tenant, cancel).await {
                Ok(pruned) => report.absorb(pruned),
                Err(err) => report.failures.push(RowFailure {
                    row: None,
                    error: err.to_string(),
                }),
            }
            if !report.cancelled {
                match self.renumber_rows(tenant, cancel).await {
                    Ok(renumbered) => report.absorb(renumbered),
                    Err(err) => report.failures.push(RowFailure {
                        row: None,
                        error: err.to_string(),
                    }),
                }
            }

            if !report.is_clean() {
                tracing::warn!(%tenant, failures = report.failures.len(), "tenant tidied with problems");
            }
            reports.push(report);
        }
        reports
    }

    async fn remove_planned_rows<P>(
        &self,
        tenant: Tenant,
        cancel: &CancellationToken,
        operation: &'static str,
        plan: P,
    ) -> AppResult<MaintenanceReport>
    where
        P: FnOnce(&SparseGrid) -> Vec<u32>,
    {
        let _guard = self.locks().write(tenant).await;
        let grid = self.snapshot(tenant).await?;
        let doomed = plan(&grid);

        let mut report = MaintenanceReport::new(tenant);
        report.rows_examined = grid.row_indices().count();
        tracing::info!(
            %tenant,
            operation,
            rows = doomed.len(),
            cells = grid.cell_count(),
            "removing rows"
        );

        for row in doomed {
            if cancel.is_cancelled() {
                report.cancelled = true;
                tracing::warn!(%tenant, operation, removed = report.rows_removed, "cancelled");
                break;
            }
            let removed = async {
                let mut write = self.database().begin_write().await?;
                let removed = cells::delete_row(&mut write.tx, tenant, row).await?;
                write.tx.commit().await?;
                Ok::<_, AppError>(removed)
            }
            .await;
            match removed {
                Ok(removed) => {
                    report.rows_removed += 1;
                    report.cells_removed += removed;
                    tracing::debug!(%tenant, operation, row, cells = removed, "row removed");
                }
                Err(err) => {
                    tracing::warn!(%tenant, operation, row, "row removal failed: {}", err);
                    report.failures.push(RowFailure {
                        row: Some(row),
                        error: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            %tenant,
            operation,
            removed = report.rows_removed,
            cells = report.cells_removed,
            failures = report.failures.len(),
            "row removal finished"
        );
        Ok(report)
    }

    /// Read the tenant into memory. The pooled connection goes back before
    /// any row is written.
    async fn snapshot(&self, tenant: Tenant) -> AppResult<SparseGrid> {
        let mut conn = self.database().pool().acquire().await?;
        let stored = cells::fetch_cells(&mut conn, tenant, None).await?;
        Ok(SparseGrid::from_cells(&stored))
    }
}
