//! Dense and flat views of stored cells for download.

use planilha_core::{CellRecord, SparseGrid, Tenant};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::db::{cells, grid_config};
use crate::error::{AppError, AppResult};
use crate::formats;
use crate::store::GridStore;

/// A tenant's grid as a dense matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantMatrix {
    pub tenant: Tenant,
    pub rows: Vec<Vec<String>>,
}

/// Matrices for every tenant, in registry order.
///
/// `complete` is false when composition was cancelled; `sheets` then holds
/// only the tenants finished before the cancellation, each one whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiTenantExport {
    pub sheets: Vec<TenantMatrix>,
    pub complete: bool,
}

impl GridStore {
    /// Dense matrix sized by the larger of the configured dimensions and the
    /// furthest stored cell; gaps are empty strings
    pub async fn compose_matrix(&self, tenant: Tenant) -> AppResult<Vec<Vec<String>>> {
        let _guard = self.locks().read(tenant).await;
        let mut conn = self.database().pool().acquire().await?;

        let configured = grid_config::fetch(&mut conn, tenant).await?;
        let stored = cells::fetch_cells(&mut conn, tenant, None).await?;

        Ok(SparseGrid::from_cells(&stored).to_dense(configured))
    }

    pub async fn compose_all_matrices(&self) -> AppResult<MultiTenantExport> {
        self.compose_all_matrices_until(&CancellationToken::new()).await
    }

    /// Compose every tenant, checking `cancel` before starting each one
    pub async fn compose_all_matrices_until(
        &self,
        cancel: &CancellationToken,
    ) -> AppResult<MultiTenantExport> {
        let mut sheets = Vec::new();
        for tenant in Tenant::all() {
            if cancel.is_cancelled() {
                tracing::warn!(composed = sheets.len(), "combined export cancelled");
                return Ok(MultiTenantExport {
                    sheets,
                    complete: false,
                });
            }

            tracing::info!(%tenant, "composing tenant matrix");
            let rows = self.compose_matrix(tenant).await?;
            sheets.push(TenantMatrix { tenant, rows });
        }

        Ok(MultiTenantExport {
            sheets,
            complete: true,
        })
    }

    /// Stored cells as `(row, column, value)`, sorted by row then column
    pub async fn compose_delimited(&self, tenant: Tenant) -> AppResult<Vec<CellRecord>> {
        let _guard = self.locks().read(tenant).await;
        let mut conn = self.database().pool().acquire().await?;
        let stored = cells::fetch_cells(&mut conn, tenant, None).await?;

        Ok(SparseGrid::from_cells(&stored).records())
    }

    /// Flat CSV export of one tenant
    pub async fn export_records_csv(&self, tenant: Tenant) -> AppResult<Vec<u8>> {
        let records = self.compose_delimited(tenant).await?;
        formats::csv::write_records(&records)
    }

    /// Combined workbook with one sheet per tenant. A cancelled composition
    /// yields no artifact rather than a workbook missing tenants.
    pub async fn export_workbook(
        &self,
        labelled: bool,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<u8>> {
        let export = self.compose_all_matrices_until(cancel).await?;
        if !export.complete {
            return Err(AppError::Cancelled);
        }

        tokio::task::spawn_blocking(move || formats::xlsx::write_workbook(&export.sheets, labelled))
            .await
            .map_err(|e| AppError::Internal(format!("workbook writer panicked: {e}")))?
    }
}
