//! Bulk import: wholesale tabular replace and incremental record upserts.

use chrono::Utc;
use planilha_core::{prepare_tabular, CellCoord, CellWrite, DelimitedRecord, GridDimensions, Tenant};
use serde::Serialize;

use crate::db::{cells, grid_config};
use crate::error::{AppError, AppResult};
use crate::formats;
use crate::store::GridStore;

/// Outcome of replacing one tenant's dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub tenant: Tenant,
    pub dimensions: GridDimensions,
    pub cells_written: usize,
    pub cells_replaced: u64,
}

/// Outcome of an incremental record import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordImportSummary {
    pub tenant: Tenant,
    pub written: usize,
    pub skipped: usize,
}

/// What happened to one sheet of an imported workbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SheetOutcome {
    Imported(ImportSummary),
    Skipped { sheet: String, reason: String },
    Failed { sheet: String, error: String },
}

impl GridStore {
    /// Atomically replace a tenant's dataset with a tabular source.
    ///
    /// The old generation is deleted and the new one written inside a single
    /// transaction, under the tenant's write lock. Readers see either the
    /// complete old grid or the complete new one. Every written cell gets a
    /// change record whose previous value is the old generation's value at
    /// that key. Dimensions become `(rows, widest row)`.
    pub async fn import_tabular<R, S>(&self, tenant: Tenant, rows: &[R]) -> AppResult<ImportSummary>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let generation = prepare_tabular(rows)?;

        let _guard = self.locks().write(tenant).await;
        let mut write_tx = self.database().begin_write().await?;
        let tx = &mut write_tx.tx;

        let previous = cells::fetch_values(tx, tenant).await?;
        let cells_replaced = cells::delete_tenant_cells(tx, tenant).await?;

        let now = Utc::now();
        for write in &generation.writes {
            let prior = previous.get(&write.coord).map(String::as_str);
            self.write_logged(tx, tenant, write, prior, now).await?;
        }
        grid_config::upsert(tx, tenant, generation.dimensions).await?;

        // Dropping the transaction on any error above rolls the whole replace back.
        write_tx.tx.commit().await?;

        tracing::info!(
            %tenant,
            rows = generation.dimensions.rows,
            cols = generation.dimensions.cols,
            cells_replaced,
            "tabular import committed"
        );

        Ok(ImportSummary {
            tenant,
            dimensions: generation.dimensions,
            cells_written: generation.writes.len(),
            cells_replaced,
        })
    }

    /// Upsert `(row, column, value)` records without touching other cells.
    ///
    /// Records lacking a row or column are skipped. A coordinate outside the
    /// worksheet fails the whole batch, which commits as one transaction.
    pub async fn import_delimited(
        &self,
        tenant: Tenant,
        records: &[DelimitedRecord],
    ) -> AppResult<RecordImportSummary> {
        let _guard = self.locks().write(tenant).await;
        let mut write_tx = self.database().begin_write().await?;
        let tx = &mut write_tx.tx;

        let now = Utc::now();
        let mut written = 0;
        let mut skipped = 0;
        for record in records {
            let (Some(row), Some(col)) = (record.row, record.col) else {
                skipped += 1;
                continue;
            };
            let write = CellWrite::new(
                CellCoord::try_new(row, col)?,
                record.value.clone().unwrap_or_default(),
            );
            let previous = cells::fetch_value(tx, tenant, write.coord).await?;
            self.write_logged(tx, tenant, &write, previous.as_deref(), now)
                .await?;
            written += 1;
        }

        write_tx.tx.commit().await?;

        tracing::info!(%tenant, written, skipped, "record import committed");
        Ok(RecordImportSummary {
            tenant,
            written,
            skipped,
        })
    }

    /// Replace a tenant from a headerless CSV body
    pub async fn import_tabular_csv(&self, tenant: Tenant, body: &[u8]) -> AppResult<ImportSummary> {
        let rows = formats::csv::parse_tabular(body)?;
        self.import_tabular(tenant, &rows).await
    }

    /// Upsert records from a CSV body with a `linha,coluna,valor` header
    pub async fn import_records_csv(
        &self,
        tenant: Tenant,
        body: &[u8],
    ) -> AppResult<RecordImportSummary> {
        let records = formats::csv::parse_records(body)?;
        self.import_delimited(tenant, &records).await
    }

    /// Import every sheet of a workbook whose title names a tenant.
    ///
    /// Each tenant is replaced atomically; a failing sheet is reported and the
    /// remaining sheets are still imported.
    pub async fn import_workbook(&self, body: Vec<u8>) -> AppResult<Vec<SheetOutcome>> {
        let sheets = tokio::task::spawn_blocking(move || formats::xlsx::read_workbook(body))
            .await
            .map_err(|e| AppError::Internal(format!("workbook reader panicked: {e}")))??;

        let mut outcomes = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            let Some(tenant) = Tenant::from_sheet_name(&sheet.title) else {
                tracing::warn!(sheet = %sheet.title, "sheet does not name a tenant, skipping");
                outcomes.push(SheetOutcome::Skipped {
                    sheet: sheet.title,
                    reason: "sheet title does not name a tenant".to_string(),
                });
                continue;
            };

            if sheet.rows.is_empty() {
                tracing::warn!(sheet = %sheet.title, %tenant, "sheet is empty, skipping");
                outcomes.push(SheetOutcome::Skipped {
                    sheet: sheet.title,
                    reason: "sheet is empty".to_string(),
                });
                continue;
            }

            match self.import_tabular(tenant, &sheet.rows).await {
                Ok(summary) => outcomes.push(SheetOutcome::Imported(summary)),
                Err(err) => {
                    tracing::error!(sheet = %sheet.title, %tenant, "sheet import failed: {}", err);
                    outcomes.push(SheetOutcome::Failed {
                        sheet: sheet.title,
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(outcomes)
    }
}
