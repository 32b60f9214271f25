//! Queries against the `cells` table. Every function takes a connection so
//! callers decide whether it runs inside a transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use planilha_core::{Cell, CellCoord, CellWrite, Tenant};
use sqlx::SqliteConnection;

use super::models::{CellRow, StatsRow};
use crate::error::AppResult;

const CELL_COLUMNS: &str = "row_idx, col_idx, value, kind, created_at, modified_at";

pub async fn fetch_cell(
    conn: &mut SqliteConnection,
    tenant: Tenant,
    coord: CellCoord,
) -> AppResult<Option<Cell>> {
    let sql = format!(
        "SELECT {CELL_COLUMNS} FROM cells WHERE tenant = ? AND row_idx = ? AND col_idx = ?"
    );
    let row = sqlx::query_as::<_, CellRow>(&sql)
        .bind(tenant.name())
        .bind(i64::from(coord.row))
        .bind(i64::from(coord.col))
        .fetch_optional(&mut *conn)
        .await?;

    row.map(Cell::try_from).transpose()
}

/// All cells of a tenant, optionally only those whose value contains
/// `filter` (case-sensitive)
pub async fn fetch_cells(
    conn: &mut SqliteConnection,
    tenant: Tenant,
    filter: Option<&str>,
) -> AppResult<Vec<Cell>> {
    let rows = match filter {
        Some(needle) => {
            let sql = format!(
                "SELECT {CELL_COLUMNS} FROM cells WHERE tenant = ? AND instr(value, ?) > 0"
            );
            sqlx::query_as::<_, CellRow>(&sql)
                .bind(tenant.name())
                .bind(needle)
                .fetch_all(&mut *conn)
                .await?
        }
        None => {
            let sql = format!("SELECT {CELL_COLUMNS} FROM cells WHERE tenant = ?");
            sqlx::query_as::<_, CellRow>(&sql)
                .bind(tenant.name())
                .fetch_all(&mut *conn)
                .await?
        }
    };

    rows.into_iter().map(Cell::try_from).collect()
}

/// Current values keyed by coordinate, for diffing a replacement generation
pub async fn fetch_values(
    conn: &mut SqliteConnection,
    tenant: Tenant,
) -> AppResult<HashMap<CellCoord, String>> {
    let rows: Vec<(i64, i64, String)> =
        sqlx::query_as("SELECT row_idx, col_idx, value FROM cells WHERE tenant = ?")
            .bind(tenant.name())
            .fetch_all(&mut *conn)
            .await?;

    rows.into_iter()
        .map(|(row, col, value)| {
            let coord = CellCoord::new(
                super::models::index(row, "row")?,
                super::models::index(col, "column")?,
            );
            Ok((coord, value))
        })
        .collect()
}

pub async fn fetch_value(
    conn: &mut SqliteConnection,
    tenant: Tenant,
    coord: CellCoord,
) -> AppResult<Option<String>> {
    let value: Option<(String,)> = sqlx::query_as(
        "SELECT value FROM cells WHERE tenant = ? AND row_idx = ? AND col_idx = ?",
    )
    .bind(tenant.name())
    .bind(i64::from(coord.row))
    .bind(i64::from(coord.col))
    .fetch_optional(&mut *conn)
    .await?;

    Ok(value.map(|v| v.0))
}

/// Insert or overwrite one cell; `created_at` is only set on first insert
pub async fn upsert_cell(
    conn: &mut SqliteConnection,
    tenant: Tenant,
    write: &CellWrite,
    now: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO cells (tenant, row_idx, col_idx, value, kind, created_at, modified_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (tenant, row_idx, col_idx)
        DO UPDATE SET value = excluded.value, kind = excluded.kind, modified_at = excluded.modified_at
        "#,
    )
    .bind(tenant.name())
    .bind(i64::from(write.coord.row))
    .bind(i64::from(write.coord.col))
    .bind(&write.value)
    .bind(write.kind.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn delete_tenant_cells(conn: &mut SqliteConnection, tenant: Tenant) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM cells WHERE tenant = ?")
        .bind(tenant.name())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete_row(conn: &mut SqliteConnection, tenant: Tenant, row: u32) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM cells WHERE tenant = ? AND row_idx = ?")
        .bind(tenant.name())
        .bind(i64::from(row))
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Move every cell of row `from` to row `to`; the target row must be free
pub async fn move_row(
    conn: &mut SqliteConnection,
    tenant: Tenant,
    from: u32,
    to: u32,
) -> AppResult<u64> {
    let result = sqlx::query("UPDATE cells SET row_idx = ? WHERE tenant = ? AND row_idx = ?")
        .bind(i64::from(to))
        .bind(tenant.name())
        .bind(i64::from(from))
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn fetch_stats(conn: &mut SqliteConnection, tenant: Tenant) -> AppResult<StatsRow> {
    let stats = sqlx::query_as::<_, StatsRow>(
        r#"
        SELECT
            COUNT(DISTINCT row_idx) AS row_total,
            MIN(row_idx) AS first_row,
            MAX(row_idx) AS last_row,
            COUNT(*) AS cell_total,
            COUNT(CASE WHEN TRIM(value) != '' THEN 1 END) AS filled_cells
        FROM cells
        WHERE tenant = ?
        "#,
    )
    .bind(tenant.name())
    .fetch_one(&mut *conn)
    .await?;

    Ok(stats)
}
