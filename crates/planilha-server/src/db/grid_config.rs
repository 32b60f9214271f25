use planilha_core::{GridDimensions, Tenant};
use sqlx::SqliteConnection;

use super::models::{index, ConfigRow};
use crate::error::AppResult;

/// Configured dimensions, or the default when the tenant has none
pub async fn fetch(conn: &mut SqliteConnection, tenant: Tenant) -> AppResult<GridDimensions> {
    let row = sqlx::query_as::<_, ConfigRow>(
        "SELECT row_count, col_count FROM grid_config WHERE tenant = ?",
    )
    .bind(tenant.name())
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(GridDimensions::new(
            index(row.row_count, "row count")?,
            index(row.col_count, "column count")?,
        )),
        None => Ok(GridDimensions::default()),
    }
}

pub async fn upsert(
    conn: &mut SqliteConnection,
    tenant: Tenant,
    dimensions: GridDimensions,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO grid_config (tenant, row_count, col_count)
        VALUES (?, ?, ?)
        ON CONFLICT (tenant)
        DO UPDATE SET row_count = excluded.row_count, col_count = excluded.col_count
        "#,
    )
    .bind(tenant.name())
    .bind(i64::from(dimensions.rows))
    .bind(i64::from(dimensions.cols))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, tenant: Tenant) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM grid_config WHERE tenant = ?")
        .bind(tenant.name())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
