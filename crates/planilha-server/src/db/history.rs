use chrono::{DateTime, Utc};
use planilha_core::{CellCoord, Tenant};
use sqlx::SqliteConnection;

use super::models::ChangeRecord;
use crate::error::AppResult;

/// Append one change record
pub async fn append(
    conn: &mut SqliteConnection,
    tenant: Tenant,
    coord: CellCoord,
    previous: &str,
    next: &str,
    at: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO change_log (tenant, row_idx, col_idx, previous_value, new_value, recorded_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(tenant.name())
    .bind(i64::from(coord.row))
    .bind(i64::from(coord.col))
    .bind(previous)
    .bind(next)
    .bind(at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Most recent records, newest first. Ids are monotonic so they order
/// writes that share a timestamp.
pub async fn recent(
    conn: &mut SqliteConnection,
    tenant: Tenant,
    limit: u32,
) -> AppResult<Vec<ChangeRecord>> {
    let records = sqlx::query_as::<_, ChangeRecord>(
        r#"
        SELECT id, tenant, row_idx, col_idx, previous_value, new_value, recorded_at
        FROM change_log
        WHERE tenant = ?
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(tenant.name())
    .bind(i64::from(limit))
    .fetch_all(&mut *conn)
    .await?;

    Ok(records)
}

pub async fn count(conn: &mut SqliteConnection, tenant: Tenant) -> AppResult<u64> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM change_log WHERE tenant = ?")
        .bind(tenant.name())
        .fetch_one(&mut *conn)
        .await?;

    Ok(total.max(0) as u64)
}

pub async fn delete_tenant(conn: &mut SqliteConnection, tenant: Tenant) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM change_log WHERE tenant = ?")
        .bind(tenant.name())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
