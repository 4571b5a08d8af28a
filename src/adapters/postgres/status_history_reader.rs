//! PostgreSQL implementation of StatusHistoryReader.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, HistoryEntryId};
use crate::domain::succession::{Entity, StatusHistoryEntry};
use crate::ports::StatusHistoryReader;

use super::support::{column, db_error, optional_user_id, parsed, timestamp};

#[derive(Clone)]
pub struct PostgresStatusHistoryReader {
    pool: PgPool,
}

impl PostgresStatusHistoryReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusHistoryReader for PostgresStatusHistoryReader {
    async fn history_for(
        &self,
        entity: Entity,
        entity_id: &Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, entity_kind, entity_id, from_status, to_status, changed_by,
                   changed_at, notes
            FROM succession_status_history
            WHERE entity_kind = $1 AND entity_id = $2
            ORDER BY changed_at, id
            "#,
        )
        .bind(entity.as_str())
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch status history"))?;

        rows.iter().map(row_to_entry).collect()
    }
}

fn row_to_entry(row: &PgRow) -> Result<StatusHistoryEntry, DomainError> {
    Ok(StatusHistoryEntry {
        id: HistoryEntryId::from_uuid(column(row, "id")?),
        entity: parsed(row, "entity_kind")?,
        entity_id: column(row, "entity_id")?,
        from_status: column(row, "from_status")?,
        to_status: column(row, "to_status")?,
        changed_by: optional_user_id(row, "changed_by")?,
        changed_at: timestamp(row, "changed_at")?,
        notes: column(row, "notes")?,
    })
}
