//! PostgreSQL implementation of NominationRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool};

use crate::domain::foundation::{CycleId, DomainError, ErrorCode, NominationId, PositionId};
use crate::domain::succession::{Nomination, PhaseGate, StatusHistoryEntry};
use crate::ports::NominationRepository;

use super::support::{
    append_history, begin, column, commit, db_error, explain_missed_update, lock_phase, parsed,
    timestamp, user_id, write_error, ConstraintRule,
};

const NOMINATION_CONSTRAINTS: &[ConstraintRule] = &[(
    "succession_nominations_one_active_per_nominee",
    ErrorCode::Conflict,
    "Nominee already has an active nomination for this position",
)];

const SELECT_NOMINATION: &str = r#"
    SELECT id, cycle_id, position_id, nominee_id, nominator_id, status, reason,
           created_at, updated_at
    FROM succession_nominations
"#;

#[derive(Clone)]
pub struct PostgresNominationRepository {
    pool: PgPool,
}

impl PostgresNominationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NominationRepository for PostgresNominationRepository {
    async fn create(
        &self,
        gate: &PhaseGate,
        nomination: &Nomination,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_phase(&mut tx, gate).await?;

        sqlx::query(
            r#"
            INSERT INTO succession_nominations (
                id, cycle_id, position_id, nominee_id, nominator_id, status, reason,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(nomination.id.as_uuid())
        .bind(nomination.cycle_id.as_uuid())
        .bind(nomination.position_id.as_uuid())
        .bind(nomination.nominee_id.as_str())
        .bind(nomination.nominator_id.as_str())
        .bind(nomination.status.as_str())
        .bind(nomination.reason.as_deref())
        .bind(nomination.created_at.as_datetime())
        .bind(nomination.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(write_error("Failed to insert nomination", NOMINATION_CONSTRAINTS))?;

        append_history(&mut tx, entry).await?;
        commit(tx).await
    }

    async fn update_status(
        &self,
        gate: &PhaseGate,
        nomination: &Nomination,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_phase(&mut tx, gate).await?;
        update_nomination_status(&mut tx, nomination, entry).await?;
        commit(tx).await
    }

    async fn find_by_id(&self, id: &NominationId) -> Result<Option<Nomination>, DomainError> {
        let sql = format!("{} WHERE id = $1", SELECT_NOMINATION);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch nomination"))?;

        row.as_ref().map(row_to_nomination).transpose()
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Nomination>, DomainError> {
        let sql = format!("{} WHERE cycle_id = $1 ORDER BY created_at, id", SELECT_NOMINATION);
        let rows = sqlx::query(&sql)
            .bind(cycle_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch nominations by cycle"))?;

        rows.iter().map(row_to_nomination).collect()
    }

    async fn list_by_position(
        &self,
        position_id: &PositionId,
    ) -> Result<Vec<Nomination>, DomainError> {
        let sql = format!("{} WHERE position_id = $1 ORDER BY created_at, id", SELECT_NOMINATION);
        let rows = sqlx::query(&sql)
            .bind(position_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch nominations by position"))?;

        rows.iter().map(row_to_nomination).collect()
    }
}

/// Guarded status update plus history row, on an open transaction.
async fn update_nomination_status(
    conn: &mut PgConnection,
    nomination: &Nomination,
    entry: &StatusHistoryEntry,
) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE succession_nominations SET
            status = $2,
            updated_at = $3
        WHERE id = $1
          AND ($4::text IS NULL OR status = $4)
        "#,
    )
    .bind(nomination.id.as_uuid())
    .bind(nomination.status.as_str())
    .bind(nomination.updated_at.as_datetime())
    .bind(entry.from_status.as_deref())
    .execute(&mut *conn)
    .await
    .map_err(write_error("Failed to update nomination", NOMINATION_CONSTRAINTS))?;

    if result.rows_affected() == 0 {
        return Err(explain_missed_update(
            conn,
            "succession_nominations",
            nomination.id.as_uuid(),
            ErrorCode::NominationNotFound,
        )
        .await);
    }

    append_history(conn, entry).await
}

fn row_to_nomination(row: &PgRow) -> Result<Nomination, DomainError> {
    Ok(Nomination {
        id: NominationId::from_uuid(column(row, "id")?),
        cycle_id: CycleId::from_uuid(column(row, "cycle_id")?),
        position_id: PositionId::from_uuid(column(row, "position_id")?),
        nominee_id: user_id(row, "nominee_id")?,
        nominator_id: user_id(row, "nominator_id")?,
        status: parsed(row, "status")?,
        reason: column(row, "reason")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
