//! PostgreSQL implementation of ApproachRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{ApproachId, CycleId, DomainError, ErrorCode, PositionId};
use crate::domain::succession::{Approach, PhaseGate, StatusHistoryEntry};
use crate::ports::ApproachRepository;

use super::support::{
    append_history, begin, column, commit, db_error, explain_missed_update, lock_phase,
    optional_user_id, parsed, timestamp, user_id, write_error, ConstraintRule,
};

const APPROACH_CONSTRAINTS: &[ConstraintRule] = &[(
    "succession_approaches_cycle_nominee_position_key",
    ErrorCode::Conflict,
    "Nominee was already approached for this position",
)];

const SELECT_APPROACH: &str = r#"
    SELECT id, cycle_id, nominee_id, position_id, response_status, approached_by,
           approached_at, responded_at, notes
    FROM succession_approaches
"#;

#[derive(Clone)]
pub struct PostgresApproachRepository {
    pool: PgPool,
}

impl PostgresApproachRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApproachRepository for PostgresApproachRepository {
    async fn create(
        &self,
        gate: &PhaseGate,
        approach: &Approach,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_phase(&mut tx, gate).await?;

        sqlx::query(
            r#"
            INSERT INTO succession_approaches (
                id, cycle_id, nominee_id, position_id, response_status, approached_by,
                approached_at, responded_at, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(approach.id.as_uuid())
        .bind(approach.cycle_id.as_uuid())
        .bind(approach.nominee_id.as_str())
        .bind(approach.position_id.as_uuid())
        .bind(approach.response_status.as_str())
        .bind(approach.approached_by.as_ref().map(|u| u.as_str()))
        .bind(approach.approached_at.as_datetime())
        .bind(approach.responded_at.as_ref().map(|t| *t.as_datetime()))
        .bind(approach.notes.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(write_error("Failed to insert approach", APPROACH_CONSTRAINTS))?;

        append_history(&mut tx, entry).await?;
        commit(tx).await
    }

    async fn update_response(
        &self,
        gate: &PhaseGate,
        approach: &Approach,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_phase(&mut tx, gate).await?;

        // responded_at is only ever filled once.
        let result = sqlx::query(
            r#"
            UPDATE succession_approaches SET
                response_status = $2,
                responded_at = COALESCE(responded_at, $3),
                notes = $4
            WHERE id = $1
              AND ($5::text IS NULL OR response_status = $5)
            "#,
        )
        .bind(approach.id.as_uuid())
        .bind(approach.response_status.as_str())
        .bind(approach.responded_at.as_ref().map(|t| *t.as_datetime()))
        .bind(approach.notes.as_deref())
        .bind(entry.from_status.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update approach"))?;

        if result.rows_affected() == 0 {
            return Err(explain_missed_update(
                &mut tx,
                "succession_approaches",
                approach.id.as_uuid(),
                ErrorCode::ApproachNotFound,
            )
            .await);
        }

        append_history(&mut tx, entry).await?;
        commit(tx).await
    }

    async fn find_by_id(&self, id: &ApproachId) -> Result<Option<Approach>, DomainError> {
        let sql = format!("{} WHERE id = $1", SELECT_APPROACH);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch approach"))?;

        row.as_ref().map(row_to_approach).transpose()
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Approach>, DomainError> {
        let sql = format!("{} WHERE cycle_id = $1 ORDER BY approached_at, id", SELECT_APPROACH);
        let rows = sqlx::query(&sql)
            .bind(cycle_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch approaches"))?;

        rows.iter().map(row_to_approach).collect()
    }
}

fn row_to_approach(row: &PgRow) -> Result<Approach, DomainError> {
    let responded_at: Option<chrono::DateTime<chrono::Utc>> = column(row, "responded_at")?;

    Ok(Approach {
        id: ApproachId::from_uuid(column(row, "id")?),
        cycle_id: CycleId::from_uuid(column(row, "cycle_id")?),
        nominee_id: user_id(row, "nominee_id")?,
        position_id: PositionId::from_uuid(column(row, "position_id")?),
        response_status: parsed(row, "response_status")?,
        approached_by: optional_user_id(row, "approached_by")?,
        approached_at: timestamp(row, "approached_at")?,
        responded_at: responded_at.map(crate::domain::foundation::Timestamp::from_datetime),
        notes: column(row, "notes")?,
    })
}
