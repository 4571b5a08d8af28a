//! PostgreSQL implementation of CycleRepository.
//!
//! The one-active-cycle-per-scope rule is backed by the partial unique index
//! `succession_cycles_one_active_per_scope`.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{CycleId, DomainError, ErrorCode};
use crate::domain::succession::{Cycle, StatusHistoryEntry};
use crate::ports::CycleRepository;

use super::support::{
    append_history, begin, column, commit, db_error, explain_missed_update, parsed, timestamp,
    write_error, ConstraintRule,
};

const CYCLE_CONSTRAINTS: &[ConstraintRule] = &[(
    "succession_cycles_one_active_per_scope",
    ErrorCode::ActiveCycleExists,
    "Scope already has an active succession cycle",
)];

const SELECT_CYCLE: &str = r#"
    SELECT id, scope, name, year, phase, description, created_at, updated_at
    FROM succession_cycles
"#;

/// PostgreSQL implementation of CycleRepository.
#[derive(Clone)]
pub struct PostgresCycleRepository {
    pool: PgPool,
}

impl PostgresCycleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CycleRepository for PostgresCycleRepository {
    async fn create(&self, cycle: &Cycle, entry: &StatusHistoryEntry) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;

        sqlx::query(
            r#"
            INSERT INTO succession_cycles (
                id, scope, name, year, phase, description, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(cycle.id.as_uuid())
        .bind(&cycle.scope)
        .bind(&cycle.name)
        .bind(cycle.year)
        .bind(cycle.phase.as_str())
        .bind(cycle.description.as_deref())
        .bind(cycle.created_at.as_datetime())
        .bind(cycle.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(write_error("Failed to insert cycle", CYCLE_CONSTRAINTS))?;

        append_history(&mut tx, entry).await?;
        commit(tx).await
    }

    async fn update_phase(
        &self,
        cycle: &Cycle,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;

        let result = sqlx::query(
            r#"
            UPDATE succession_cycles SET
                phase = $2,
                updated_at = $3
            WHERE id = $1
              AND ($4::text IS NULL OR phase = $4)
            "#,
        )
        .bind(cycle.id.as_uuid())
        .bind(cycle.phase.as_str())
        .bind(cycle.updated_at.as_datetime())
        .bind(entry.from_status.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(write_error("Failed to update cycle phase", CYCLE_CONSTRAINTS))?;

        if result.rows_affected() == 0 {
            return Err(explain_missed_update(
                &mut tx,
                "succession_cycles",
                cycle.id.as_uuid(),
                ErrorCode::CycleNotFound,
            )
            .await);
        }

        append_history(&mut tx, entry).await?;
        commit(tx).await
    }

    async fn find_by_id(&self, id: &CycleId) -> Result<Option<Cycle>, DomainError> {
        let sql = format!("{} WHERE id = $1", SELECT_CYCLE);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch cycle"))?;

        row.as_ref().map(row_to_cycle).transpose()
    }

    async fn find_active(&self, scope: &str) -> Result<Option<Cycle>, DomainError> {
        let sql = format!(
            "{} WHERE scope = $1 AND phase NOT IN ('completed', 'cancelled')",
            SELECT_CYCLE
        );
        let row = sqlx::query(&sql)
            .bind(scope)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch active cycle"))?;

        row.as_ref().map(row_to_cycle).transpose()
    }
}

fn row_to_cycle(row: &PgRow) -> Result<Cycle, DomainError> {
    Ok(Cycle {
        id: CycleId::from_uuid(column(row, "id")?),
        scope: column(row, "scope")?,
        name: column(row, "name")?,
        year: column(row, "year")?,
        phase: parsed(row, "phase")?,
        description: column(row, "description")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
