//! PostgreSQL implementation of PositionRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{CriterionId, CycleId, DomainError, ErrorCode, PositionId};
use crate::domain::succession::{Criterion, PhaseGate, Position, Weight};
use crate::ports::PositionRepository;

use super::support::{
    begin, column, commit, db_error, lock_phase, narrowed, timestamp, write_error, ConstraintRule,
};

const CRITERION_CONSTRAINTS: &[ConstraintRule] = &[(
    "succession_criteria_position_name_key",
    ErrorCode::Conflict,
    "Position already has a criterion with this name",
)];

#[derive(Clone)]
pub struct PostgresPositionRepository {
    pool: PgPool,
}

impl PostgresPositionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PositionRepository for PostgresPositionRepository {
    async fn save_position(
        &self,
        gate: &PhaseGate,
        position: &Position,
    ) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_phase(&mut tx, gate).await?;

        sqlx::query(
            r#"
            INSERT INTO succession_positions (
                id, cycle_id, title, hierarchy_level, description, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(position.id.as_uuid())
        .bind(position.cycle_id.as_uuid())
        .bind(&position.title)
        .bind(i32::from(position.hierarchy_level))
        .bind(position.description.as_deref())
        .bind(position.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert position"))?;

        commit(tx).await
    }

    async fn find_position(&self, id: &PositionId) -> Result<Option<Position>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, cycle_id, title, hierarchy_level, description, created_at
            FROM succession_positions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch position"))?;

        row.as_ref().map(row_to_position).transpose()
    }

    async fn positions_for_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Position>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, cycle_id, title, hierarchy_level, description, created_at
            FROM succession_positions
            WHERE cycle_id = $1
            ORDER BY hierarchy_level, title
            "#,
        )
        .bind(cycle_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch positions"))?;

        rows.iter().map(row_to_position).collect()
    }

    async fn save_criterion(
        &self,
        gate: &PhaseGate,
        criterion: &Criterion,
    ) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_phase(&mut tx, gate).await?;

        sqlx::query(
            r#"
            INSERT INTO succession_criteria (
                id, position_id, name, weight, max_score, display_order
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(criterion.id.as_uuid())
        .bind(criterion.position_id.as_uuid())
        .bind(&criterion.name)
        .bind(i16::from(criterion.weight.value()))
        .bind(i64::from(criterion.max_score))
        .bind(i64::from(criterion.display_order))
        .execute(&mut *tx)
        .await
        .map_err(write_error("Failed to insert criterion", CRITERION_CONSTRAINTS))?;

        commit(tx).await
    }

    async fn find_criterion(&self, id: &CriterionId) -> Result<Option<Criterion>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, position_id, name, weight, max_score, display_order
            FROM succession_criteria
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch criterion"))?;

        row.as_ref().map(row_to_criterion).transpose()
    }

    async fn criteria_for_position(
        &self,
        position_id: &PositionId,
    ) -> Result<Vec<Criterion>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, position_id, name, weight, max_score, display_order
            FROM succession_criteria
            WHERE position_id = $1
            ORDER BY display_order, name
            "#,
        )
        .bind(position_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch criteria"))?;

        rows.iter().map(row_to_criterion).collect()
    }
}

fn row_to_position(row: &PgRow) -> Result<Position, DomainError> {
    Ok(Position {
        id: PositionId::from_uuid(column(row, "id")?),
        cycle_id: CycleId::from_uuid(column(row, "cycle_id")?),
        title: column(row, "title")?,
        hierarchy_level: narrowed::<i32, u16>(row, "hierarchy_level")?,
        description: column(row, "description")?,
        created_at: timestamp(row, "created_at")?,
    })
}

fn row_to_criterion(row: &PgRow) -> Result<Criterion, DomainError> {
    let weight = narrowed::<i16, u8>(row, "weight")?;
    let weight = Weight::new(weight).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored weight: {}", e))
    })?;

    Ok(Criterion {
        id: CriterionId::from_uuid(column(row, "id")?),
        position_id: PositionId::from_uuid(column(row, "position_id")?),
        name: column(row, "name")?,
        weight,
        max_score: narrowed::<i64, u32>(row, "max_score")?,
        display_order: narrowed::<i64, u32>(row, "display_order")?,
    })
}
