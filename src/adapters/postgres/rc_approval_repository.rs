//! PostgreSQL implementation of RcApprovalRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{CycleId, DomainError, ErrorCode, NominationId, RcApprovalId};
use crate::domain::succession::{PhaseGate, RcApproval};
use crate::ports::RcApprovalRepository;

use super::support::{
    begin, column, commit, db_error, lock_active_nomination, lock_phase, timestamp, user_id,
    write_error, ConstraintRule,
};

const APPROVAL_CONSTRAINTS: &[ConstraintRule] = &[(
    "succession_rc_approvals_nomination_key",
    ErrorCode::Conflict,
    "Nomination already has an RC approval",
)];

const SELECT_APPROVAL: &str = r#"
    SELECT id, cycle_id, nomination_id, approved_by, notes, approved_at
    FROM succession_rc_approvals
"#;

#[derive(Clone)]
pub struct PostgresRcApprovalRepository {
    pool: PgPool,
}

impl PostgresRcApprovalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RcApprovalRepository for PostgresRcApprovalRepository {
    async fn create(&self, gate: &PhaseGate, approval: &RcApproval) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_phase(&mut tx, gate).await?;
        lock_active_nomination(&mut tx, &approval.nomination_id, "rc_approval").await?;

        sqlx::query(
            r#"
            INSERT INTO succession_rc_approvals (
                id, cycle_id, nomination_id, approved_by, notes, approved_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(approval.id.as_uuid())
        .bind(approval.cycle_id.as_uuid())
        .bind(approval.nomination_id.as_uuid())
        .bind(approval.approved_by.as_str())
        .bind(approval.notes.as_deref())
        .bind(approval.approved_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(write_error("Failed to insert RC approval", APPROVAL_CONSTRAINTS))?;

        commit(tx).await
    }

    async fn find_by_nomination(
        &self,
        nomination_id: &NominationId,
    ) -> Result<Option<RcApproval>, DomainError> {
        let sql = format!("{} WHERE nomination_id = $1", SELECT_APPROVAL);
        let row = sqlx::query(&sql)
            .bind(nomination_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch RC approval"))?;

        row.as_ref().map(row_to_approval).transpose()
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<RcApproval>, DomainError> {
        let sql = format!("{} WHERE cycle_id = $1 ORDER BY approved_at, id", SELECT_APPROVAL);
        let rows = sqlx::query(&sql)
            .bind(cycle_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch RC approvals"))?;

        rows.iter().map(row_to_approval).collect()
    }
}

fn row_to_approval(row: &PgRow) -> Result<RcApproval, DomainError> {
    Ok(RcApproval {
        id: RcApprovalId::from_uuid(column(row, "id")?),
        cycle_id: CycleId::from_uuid(column(row, "cycle_id")?),
        nomination_id: NominationId::from_uuid(column(row, "nomination_id")?),
        approved_by: user_id(row, "approved_by")?,
        notes: column(row, "notes")?,
        approved_at: timestamp(row, "approved_at")?,
    })
}
