//! PostgreSQL implementation of EvaluationRepository.
//!
//! `succession_evaluation_scores_triple_key` serializes concurrent scores for
//! the same (nomination, evaluator, criterion): the losing insert fails with
//! `DuplicateScore` and is not retried.
//!
//! Scores on different criteria never block each other. The review start
//! riding along with a first score only fires while the nomination is still
//! `submitted`, so racing first scores both commit.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{
    CriterionId, DomainError, ErrorCode, NominationId, ScoreId, UserId,
};
use crate::domain::succession::{EvaluationScore, NominationStatus, PhaseGate};
use crate::ports::{EvaluationRepository, ReviewStart};

use super::support::{
    append_history, begin, column, commit, db_error, lock_active_nomination, lock_phase,
    timestamp, user_id, write_error, ConstraintRule,
};

const SCORE_CONSTRAINTS: &[ConstraintRule] = &[(
    "succession_evaluation_scores_triple_key",
    ErrorCode::DuplicateScore,
    "Evaluator already scored this criterion for this nomination",
)];

const SELECT_SCORE: &str = r#"
    SELECT id, nomination_id, evaluator_id, criterion_id, raw_score, created_at, updated_at
    FROM succession_evaluation_scores
"#;

#[derive(Clone)]
pub struct PostgresEvaluationRepository {
    pool: PgPool,
}

impl PostgresEvaluationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvaluationRepository for PostgresEvaluationRepository {
    async fn insert_score(
        &self,
        gate: &PhaseGate,
        score: &EvaluationScore,
        review: Option<ReviewStart<'_>>,
    ) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_phase(&mut tx, gate).await?;
        let status = lock_active_nomination(&mut tx, &score.nomination_id, "score").await?;

        sqlx::query(
            r#"
            INSERT INTO succession_evaluation_scores (
                id, nomination_id, evaluator_id, criterion_id, raw_score, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(score.id.as_uuid())
        .bind(score.nomination_id.as_uuid())
        .bind(score.evaluator_id.as_str())
        .bind(score.criterion_id.as_uuid())
        .bind(score.raw_score)
        .bind(score.created_at.as_datetime())
        .bind(score.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(write_error("Failed to insert score", SCORE_CONSTRAINTS))?;

        if let Some(review) = review.filter(|_| status == NominationStatus::Submitted) {
            // Zero rows means another first score got there first.
            let started = sqlx::query(
                r#"
                UPDATE succession_nominations SET
                    status = $2,
                    updated_at = $3
                WHERE id = $1
                  AND status = 'submitted'
                "#,
            )
            .bind(review.nomination.id.as_uuid())
            .bind(review.nomination.status.as_str())
            .bind(review.nomination.updated_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to start nomination review"))?;

            if started.rows_affected() == 1 {
                append_history(&mut tx, review.entry).await?;
            }
        }

        commit(tx).await
    }

    async fn update_score(
        &self,
        gate: &PhaseGate,
        score: &EvaluationScore,
    ) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_phase(&mut tx, gate).await?;
        lock_active_nomination(&mut tx, &score.nomination_id, "score").await?;

        let result = sqlx::query(
            r#"
            UPDATE succession_evaluation_scores SET
                raw_score = $2,
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(score.id.as_uuid())
        .bind(score.raw_score)
        .bind(score.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update score"))?;

        if result.rows_affected() == 0 {
            return Err(
                DomainError::new(ErrorCode::ScoreNotFound, format!("Score not found: {}", score.id))
                    .with_detail("id", score.id.to_string()),
            );
        }

        commit(tx).await
    }

    async fn find_score(
        &self,
        nomination_id: &NominationId,
        evaluator_id: &UserId,
        criterion_id: &CriterionId,
    ) -> Result<Option<EvaluationScore>, DomainError> {
        let sql = format!(
            "{} WHERE nomination_id = $1 AND evaluator_id = $2 AND criterion_id = $3",
            SELECT_SCORE
        );
        let row = sqlx::query(&sql)
            .bind(nomination_id.as_uuid())
            .bind(evaluator_id.as_str())
            .bind(criterion_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch score"))?;

        row.as_ref().map(row_to_score).transpose()
    }

    async fn scores_for_nomination(
        &self,
        nomination_id: &NominationId,
    ) -> Result<Vec<EvaluationScore>, DomainError> {
        let sql = format!("{} WHERE nomination_id = $1", SELECT_SCORE);
        let rows = sqlx::query(&sql)
            .bind(nomination_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch scores"))?;

        rows.iter().map(row_to_score).collect()
    }
}

fn row_to_score(row: &PgRow) -> Result<EvaluationScore, DomainError> {
    Ok(EvaluationScore {
        id: ScoreId::from_uuid(column(row, "id")?),
        nomination_id: NominationId::from_uuid(column(row, "nomination_id")?),
        evaluator_id: user_id(row, "evaluator_id")?,
        criterion_id: CriterionId::from_uuid(column(row, "criterion_id")?),
        raw_score: column(row, "raw_score")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
