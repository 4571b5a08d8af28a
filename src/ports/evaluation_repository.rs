//! Evaluation score repository port.
//!
//! Score rows are flat: one per (nomination, evaluator, criterion). The
//! uniqueness of that triple is a storage constraint, so two evaluators
//! racing on the same row resolve to one winner and one `DuplicateScore`.
//!
//! Writes carry the cycle's [`PhaseGate`] and the nomination's liveness is
//! re-read in the same transaction, so a phase change or withdrawal that
//! commits first wins.

use async_trait::async_trait;

use crate::domain::foundation::{CriterionId, DomainError, NominationId, UserId};
use crate::domain::succession::{EvaluationScore, Nomination, PhaseGate, StatusHistoryEntry};

/// Moves a nomination into review as part of a score insert.
///
/// Applied only while the stored nomination is still `submitted`; a
/// concurrent first score that already started the review makes it a no-op.
#[derive(Debug, Clone, Copy)]
pub struct ReviewStart<'a> {
    pub nomination: &'a Nomination,
    pub entry: &'a StatusHistoryEntry,
}

/// Repository port for evaluation scores.
#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    /// Inserts a score row.
    ///
    /// With `review`, the nomination status change and its history entry
    /// are written in the same transaction; either everything is stored or
    /// nothing is.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the cycle left the gate's phases or
    ///   the nomination was withdrawn
    /// - `DuplicateScore` if the triple already has a score
    /// - `DatabaseError` on persistence failure
    async fn insert_score(
        &self,
        gate: &PhaseGate,
        score: &EvaluationScore,
        review: Option<ReviewStart<'_>>,
    ) -> Result<(), DomainError>;

    /// Replaces the raw score of an existing row.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the cycle left the gate's phases or
    ///   the nomination was withdrawn
    /// - `ScoreNotFound` if the row doesn't exist
    async fn update_score(
        &self,
        gate: &PhaseGate,
        score: &EvaluationScore,
    ) -> Result<(), DomainError>;

    async fn find_score(
        &self,
        nomination_id: &NominationId,
        evaluator_id: &UserId,
        criterion_id: &CriterionId,
    ) -> Result<Option<EvaluationScore>, DomainError>;

    /// Every score row of a nomination, across evaluators.
    async fn scores_for_nomination(
        &self,
        nomination_id: &NominationId,
    ) -> Result<Vec<EvaluationScore>, DomainError>;
}
