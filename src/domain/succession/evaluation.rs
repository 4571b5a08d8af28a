//! Per-criterion evaluation score rows.
//!
//! One row per (nomination, evaluator, criterion). Aggregation lives in
//! [`super::scoring`].

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CriterionId, NominationId, ScoreId, Timestamp, UserId};

use super::{Criterion, SuccessionError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationScore {
    pub id: ScoreId,
    pub nomination_id: NominationId,
    pub evaluator_id: UserId,
    pub criterion_id: CriterionId,
    pub raw_score: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EvaluationScore {
    /// Builds a score row after checking it against the criterion's bounds.
    pub fn new(
        nomination_id: NominationId,
        evaluator_id: UserId,
        criterion: &Criterion,
        raw_score: f64,
    ) -> Result<Self, SuccessionError> {
        criterion.validate_raw_score(raw_score)?;

        let now = Timestamp::now();
        Ok(Self {
            id: ScoreId::new(),
            nomination_id,
            evaluator_id,
            criterion_id: criterion.id,
            raw_score,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the raw score of an existing row.
    pub fn update_raw(&mut self, criterion: &Criterion, raw_score: f64) -> Result<(), SuccessionError> {
        if criterion.id != self.criterion_id {
            return Err(SuccessionError::validation(
                "criterion_id",
                "score belongs to a different criterion",
            ));
        }
        criterion.validate_raw_score(raw_score)?;
        self.raw_score = raw_score;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// The uniqueness key enforced by storage.
    pub fn key(&self) -> (NominationId, &UserId, CriterionId) {
        (self.nomination_id, &self.evaluator_id, self.criterion_id)
    }
}
