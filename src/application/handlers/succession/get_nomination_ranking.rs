//! GetNominationRankingHandler - Orders a position's nominations by consensus
//! score, used to decide whom to approach first.

use std::sync::Arc;

use crate::domain::foundation::PositionId;
use crate::domain::succession::{
    rank_nominations, NominationScore, PartialScoringPolicy, RankedNomination, SuccessionError,
    WeightedScoreCalculator,
};
use crate::ports::{EvaluationRepository, NominationRepository, PositionRepository};

use super::support::{from_store, load_position};

#[derive(Debug, Clone)]
pub struct GetNominationRankingQuery {
    pub position_id: PositionId,
}

/// Ranking plus the per-evaluator breakdown behind each consensus.
#[derive(Debug, Clone)]
pub struct NominationRanking {
    pub position_id: PositionId,
    pub policy: PartialScoringPolicy,
    pub ranked: Vec<RankedNomination>,
    pub scores: Vec<NominationScore>,
}

pub struct GetNominationRankingHandler {
    positions: Arc<dyn PositionRepository>,
    nominations: Arc<dyn NominationRepository>,
    evaluations: Arc<dyn EvaluationRepository>,
    policy: PartialScoringPolicy,
}

impl GetNominationRankingHandler {
    pub fn new(
        positions: Arc<dyn PositionRepository>,
        nominations: Arc<dyn NominationRepository>,
        evaluations: Arc<dyn EvaluationRepository>,
        policy: PartialScoringPolicy,
    ) -> Self {
        Self {
            positions,
            nominations,
            evaluations,
            policy,
        }
    }

    pub async fn handle(
        &self,
        query: GetNominationRankingQuery,
    ) -> Result<NominationRanking, SuccessionError> {
        let position = load_position(self.positions.as_ref(), &query.position_id).await?;
        let criteria = self
            .positions
            .criteria_for_position(&position.id)
            .await
            .map_err(from_store)?;
        let nominations = self
            .nominations
            .list_by_position(&position.id)
            .await
            .map_err(from_store)?;

        let mut scored = Vec::with_capacity(nominations.len());
        for nomination in nominations.into_iter().filter(|n| n.is_active()) {
            let rows = self
                .evaluations
                .scores_for_nomination(&nomination.id)
                .await
                .map_err(from_store)?;
            let score =
                WeightedScoreCalculator::score_nomination(nomination.id, &criteria, &rows, self.policy);
            scored.push((nomination, score));
        }

        let scores = scored.iter().map(|(_, s)| s.clone()).collect();
        Ok(NominationRanking {
            position_id: position.id,
            policy: self.policy,
            ranked: rank_nominations(scored),
            scores,
        })
    }
}
