//! UpdateEvaluationScoreHandler - Replaces the raw score of an existing row.

use std::sync::Arc;

use crate::domain::foundation::{CriterionId, NominationId, UserId};
use crate::domain::succession::{Entity, EvaluationScore, SuccessionError};
use crate::ports::{CycleRepository, EvaluationRepository, NominationRepository, PositionRepository};

use super::submit_evaluation_score::scoring_context;
use super::support::from_store;

#[derive(Debug, Clone)]
pub struct UpdateEvaluationScoreCommand {
    pub nomination_id: NominationId,
    pub evaluator_id: UserId,
    pub criterion_id: CriterionId,
    pub raw_score: f64,
}

pub struct UpdateEvaluationScoreHandler {
    cycles: Arc<dyn CycleRepository>,
    positions: Arc<dyn PositionRepository>,
    nominations: Arc<dyn NominationRepository>,
    evaluations: Arc<dyn EvaluationRepository>,
}

impl UpdateEvaluationScoreHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        positions: Arc<dyn PositionRepository>,
        nominations: Arc<dyn NominationRepository>,
        evaluations: Arc<dyn EvaluationRepository>,
    ) -> Self {
        Self {
            cycles,
            positions,
            nominations,
            evaluations,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpdateEvaluationScoreCommand,
    ) -> Result<EvaluationScore, SuccessionError> {
        let (nomination, criterion, gate) = scoring_context(
            self.cycles.as_ref(),
            self.positions.as_ref(),
            self.nominations.as_ref(),
            &cmd.nomination_id,
            &cmd.criterion_id,
            "update_evaluation_score",
        )
        .await?;

        let mut score = self
            .evaluations
            .find_score(&nomination.id, &cmd.evaluator_id, &criterion.id)
            .await
            .map_err(from_store)?
            .ok_or_else(|| {
                SuccessionError::not_found(
                    Entity::Score,
                    format!("{}/{}/{}", nomination.id, cmd.evaluator_id, criterion.id),
                )
            })?;

        let previous = score.raw_score;
        score.update_raw(&criterion, cmd.raw_score)?;
        self.evaluations
            .update_score(&gate, &score)
            .await
            .map_err(from_store)?;

        tracing::info!(
            score_id = %score.id,
            nomination_id = %score.nomination_id,
            previous,
            raw_score = score.raw_score,
            "evaluation score updated"
        );
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::succession::testing::{open_gate, user, Fixture};
    use crate::domain::succession::{Criterion, CyclePhase, Nomination};

    async fn scene() -> (Fixture, Nomination, Criterion) {
        let fixture = Fixture::new();
        let mut cycle = fixture.cycle_in(CyclePhase::NominationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;
        let criterion = fixture.criterion(&position, "Leadership", 60, 10).await;
        let nomination = fixture.nomination(&cycle, &position, "nominee-1").await;
        fixture.advance(&mut cycle, CyclePhase::Evaluation).await;
        (fixture, nomination, criterion)
    }

    fn command(nomination: &Nomination, criterion: &Criterion, raw: f64) -> UpdateEvaluationScoreCommand {
        UpdateEvaluationScoreCommand {
            nomination_id: nomination.id,
            evaluator_id: user("evaluator-1"),
            criterion_id: criterion.id,
            raw_score: raw,
        }
    }

    fn handler(fixture: &Fixture) -> UpdateEvaluationScoreHandler {
        UpdateEvaluationScoreHandler::new(
            fixture.cycles(),
            fixture.positions(),
            fixture.nominations(),
            fixture.evaluations(),
        )
    }

    #[tokio::test]
    async fn replaces_existing_raw_score() {
        let (fixture, nomination, criterion) = scene().await;
        let original =
            EvaluationScore::new(nomination.id, user("evaluator-1"), &criterion, 4.0).unwrap();
        fixture
            .store
            .insert_score(&open_gate(nomination.cycle_id), &original, None)
            .await
            .unwrap();

        let updated = handler(&fixture)
            .handle(command(&nomination, &criterion, 9.0))
            .await
            .unwrap();

        assert_eq!(updated.id, original.id);
        let stored = fixture.store.scores_for_nomination(&nomination.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].raw_score, 9.0);
    }

    #[tokio::test]
    async fn missing_row_is_not_found() {
        let (fixture, nomination, criterion) = scene().await;

        let err = handler(&fixture)
            .handle(command(&nomination, &criterion, 9.0))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::NotFound { entity: Entity::Score, .. }));
    }

    #[tokio::test]
    async fn new_value_is_still_bounded() {
        let (fixture, nomination, criterion) = scene().await;
        let original =
            EvaluationScore::new(nomination.id, user("evaluator-1"), &criterion, 4.0).unwrap();
        fixture
            .store
            .insert_score(&open_gate(nomination.cycle_id), &original, None)
            .await
            .unwrap();

        let err = handler(&fixture)
            .handle(command(&nomination, &criterion, -1.0))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::Validation(_)));
    }
}
