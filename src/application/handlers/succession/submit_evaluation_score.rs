//! SubmitEvaluationScoreHandler - Records one evaluator's raw score for one
//! criterion of a nomination.
//!
//! The first score against a `submitted` nomination moves it to
//! `under_review` in the same write as the score row. Two evaluators racing
//! on the first score both land; only one of them records the review start.

use std::sync::Arc;

use crate::domain::foundation::{CriterionId, NominationId, UserId};
use crate::domain::succession::{
    Criterion, Entity, EvaluationScore, Nomination, PhaseGate, SuccessionError,
};
use crate::ports::{
    CycleRepository, EvaluationRepository, NominationRepository, PositionRepository, ReviewStart,
};

use super::support::{from_store, gated_cycle, gates, load_nomination};

#[derive(Debug, Clone)]
pub struct SubmitEvaluationScoreCommand {
    pub nomination_id: NominationId,
    pub evaluator_id: UserId,
    pub criterion_id: CriterionId,
    pub raw_score: f64,
}

pub struct SubmitEvaluationScoreHandler {
    cycles: Arc<dyn CycleRepository>,
    positions: Arc<dyn PositionRepository>,
    nominations: Arc<dyn NominationRepository>,
    evaluations: Arc<dyn EvaluationRepository>,
}

/// Loads the nomination and criterion a score refers to, after checking the
/// cycle is in evaluation and the nomination can still be scored.
pub(super) async fn scoring_context(
    cycles: &dyn CycleRepository,
    positions: &dyn PositionRepository,
    nominations: &dyn NominationRepository,
    nomination_id: &NominationId,
    criterion_id: &CriterionId,
    operation: &'static str,
) -> Result<(Nomination, Criterion, PhaseGate), SuccessionError> {
    let nomination = load_nomination(nominations, nomination_id).await?;
    let (_, gate) = gated_cycle(cycles, &nomination.cycle_id, gates::EVALUATION, operation).await?;
    nomination.ensure_scorable()?;

    let criterion = positions
        .find_criterion(criterion_id)
        .await
        .map_err(from_store)?
        .ok_or_else(|| SuccessionError::not_found(Entity::Criterion, criterion_id))?;
    if criterion.position_id != nomination.position_id {
        return Err(SuccessionError::validation(
            "criterion_id",
            "criterion does not belong to the nominated position",
        ));
    }

    Ok((nomination, criterion, gate))
}

impl SubmitEvaluationScoreHandler {
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
        cmd: SubmitEvaluationScoreCommand,
    ) -> Result<EvaluationScore, SuccessionError> {
        let (mut nomination, criterion, gate) = scoring_context(
            self.cycles.as_ref(),
            self.positions.as_ref(),
            self.nominations.as_ref(),
            &cmd.nomination_id,
            &cmd.criterion_id,
            "submit_evaluation_score",
        )
        .await?;

        let score = EvaluationScore::new(
            nomination.id,
            cmd.evaluator_id.clone(),
            &criterion,
            cmd.raw_score,
        )?;

        // A lost race on the score triple surfaces here as a conflict.
        let review = nomination.begin_review(&cmd.evaluator_id);
        let review_start = review.as_ref().map(|entry| ReviewStart {
            nomination: &nomination,
            entry,
        });
        self.evaluations
            .insert_score(&gate, &score, review_start)
            .await
            .map_err(from_store)?;

        tracing::info!(
            nomination_id = %score.nomination_id,
            evaluator_id = %score.evaluator_id,
            criterion_id = %score.criterion_id,
            raw_score = score.raw_score,
            review_started = review.is_some(),
            "evaluation score recorded"
        );
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::succession::testing::{admin, open_gate, user, Fixture};
    use crate::domain::succession::{CyclePhase, NominationStatus};

    fn command(nomination: &Nomination, criterion: &Criterion, evaluator: &str, raw: f64) -> SubmitEvaluationScoreCommand {
        SubmitEvaluationScoreCommand {
            nomination_id: nomination.id,
            evaluator_id: user(evaluator),
            criterion_id: criterion.id,
            raw_score: raw,
        }
    }

    fn handler(fixture: &Fixture) -> SubmitEvaluationScoreHandler {
        SubmitEvaluationScoreHandler::new(
            fixture.cycles(),
            fixture.positions(),
            fixture.nominations(),
            fixture.evaluations(),
        )
    }

    struct Scene {
        fixture: Fixture,
        nomination: Nomination,
        leadership: Criterion,
        vision: Criterion,
    }

    async fn scene() -> Scene {
        let fixture = Fixture::new();
        let mut cycle = fixture.cycle_in(CyclePhase::NominationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;
        let leadership = fixture.criterion(&position, "Leadership", 60, 10).await;
        let vision = fixture.criterion(&position, "Vision", 40, 5).await;
        let nomination = fixture.nomination(&cycle, &position, "nominee-1").await;
        fixture.advance(&mut cycle, CyclePhase::Evaluation).await;
        Scene {
            fixture,
            nomination,
            leadership,
            vision,
        }
    }

    #[tokio::test]
    async fn first_score_starts_review() {
        let s = scene().await;

        handler(&s.fixture)
            .handle(command(&s.nomination, &s.leadership, "evaluator-1", 8.0))
            .await
            .unwrap();

        let stored = NominationRepository::find_by_id(&s.fixture.store, &s.nomination.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, NominationStatus::UnderReview);
    }

    #[tokio::test]
    async fn duplicate_triple_conflicts_but_other_criterion_succeeds() {
        let s = scene().await;
        let handler = handler(&s.fixture);
        handler
            .handle(command(&s.nomination, &s.leadership, "evaluator-1", 8.0))
            .await
            .unwrap();

        let err = handler
            .handle(command(&s.nomination, &s.leadership, "evaluator-1", 6.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SuccessionError::Conflict(_)));

        assert!(handler
            .handle(command(&s.nomination, &s.vision, "evaluator-1", 4.0))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn score_above_max_is_invalid() {
        let s = scene().await;

        let err = handler(&s.fixture)
            .handle(command(&s.nomination, &s.vision, "evaluator-1", 5.5))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::Validation(_)));
    }

    #[tokio::test]
    async fn non_finite_score_is_invalid() {
        let s = scene().await;

        let err = handler(&s.fixture)
            .handle(command(&s.nomination, &s.vision, "evaluator-1", f64::NAN))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::Validation(_)));
    }

    #[tokio::test]
    async fn criterion_of_another_position_is_invalid() {
        let s = scene().await;
        let cycle = CycleRepository::find_by_id(&s.fixture.store, &s.nomination.cycle_id)
            .await
            .unwrap()
            .unwrap();
        let treasurer = s.fixture.position(&cycle, "Treasurer").await;
        let foreign = s.fixture.criterion(&treasurer, "Numeracy", 100, 10).await;

        let err = handler(&s.fixture)
            .handle(command(&s.nomination, &foreign, "evaluator-1", 5.0))
            .await
            .unwrap_err();

        match err {
            SuccessionError::Validation(v) => assert_eq!(v.field(), "criterion_id"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn withdrawn_nomination_cannot_be_scored() {
        let s = scene().await;
        let mut nomination = s.nomination.clone();
        let entry = nomination.withdraw(&admin(), None).unwrap();
        let gate = open_gate(nomination.cycle_id);
        NominationRepository::update_status(&s.fixture.store, &gate, &nomination, &entry)
            .await
            .unwrap();

        let err = handler(&s.fixture)
            .handle(command(&nomination, &s.leadership, "evaluator-1", 5.0))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::StateTransition { entity: Entity::Nomination, .. }));
    }

    #[tokio::test]
    async fn scoring_outside_evaluation_is_gated() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::NominationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;
        let criterion = fixture.criterion(&position, "Leadership", 60, 10).await;
        let nomination = fixture.nomination(&cycle, &position, "nominee-1").await;

        let err = handler(&fixture)
            .handle(command(&nomination, &criterion, "evaluator-1", 5.0))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::StateTransition { entity: Entity::Cycle, .. }));
    }
}
