//! AddCriterionHandler - Adds a scoring criterion to a position.

use std::sync::Arc;

use crate::domain::foundation::PositionId;
use crate::domain::succession::{Criterion, SuccessionError, Weight};
use crate::ports::{CycleRepository, PositionRepository};

use super::support::{from_store, gated_cycle, gates, load_position};

#[derive(Debug, Clone)]
pub struct AddCriterionCommand {
    pub position_id: PositionId,
    pub name: String,
    /// Percentage of the final score, 0-100. Weights of a position need not
    /// add up to 100.
    pub weight: u8,
    pub max_score: u32,
    pub display_order: u32,
}

pub struct AddCriterionHandler {
    cycles: Arc<dyn CycleRepository>,
    positions: Arc<dyn PositionRepository>,
}

impl AddCriterionHandler {
    pub fn new(cycles: Arc<dyn CycleRepository>, positions: Arc<dyn PositionRepository>) -> Self {
        Self { cycles, positions }
    }

    pub async fn handle(&self, cmd: AddCriterionCommand) -> Result<Criterion, SuccessionError> {
        let position = load_position(self.positions.as_ref(), &cmd.position_id).await?;
        let (_, gate) = gated_cycle(
            self.cycles.as_ref(),
            &position.cycle_id,
            gates::RUBRIC,
            "add_criterion",
        )
        .await?;

        let weight = Weight::new(cmd.weight)?;
        let criterion = Criterion::new(
            position.id,
            cmd.name,
            weight,
            cmd.max_score,
            cmd.display_order,
        )?;
        self.positions
            .save_criterion(&gate, &criterion)
            .await
            .map_err(from_store)?;

        tracing::info!(
            position_id = %position.id,
            criterion_id = %criterion.id,
            weight = criterion.weight.value(),
            max_score = criterion.max_score,
            "criterion added"
        );
        Ok(criterion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::succession::testing::Fixture;
    use crate::domain::succession::{CyclePhase, Entity};

    fn command(position_id: PositionId, name: &str, weight: u8, max_score: u32) -> AddCriterionCommand {
        AddCriterionCommand {
            position_id,
            name: name.to_string(),
            weight,
            max_score,
            display_order: 1,
        }
    }

    #[tokio::test]
    async fn adds_criteria_whose_weights_need_not_sum_to_100() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Draft).await;
        let position = fixture.position(&cycle, "Chair").await;
        let handler = AddCriterionHandler::new(fixture.cycles(), fixture.positions());

        handler.handle(command(position.id, "Leadership", 70, 10)).await.unwrap();
        handler.handle(command(position.id, "Vision", 70, 5)).await.unwrap();

        let criteria = fixture.store.criteria_for_position(&position.id).await.unwrap();
        assert_eq!(criteria.len(), 2);
    }

    #[tokio::test]
    async fn rejects_bad_weight_and_zero_max() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Draft).await;
        let position = fixture.position(&cycle, "Chair").await;
        let handler = AddCriterionHandler::new(fixture.cycles(), fixture.positions());

        assert!(matches!(
            handler.handle(command(position.id, "Leadership", 101, 10)).await,
            Err(SuccessionError::Validation(_))
        ));
        assert!(matches!(
            handler.handle(command(position.id, "Leadership", 50, 0)).await,
            Err(SuccessionError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Draft).await;
        let position = fixture.position(&cycle, "Chair").await;
        let handler = AddCriterionHandler::new(fixture.cycles(), fixture.positions());
        handler.handle(command(position.id, "Leadership", 50, 10)).await.unwrap();

        let err = handler
            .handle(command(position.id, "Leadership", 20, 10))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::Conflict(_)));
    }

    #[tokio::test]
    async fn unknown_position_is_not_found() {
        let fixture = Fixture::new();
        let handler = AddCriterionHandler::new(fixture.cycles(), fixture.positions());

        let err = handler
            .handle(command(PositionId::new(), "Leadership", 50, 10))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::NotFound { entity: Entity::Position, .. }));
    }
}
