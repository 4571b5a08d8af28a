//! DefinePositionHandler - Adds a position to a cycle's rubric.

use std::sync::Arc;

use crate::domain::foundation::CycleId;
use crate::domain::succession::{Position, SuccessionError};
use crate::ports::{CycleRepository, PositionRepository};

use super::support::{from_store, gated_cycle, gates};

#[derive(Debug, Clone)]
pub struct DefinePositionCommand {
    pub cycle_id: CycleId,
    pub title: String,
    pub hierarchy_level: u16,
    pub description: Option<String>,
}

pub struct DefinePositionHandler {
    cycles: Arc<dyn CycleRepository>,
    positions: Arc<dyn PositionRepository>,
}

impl DefinePositionHandler {
    pub fn new(cycles: Arc<dyn CycleRepository>, positions: Arc<dyn PositionRepository>) -> Self {
        Self { cycles, positions }
    }

    pub async fn handle(&self, cmd: DefinePositionCommand) -> Result<Position, SuccessionError> {
        let (cycle, gate) = gated_cycle(
            self.cycles.as_ref(),
            &cmd.cycle_id,
            gates::RUBRIC,
            "define_position",
        )
        .await?;

        let position = Position::new(cycle.id, cmd.title, cmd.hierarchy_level, cmd.description)?;
        self.positions
            .save_position(&gate, &position)
            .await
            .map_err(from_store)?;

        tracing::info!(cycle_id = %cycle.id, position_id = %position.id, title = %position.title, "position defined");
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::succession::testing::Fixture;
    use crate::domain::succession::CyclePhase;

    fn command(cycle_id: CycleId) -> DefinePositionCommand {
        DefinePositionCommand {
            cycle_id,
            title: "Chair".to_string(),
            hierarchy_level: 1,
            description: None,
        }
    }

    #[tokio::test]
    async fn defines_position_while_nominations_are_open() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::NominationsOpen).await;
        let handler = DefinePositionHandler::new(fixture.cycles(), fixture.positions());

        let position = handler.handle(command(cycle.id)).await.unwrap();

        let listed = fixture.store.positions_for_cycle(&cycle.id).await.unwrap();
        assert_eq!(listed, vec![position]);
    }

    #[tokio::test]
    async fn rubric_is_frozen_once_evaluation_starts() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Evaluation).await;
        let handler = DefinePositionHandler::new(fixture.cycles(), fixture.positions());

        let err = handler.handle(command(cycle.id)).await.unwrap_err();

        assert!(matches!(
            err,
            SuccessionError::StateTransition { ref current, ref requested, .. }
            if current == "evaluation" && requested == "define_position"
        ));
    }

    #[tokio::test]
    async fn level_zero_is_invalid() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Draft).await;
        let handler = DefinePositionHandler::new(fixture.cycles(), fixture.positions());

        let mut cmd = command(cycle.id);
        cmd.hierarchy_level = 0;

        assert!(matches!(
            handler.handle(cmd).await,
            Err(SuccessionError::Validation(_))
        ));
    }
}
