//! SubmitNominationHandler - Puts a member forward for a position.

use std::sync::Arc;

use crate::domain::foundation::{CycleId, PositionId, UserId};
use crate::domain::succession::{Entity, Nomination, SuccessionError};
use crate::ports::{CycleRepository, NominationRepository, PositionRepository};

use super::support::{from_store, gated_cycle, gates, load_position};

#[derive(Debug, Clone)]
pub struct SubmitNominationCommand {
    pub cycle_id: CycleId,
    pub position_id: PositionId,
    pub nominee_id: UserId,
    pub nominator_id: UserId,
    pub reason: Option<String>,
}

pub struct SubmitNominationHandler {
    cycles: Arc<dyn CycleRepository>,
    positions: Arc<dyn PositionRepository>,
    nominations: Arc<dyn NominationRepository>,
}

impl SubmitNominationHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        positions: Arc<dyn PositionRepository>,
        nominations: Arc<dyn NominationRepository>,
    ) -> Self {
        Self {
            cycles,
            positions,
            nominations,
        }
    }

    pub async fn handle(&self, cmd: SubmitNominationCommand) -> Result<Nomination, SuccessionError> {
        let (cycle, gate) = gated_cycle(
            self.cycles.as_ref(),
            &cmd.cycle_id,
            gates::NOMINATION,
            "submit_nomination",
        )
        .await?;

        let position = load_position(self.positions.as_ref(), &cmd.position_id).await?;
        if position.cycle_id != cycle.id {
            return Err(SuccessionError::not_found(Entity::Position, position.id));
        }

        let (nomination, entry) = Nomination::submit(
            cycle.id,
            position.id,
            cmd.nominee_id,
            cmd.nominator_id,
            cmd.reason,
        )?;
        self.nominations
            .create(&gate, &nomination, &entry)
            .await
            .map_err(from_store)?;

        tracing::info!(
            cycle_id = %cycle.id,
            nomination_id = %nomination.id,
            position_id = %position.id,
            "nomination submitted"
        );
        Ok(nomination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::succession::testing::{user, Fixture};
    use crate::domain::succession::{CyclePhase, NominationStatus, Position};

    fn command(cycle_id: CycleId, position: &Position, nominee: &str, nominator: &str) -> SubmitNominationCommand {
        SubmitNominationCommand {
            cycle_id,
            position_id: position.id,
            nominee_id: user(nominee),
            nominator_id: user(nominator),
            reason: Some("Ran the regional retreat".to_string()),
        }
    }

    fn handler(fixture: &Fixture) -> SubmitNominationHandler {
        SubmitNominationHandler::new(fixture.cycles(), fixture.positions(), fixture.nominations())
    }

    #[tokio::test]
    async fn submits_while_nominations_are_open() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::NominationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;

        let nomination = handler(&fixture)
            .handle(command(cycle.id, &position, "nominee-1", "member-1"))
            .await
            .unwrap();

        assert_eq!(nomination.status, NominationStatus::Submitted);
        assert_eq!(fixture.store.history_len().await, 2 + 1);
    }

    #[tokio::test]
    async fn closed_for_nominations_outside_the_window() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Draft).await;
        let position = fixture.position(&cycle, "Chair").await;

        let err = handler(&fixture)
            .handle(command(cycle.id, &position, "nominee-1", "member-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::StateTransition { entity: Entity::Cycle, .. }));
    }

    #[tokio::test]
    async fn self_nomination_is_invalid() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::NominationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;

        let err = handler(&fixture)
            .handle(command(cycle.id, &position, "member-1", "member-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::Validation(_)));
    }

    #[tokio::test]
    async fn position_of_another_cycle_is_not_found() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::NominationsOpen).await;
        let other = fixture.cycle_in_scope("chapter-99", CyclePhase::Draft).await;
        let foreign = fixture.position(&other, "Chair").await;

        let err = handler(&fixture)
            .handle(command(cycle.id, &foreign, "nominee-1", "member-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::NotFound { entity: Entity::Position, .. }));
    }

    #[tokio::test]
    async fn duplicate_active_nomination_conflicts() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::NominationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;
        let handler = handler(&fixture);
        handler
            .handle(command(cycle.id, &position, "nominee-1", "member-1"))
            .await
            .unwrap();

        let err = handler
            .handle(command(cycle.id, &position, "nominee-1", "member-2"))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::Conflict(_)));
    }
}
