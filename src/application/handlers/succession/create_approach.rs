//! CreateApproachHandler - Records that a nominee was approached about a
//! position.

use std::sync::Arc;

use crate::domain::foundation::{Actor, CycleId, PositionId, UserId};
use crate::domain::succession::{Approach, ApproachCreated, Entity, SuccessionError};
use crate::ports::{ApproachRepository, CycleRepository, EventPublisher, PositionRepository};

use super::support::{from_store, gated_cycle, gates, load_position, publish_best_effort};

#[derive(Debug, Clone)]
pub struct CreateApproachCommand {
    pub cycle_id: CycleId,
    pub nominee_id: UserId,
    pub position_id: PositionId,
    pub actor: Option<Actor>,
    pub notes: Option<String>,
}

pub struct CreateApproachHandler {
    cycles: Arc<dyn CycleRepository>,
    positions: Arc<dyn PositionRepository>,
    approaches: Arc<dyn ApproachRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl CreateApproachHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        positions: Arc<dyn PositionRepository>,
        approaches: Arc<dyn ApproachRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            cycles,
            positions,
            approaches,
            publisher,
        }
    }

    pub async fn handle(&self, cmd: CreateApproachCommand) -> Result<Approach, SuccessionError> {
        let (cycle, gate) = gated_cycle(
            self.cycles.as_ref(),
            &cmd.cycle_id,
            gates::APPROACH,
            "create_approach",
        )
        .await?;
        let position = load_position(self.positions.as_ref(), &cmd.position_id).await?;
        if position.cycle_id != cycle.id {
            return Err(SuccessionError::not_found(Entity::Position, position.id));
        }

        let (approach, entry) = Approach::create(
            cycle.id,
            cmd.nominee_id,
            position.id,
            cmd.actor.as_ref(),
            cmd.notes,
        );
        self.approaches
            .create(&gate, &approach, &entry)
            .await
            .map_err(from_store)?;

        tracing::info!(
            cycle_id = %cycle.id,
            approach_id = %approach.id,
            nominee_id = %approach.nominee_id,
            "nominee approached"
        );

        publish_best_effort(
            self.publisher.as_ref(),
            &ApproachCreated::from(&approach),
            cmd.actor.as_ref(),
        )
        .await;

        Ok(approach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::application::handlers::succession::testing::{admin, user, Fixture};
    use crate::domain::succession::{ApproachStatus, CyclePhase, Position};

    fn command(cycle_id: CycleId, position: &Position) -> CreateApproachCommand {
        CreateApproachCommand {
            cycle_id,
            nominee_id: user("nominee-1"),
            position_id: position.id,
            actor: Some(admin()),
            notes: Some("Phoned after the ranking meeting".to_string()),
        }
    }

    fn handler(fixture: &Fixture, publisher: Arc<dyn EventPublisher>) -> CreateApproachHandler {
        CreateApproachHandler::new(
            fixture.cycles(),
            fixture.positions(),
            fixture.approaches(),
            publisher,
        )
    }

    #[tokio::test]
    async fn creates_pending_approach_and_notifies() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::ApplicationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;

        let approach = handler(&fixture, fixture.publisher())
            .handle(command(cycle.id, &position))
            .await
            .unwrap();

        assert_eq!(approach.response_status, ApproachStatus::Pending);
        assert!(approach.responded_at.is_none());
        let events = fixture.bus.events_of_type("succession.approach_created.v1");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].aggregate_id, approach.id.to_string());
        assert_eq!(events[0].metadata.user_id.as_deref(), Some("admin-1"));
    }

    #[tokio::test]
    async fn duplicate_approach_conflicts() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::ApplicationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;
        let handler = handler(&fixture, fixture.publisher());
        handler.handle(command(cycle.id, &position)).await.unwrap();

        let err = handler.handle(command(cycle.id, &position)).await.unwrap_err();

        assert!(matches!(err, SuccessionError::Conflict(_)));
        assert_eq!(fixture.bus.event_count(), 1);
    }

    #[tokio::test]
    async fn only_while_applications_are_open() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Evaluation).await;
        let position = fixture.position(&cycle, "Chair").await;

        let err = handler(&fixture, fixture.publisher())
            .handle(command(cycle.id, &position))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::StateTransition { entity: Entity::Cycle, .. }));
    }

    #[tokio::test]
    async fn notification_failure_keeps_the_approach() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::ApplicationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;

        let approach = handler(&fixture, Arc::new(InMemoryEventBus::failing()))
            .handle(command(cycle.id, &position))
            .await
            .unwrap();

        let stored = ApproachRepository::find_by_id(&fixture.store, &approach.id)
            .await
            .unwrap();
        assert!(stored.is_some());
    }
}
