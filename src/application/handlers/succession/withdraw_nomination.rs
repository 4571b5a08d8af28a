//! WithdrawNominationHandler - Retracts a nomination.

use std::sync::Arc;

use crate::domain::foundation::{Actor, NominationId};
use crate::domain::succession::{Nomination, SuccessionError};
use crate::ports::{CycleRepository, NominationRepository};

use super::support::{from_store, load_nomination, mutable_cycle};

#[derive(Debug, Clone)]
pub struct WithdrawNominationCommand {
    pub nomination_id: NominationId,
    /// Must be the nominator or an admin.
    pub actor: Actor,
    pub reason: Option<String>,
}

pub struct WithdrawNominationHandler {
    cycles: Arc<dyn CycleRepository>,
    nominations: Arc<dyn NominationRepository>,
}

impl WithdrawNominationHandler {
    pub fn new(cycles: Arc<dyn CycleRepository>, nominations: Arc<dyn NominationRepository>) -> Self {
        Self {
            cycles,
            nominations,
        }
    }

    pub async fn handle(&self, cmd: WithdrawNominationCommand) -> Result<Nomination, SuccessionError> {
        let mut nomination = load_nomination(self.nominations.as_ref(), &cmd.nomination_id).await?;
        let (_, gate) = mutable_cycle(
            self.cycles.as_ref(),
            &nomination.cycle_id,
            "withdraw_nomination",
        )
        .await?;

        let entry = nomination.withdraw(&cmd.actor, cmd.reason)?;
        self.nominations
            .update_status(&gate, &nomination, &entry)
            .await
            .map_err(from_store)?;

        tracing::info!(
            nomination_id = %nomination.id,
            withdrawn_by = %cmd.actor.user_id,
            "nomination withdrawn"
        );
        Ok(nomination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::succession::testing::{admin, member, Fixture};
    use crate::domain::succession::{CyclePhase, Entity, NominationStatus};
    use crate::ports::StatusHistoryReader;

    fn command(nomination_id: NominationId, actor: Actor) -> WithdrawNominationCommand {
        WithdrawNominationCommand {
            nomination_id,
            actor,
            reason: Some("Moved away".to_string()),
        }
    }

    #[tokio::test]
    async fn nominator_withdraws_with_history() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Evaluation).await;
        let position = fixture.position(&cycle, "Chair").await;
        let nomination = fixture.nomination(&cycle, &position, "nominee-1").await;
        let handler = WithdrawNominationHandler::new(fixture.cycles(), fixture.nominations());

        let withdrawn = handler
            .handle(command(nomination.id, member("nominator-1")))
            .await
            .unwrap();

        assert_eq!(withdrawn.status, NominationStatus::Withdrawn);
        let history = fixture
            .store
            .history_for(Entity::Nomination, nomination.id.as_uuid())
            .await
            .unwrap();
        assert_eq!(history.last().map(|e| e.to_status.as_str()), Some("withdrawn"));
        assert_eq!(history.last().and_then(|e| e.notes.as_deref()), Some("Moved away"));
    }

    #[tokio::test]
    async fn admin_may_withdraw_anyone() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::RcReview).await;
        let position = fixture.position(&cycle, "Chair").await;
        let nomination = fixture.nomination(&cycle, &position, "nominee-1").await;
        let handler = WithdrawNominationHandler::new(fixture.cycles(), fixture.nominations());

        assert!(handler.handle(command(nomination.id, admin())).await.is_ok());
    }

    #[tokio::test]
    async fn other_members_are_refused_on_actor_field() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::NominationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;
        let nomination = fixture.nomination(&cycle, &position, "nominee-1").await;
        let handler = WithdrawNominationHandler::new(fixture.cycles(), fixture.nominations());

        let err = handler
            .handle(command(nomination.id, member("bystander")))
            .await
            .unwrap_err();

        match err {
            SuccessionError::Validation(v) => assert_eq!(v.field(), "actor"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_withdrawal_is_a_state_error() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::NominationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;
        let nomination = fixture.nomination(&cycle, &position, "nominee-1").await;
        let handler = WithdrawNominationHandler::new(fixture.cycles(), fixture.nominations());
        handler.handle(command(nomination.id, admin())).await.unwrap();

        let err = handler.handle(command(nomination.id, admin())).await.unwrap_err();

        assert!(matches!(err, SuccessionError::StateTransition { entity: Entity::Nomination, .. }));
    }

    #[tokio::test]
    async fn closed_cycle_freezes_nominations() {
        let fixture = Fixture::new();
        let mut cycle = fixture.cycle_in(CyclePhase::NominationsOpen).await;
        let position = fixture.position(&cycle, "Chair").await;
        let nomination = fixture.nomination(&cycle, &position, "nominee-1").await;
        fixture.advance(&mut cycle, CyclePhase::Completed).await;
        let handler = WithdrawNominationHandler::new(fixture.cycles(), fixture.nominations());

        let err = handler.handle(command(nomination.id, admin())).await.unwrap_err();

        assert!(matches!(err, SuccessionError::StateTransition { entity: Entity::Cycle, .. }));
    }
}
