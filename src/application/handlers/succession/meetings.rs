//! Meeting ledger handlers: schedule, complete and cancel committee meetings.
//!
//! Meetings may be recorded in any phase before the cycle closes.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::foundation::{Actor, CycleId, MeetingId};
use crate::domain::succession::{Meeting, MeetingType, PhaseGate, SuccessionError};
use crate::ports::{CycleRepository, MeetingRepository};

use super::support::{from_store, load_meeting, mutable_cycle};

// ════════════════════════════════════════════════════════════════════════════
// Schedule
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ScheduleMeetingCommand {
    pub cycle_id: CycleId,
    pub meeting_type: MeetingType,
    pub meeting_date: DateTime<Utc>,
    pub actor: Option<Actor>,
}

pub struct ScheduleMeetingHandler {
    cycles: Arc<dyn CycleRepository>,
    meetings: Arc<dyn MeetingRepository>,
}

impl ScheduleMeetingHandler {
    pub fn new(cycles: Arc<dyn CycleRepository>, meetings: Arc<dyn MeetingRepository>) -> Self {
        Self { cycles, meetings }
    }

    pub async fn handle(&self, cmd: ScheduleMeetingCommand) -> Result<Meeting, SuccessionError> {
        let (cycle, gate) =
            mutable_cycle(self.cycles.as_ref(), &cmd.cycle_id, "schedule_meeting").await?;

        let (meeting, entry) =
            Meeting::schedule(cycle.id, cmd.meeting_type, cmd.meeting_date, cmd.actor.as_ref());
        self.meetings
            .create(&gate, &meeting, &entry)
            .await
            .map_err(from_store)?;

        tracing::info!(
            cycle_id = %cycle.id,
            meeting_id = %meeting.id,
            meeting_type = %meeting.meeting_type,
            "meeting scheduled"
        );
        Ok(meeting)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Complete / Cancel
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct CompleteMeetingCommand {
    pub meeting_id: MeetingId,
    pub outcome_notes: Option<String>,
    pub actor: Option<Actor>,
}

#[derive(Debug, Clone)]
pub struct CancelMeetingCommand {
    pub meeting_id: MeetingId,
    pub reason: Option<String>,
    pub actor: Option<Actor>,
}

pub struct CompleteMeetingHandler {
    cycles: Arc<dyn CycleRepository>,
    meetings: Arc<dyn MeetingRepository>,
}

pub struct CancelMeetingHandler {
    cycles: Arc<dyn CycleRepository>,
    meetings: Arc<dyn MeetingRepository>,
}

/// Loads a meeting whose cycle is still open.
async fn open_meeting(
    cycles: &dyn CycleRepository,
    meetings: &dyn MeetingRepository,
    id: &MeetingId,
    operation: &'static str,
) -> Result<(Meeting, PhaseGate), SuccessionError> {
    let meeting = load_meeting(meetings, id).await?;
    let (_, gate) = mutable_cycle(cycles, &meeting.cycle_id, operation).await?;
    Ok((meeting, gate))
}

impl CompleteMeetingHandler {
    pub fn new(cycles: Arc<dyn CycleRepository>, meetings: Arc<dyn MeetingRepository>) -> Self {
        Self { cycles, meetings }
    }

    pub async fn handle(&self, cmd: CompleteMeetingCommand) -> Result<Meeting, SuccessionError> {
        let (mut meeting, gate) = open_meeting(
            self.cycles.as_ref(),
            self.meetings.as_ref(),
            &cmd.meeting_id,
            "complete_meeting",
        )
        .await?;

        let entry = meeting.complete(cmd.outcome_notes, cmd.actor.as_ref())?;
        self.meetings
            .update_status(&gate, &meeting, &entry)
            .await
            .map_err(from_store)?;

        tracing::info!(meeting_id = %meeting.id, "meeting completed");
        Ok(meeting)
    }
}

impl CancelMeetingHandler {
    pub fn new(cycles: Arc<dyn CycleRepository>, meetings: Arc<dyn MeetingRepository>) -> Self {
        Self { cycles, meetings }
    }

    pub async fn handle(&self, cmd: CancelMeetingCommand) -> Result<Meeting, SuccessionError> {
        let (mut meeting, gate) = open_meeting(
            self.cycles.as_ref(),
            self.meetings.as_ref(),
            &cmd.meeting_id,
            "cancel_meeting",
        )
        .await?;

        let entry = meeting.cancel(cmd.reason, cmd.actor.as_ref())?;
        self.meetings
            .update_status(&gate, &meeting, &entry)
            .await
            .map_err(from_store)?;

        tracing::info!(meeting_id = %meeting.id, "meeting cancelled");
        Ok(meeting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::succession::testing::{admin, Fixture};
    use crate::domain::succession::{CyclePhase, Entity, MeetingStatus};

    async fn scheduled(fixture: &Fixture, cycle_id: CycleId) -> Meeting {
        ScheduleMeetingHandler::new(fixture.cycles(), fixture.meetings())
            .handle(ScheduleMeetingCommand {
                cycle_id,
                meeting_type: MeetingType::SteeringCommittee,
                meeting_date: Utc::now(),
                actor: Some(admin()),
            })
            .await
            .unwrap()
    }

    fn complete(meeting: &Meeting) -> CompleteMeetingCommand {
        CompleteMeetingCommand {
            meeting_id: meeting.id,
            outcome_notes: Some("Shortlist agreed".to_string()),
            actor: Some(admin()),
        }
    }

    fn cancel(meeting: &Meeting) -> CancelMeetingCommand {
        CancelMeetingCommand {
            meeting_id: meeting.id,
            reason: Some("No quorum".to_string()),
            actor: Some(admin()),
        }
    }

    #[tokio::test]
    async fn scheduled_meeting_completes_with_notes() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Evaluation).await;
        let meeting = scheduled(&fixture, cycle.id).await;
        assert_eq!(meeting.status, MeetingStatus::Scheduled);

        let done = CompleteMeetingHandler::new(fixture.cycles(), fixture.meetings())
            .handle(complete(&meeting))
            .await
            .unwrap();

        assert_eq!(done.status, MeetingStatus::Completed);
        assert_eq!(done.outcome_notes.as_deref(), Some("Shortlist agreed"));
    }

    #[tokio::test]
    async fn cancelled_meeting_cannot_complete() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Draft).await;
        let meeting = scheduled(&fixture, cycle.id).await;
        CancelMeetingHandler::new(fixture.cycles(), fixture.meetings())
            .handle(cancel(&meeting))
            .await
            .unwrap();

        let err = CompleteMeetingHandler::new(fixture.cycles(), fixture.meetings())
            .handle(complete(&meeting))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::StateTransition { entity: Entity::Meeting, .. }));
    }

    #[tokio::test]
    async fn completed_meeting_cannot_be_cancelled() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Draft).await;
        let meeting = scheduled(&fixture, cycle.id).await;
        CompleteMeetingHandler::new(fixture.cycles(), fixture.meetings())
            .handle(complete(&meeting))
            .await
            .unwrap();

        let err = CancelMeetingHandler::new(fixture.cycles(), fixture.meetings())
            .handle(cancel(&meeting))
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::StateTransition { .. }));
    }

    #[tokio::test]
    async fn closed_cycle_takes_no_meetings() {
        let fixture = Fixture::new();
        let cycle = fixture.cycle_in(CyclePhase::Completed).await;

        let err = ScheduleMeetingHandler::new(fixture.cycles(), fixture.meetings())
            .handle(ScheduleMeetingCommand {
                cycle_id: cycle.id,
                meeting_type: MeetingType::General,
                meeting_date: Utc::now(),
                actor: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::StateTransition { entity: Entity::Cycle, .. }));
    }

    #[tokio::test]
    async fn unknown_meeting_is_not_found() {
        let fixture = Fixture::new();

        let err = CompleteMeetingHandler::new(fixture.cycles(), fixture.meetings())
            .handle(CompleteMeetingCommand {
                meeting_id: MeetingId::new(),
                outcome_notes: None,
                actor: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SuccessionError::NotFound { entity: Entity::Meeting, .. }));
    }
}
