//! Committee meetings held during a cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    Actor, CycleId, MeetingId, StateMachine, Timestamp, ValidationError,
};

use super::{Entity, StatusHistoryEntry, SuccessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingType {
    SteeringCommittee,
    RegionalReview,
    SelectionCommittee,
    General,
}

impl MeetingType {
    pub const ALL: [MeetingType; 4] = [
        MeetingType::SteeringCommittee,
        MeetingType::RegionalReview,
        MeetingType::SelectionCommittee,
        MeetingType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingType::SteeringCommittee => "steering_committee",
            MeetingType::RegionalReview => "regional_review",
            MeetingType::SelectionCommittee => "selection_committee",
            MeetingType::General => "general",
        }
    }
}

impl fmt::Display for MeetingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeetingType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MeetingType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| {
                ValidationError::invalid_format("meeting_type", format!("unknown meeting type '{}'", s))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Scheduled => "scheduled",
            MeetingStatus::Completed => "completed",
            MeetingStatus::Cancelled => "cancelled",
        }
    }
}

impl StateMachine for MeetingStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use MeetingStatus::*;
        matches!((self, target), (Scheduled, Completed) | (Scheduled, Cancelled))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use MeetingStatus::*;
        match self {
            Scheduled => vec![Completed, Cancelled],
            Completed | Cancelled => vec![],
        }
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeetingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MeetingStatus::Scheduled),
            "completed" => Ok(MeetingStatus::Completed),
            "cancelled" => Ok(MeetingStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown meeting status '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub cycle_id: CycleId,
    pub meeting_type: MeetingType,
    pub meeting_date: DateTime<Utc>,
    pub status: MeetingStatus,
    pub outcome_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Meeting {
    pub fn schedule(
        cycle_id: CycleId,
        meeting_type: MeetingType,
        meeting_date: DateTime<Utc>,
        actor: Option<&Actor>,
    ) -> (Self, StatusHistoryEntry) {
        let now = Timestamp::now();
        let meeting = Self {
            id: MeetingId::new(),
            cycle_id,
            meeting_type,
            meeting_date,
            status: MeetingStatus::Scheduled,
            outcome_notes: None,
            created_at: now,
            updated_at: now,
        };
        let entry = StatusHistoryEntry::created(
            Entity::Meeting,
            *meeting.id.as_uuid(),
            meeting.status,
            actor.map(|a| a.user_id.clone()),
            now,
        );

        (meeting, entry)
    }

    pub fn complete(
        &mut self,
        outcome_notes: Option<String>,
        actor: Option<&Actor>,
    ) -> Result<StatusHistoryEntry, SuccessionError> {
        let entry = self.move_to(MeetingStatus::Completed, actor)?;
        self.outcome_notes = outcome_notes.filter(|n| !n.trim().is_empty());
        Ok(entry)
    }

    pub fn cancel(
        &mut self,
        reason: Option<String>,
        actor: Option<&Actor>,
    ) -> Result<StatusHistoryEntry, SuccessionError> {
        Ok(self.move_to(MeetingStatus::Cancelled, actor)?.with_notes(reason))
    }

    fn move_to(
        &mut self,
        target: MeetingStatus,
        actor: Option<&Actor>,
    ) -> Result<StatusHistoryEntry, SuccessionError> {
        let from = self.status;
        self.status = from
            .transition_to(target)
            .map_err(|e| SuccessionError::rejected(Entity::Meeting, e))?;
        self.updated_at = Timestamp::now();

        Ok(StatusHistoryEntry::transition(
            Entity::Meeting,
            *self.id.as_uuid(),
            from,
            target,
            actor.map(|a| a.user_id.clone()),
            self.updated_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduled() -> Meeting {
        Meeting::schedule(
            CycleId::new(),
            MeetingType::SteeringCommittee,
            Utc::now(),
            None,
        )
        .0
    }

    #[test]
    fn complete_records_outcome() {
        let mut meeting = scheduled();
        meeting
            .complete(Some("Shortlist agreed".into()), None)
            .unwrap();
        assert_eq!(meeting.status, MeetingStatus::Completed);
        assert_eq!(meeting.outcome_notes.as_deref(), Some("Shortlist agreed"));
    }

    #[test]
    fn finished_meetings_cannot_move() {
        let mut done = scheduled();
        done.complete(None, None).unwrap();
        assert!(matches!(
            done.cancel(None, None),
            Err(SuccessionError::StateTransition { entity: Entity::Meeting, .. })
        ));

        let mut cancelled = scheduled();
        cancelled.cancel(Some("quorum".into()), None).unwrap();
        assert!(cancelled.complete(None, None).is_err());
        assert!(cancelled.outcome_notes.is_none());
    }

    #[test]
    fn meeting_type_wire_names() {
        assert_eq!(
            "steering_committee".parse::<MeetingType>().unwrap(),
            MeetingType::SteeringCommittee
        );
        assert!("board".parse::<MeetingType>().is_err());
    }
}
