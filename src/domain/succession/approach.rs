//! Candidate outreach ("approach") tracking.
//!
//! ```text
//! pending --> accepted | declined | conditional
//! conditional --> accepted | declined
//! ```
//!
//! `accepted` and `declined` are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    Actor, ApproachId, CycleId, PositionId, StateMachine, Timestamp, UserId, ValidationError,
};

use super::{Entity, Nomination, StatusHistoryEntry, SuccessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApproachStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Conditional,
}

impl ApproachStatus {
    pub const ALL: [ApproachStatus; 4] = [
        ApproachStatus::Pending,
        ApproachStatus::Accepted,
        ApproachStatus::Declined,
        ApproachStatus::Conditional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApproachStatus::Pending => "pending",
            ApproachStatus::Accepted => "accepted",
            ApproachStatus::Declined => "declined",
            ApproachStatus::Conditional => "conditional",
        }
    }

    /// Accepted or declined.
    pub fn is_resolved(&self) -> bool {
        matches!(self, ApproachStatus::Accepted | ApproachStatus::Declined)
    }
}

impl StateMachine for ApproachStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ApproachStatus::*;
        matches!(
            (self, target),
            (Pending, Accepted)
                | (Pending, Declined)
                | (Pending, Conditional)
                | (Conditional, Accepted)
                | (Conditional, Declined)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ApproachStatus::*;
        match self {
            Pending => vec![Accepted, Declined, Conditional],
            Conditional => vec![Accepted, Declined],
            Accepted | Declined => vec![],
        }
    }
}

impl fmt::Display for ApproachStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApproachStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApproachStatus::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| {
                ValidationError::invalid_format(
                    "response_status",
                    format!("unknown approach status '{}'", s),
                )
            })
    }
}

/// Outreach to a nominee asking whether they will stand for a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approach {
    pub id: ApproachId,
    pub cycle_id: CycleId,
    pub nominee_id: UserId,
    pub position_id: PositionId,
    pub response_status: ApproachStatus,
    pub approached_by: Option<UserId>,
    pub approached_at: Timestamp,
    /// Set once, when the approach first reaches accepted or declined.
    pub responded_at: Option<Timestamp>,
    pub notes: Option<String>,
}

impl Approach {
    pub fn create(
        cycle_id: CycleId,
        nominee_id: UserId,
        position_id: PositionId,
        approached_by: Option<&Actor>,
        notes: Option<String>,
    ) -> (Self, StatusHistoryEntry) {
        let now = Timestamp::now();
        let approach = Self {
            id: ApproachId::new(),
            cycle_id,
            nominee_id,
            position_id,
            response_status: ApproachStatus::Pending,
            approached_by: approached_by.map(|a| a.user_id.clone()),
            approached_at: now,
            responded_at: None,
            notes: notes.filter(|n| !n.trim().is_empty()),
        };
        let entry = StatusHistoryEntry::created(
            Entity::Approach,
            *approach.id.as_uuid(),
            approach.response_status,
            approach.approached_by.clone(),
            now,
        );

        (approach, entry)
    }

    /// Whether this approach is the outreach for `nomination`: same cycle,
    /// nominee and position.
    pub fn is_for(&self, nomination: &Nomination) -> bool {
        self.cycle_id == nomination.cycle_id
            && self.nominee_id == nomination.nominee_id
            && self.position_id == nomination.position_id
    }

    /// Records the nominee's answer.
    ///
    /// Notes, when given, replace the previous notes.
    pub fn record_response(
        &mut self,
        response: ApproachStatus,
        actor: Option<&Actor>,
        notes: Option<String>,
    ) -> Result<StatusHistoryEntry, SuccessionError> {
        if response == ApproachStatus::Pending {
            return Err(SuccessionError::validation(
                "response_status",
                "pending is not a response",
            ));
        }

        let from = self.response_status;
        self.response_status = from
            .transition_to(response)
            .map_err(|e| SuccessionError::rejected(Entity::Approach, e))?;

        let now = Timestamp::now();
        if response.is_resolved() && self.responded_at.is_none() {
            self.responded_at = Some(now);
        }
        let notes = notes.filter(|n| !n.trim().is_empty());
        if notes.is_some() {
            self.notes = notes.clone();
        }

        Ok(StatusHistoryEntry::transition(
            Entity::Approach,
            *self.id.as_uuid(),
            from,
            response,
            actor.map(|a| a.user_id.clone()),
            now,
        )
        .with_notes(notes))
    }
}
