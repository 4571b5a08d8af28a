//! Nominations and their status machine.
//!
//! ```text
//! submitted --(first score)--> under_review
//!     |                             |
//!     +--------> withdrawn <--------+
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    Actor, CycleId, NominationId, PositionId, StateMachine, Timestamp, UserId, ValidationError,
};

use super::{Entity, StatusHistoryEntry, SuccessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NominationStatus {
    #[default]
    Submitted,
    UnderReview,
    Withdrawn,
}

impl NominationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NominationStatus::Submitted => "submitted",
            NominationStatus::UnderReview => "under_review",
            NominationStatus::Withdrawn => "withdrawn",
        }
    }
}

impl StateMachine for NominationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use NominationStatus::*;
        matches!(
            (self, target),
            (Submitted, UnderReview) | (Submitted, Withdrawn) | (UnderReview, Withdrawn)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use NominationStatus::*;
        match self {
            Submitted => vec![UnderReview, Withdrawn],
            UnderReview => vec![Withdrawn],
            Withdrawn => vec![],
        }
    }
}

impl fmt::Display for NominationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NominationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(NominationStatus::Submitted),
            "under_review" => Ok(NominationStatus::UnderReview),
            "withdrawn" => Ok(NominationStatus::Withdrawn),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown nomination status '{}'", other),
            )),
        }
    }
}

/// A member put forward for a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomination {
    pub id: NominationId,
    pub cycle_id: CycleId,
    pub position_id: PositionId,
    pub nominee_id: UserId,
    pub nominator_id: UserId,
    pub status: NominationStatus,
    pub reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Nomination {
    /// Records a new nomination in `submitted`.
    pub fn submit(
        cycle_id: CycleId,
        position_id: PositionId,
        nominee_id: UserId,
        nominator_id: UserId,
        reason: Option<String>,
    ) -> Result<(Self, StatusHistoryEntry), SuccessionError> {
        if nominee_id == nominator_id {
            return Err(SuccessionError::validation(
                "nominee_id",
                "a member cannot nominate themselves",
            ));
        }

        let now = Timestamp::now();
        let nomination = Self {
            id: NominationId::new(),
            cycle_id,
            position_id,
            nominee_id,
            nominator_id,
            status: NominationStatus::Submitted,
            reason: reason.filter(|r| !r.trim().is_empty()),
            created_at: now,
            updated_at: now,
        };
        let entry = StatusHistoryEntry::created(
            Entity::Nomination,
            *nomination.id.as_uuid(),
            nomination.status,
            Some(nomination.nominator_id.clone()),
            now,
        );

        Ok((nomination, entry))
    }

    pub fn is_active(&self) -> bool {
        self.status != NominationStatus::Withdrawn
    }

    /// Fails when the nomination can no longer receive scores.
    pub fn ensure_scorable(&self) -> Result<(), SuccessionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SuccessionError::state_transition(
                Entity::Nomination,
                self.status,
                "score",
            ))
        }
    }

    /// Moves a `submitted` nomination to `under_review`.
    ///
    /// Returns `None` when it is already under review.
    pub fn begin_review(&mut self, evaluator: &UserId) -> Option<StatusHistoryEntry> {
        if self.status != NominationStatus::Submitted {
            return None;
        }
        let from = self.status;
        self.status = NominationStatus::UnderReview;
        self.updated_at = Timestamp::now();

        Some(StatusHistoryEntry::transition(
            Entity::Nomination,
            *self.id.as_uuid(),
            from,
            self.status,
            Some(evaluator.clone()),
            self.updated_at,
        ))
    }

    /// Withdraws the nomination on behalf of its nominator or an admin.
    pub fn withdraw(
        &mut self,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<StatusHistoryEntry, SuccessionError> {
        if !actor.is_admin() && actor.user_id != self.nominator_id {
            return Err(SuccessionError::validation(
                "actor",
                "only the nominator or an admin may withdraw a nomination",
            ));
        }

        let from = self.status;
        self.status = from
            .transition_to(NominationStatus::Withdrawn)
            .map_err(|e| SuccessionError::rejected(Entity::Nomination, e))?;
        self.updated_at = Timestamp::now();

        Ok(StatusHistoryEntry::transition(
            Entity::Nomination,
            *self.id.as_uuid(),
            from,
            self.status,
            Some(actor.user_id.clone()),
            self.updated_at,
        )
        .with_notes(reason))
    }
}
