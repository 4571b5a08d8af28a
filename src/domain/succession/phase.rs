//! Cycle phase state machine.
//!
//! A succession cycle walks a fixed pipeline one phase at a time:
//!
//! ```text
//! draft -> nominations_open -> evaluation -> applications_open
//!       -> rc_review -> committee_review -> completed
//! ```
//!
//! `cancelled` is reachable from every phase that is not terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Phase of a succession cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    #[default]
    Draft,
    NominationsOpen,
    Evaluation,
    ApplicationsOpen,
    RcReview,
    CommitteeReview,
    Completed,
    Cancelled,
}

impl CyclePhase {
    /// Forward pipeline order, excluding `Cancelled`.
    pub const PIPELINE: [CyclePhase; 7] = [
        CyclePhase::Draft,
        CyclePhase::NominationsOpen,
        CyclePhase::Evaluation,
        CyclePhase::ApplicationsOpen,
        CyclePhase::RcReview,
        CyclePhase::CommitteeReview,
        CyclePhase::Completed,
    ];

    /// All phases, including `Cancelled`.
    pub const ALL: [CyclePhase; 8] = [
        CyclePhase::Draft,
        CyclePhase::NominationsOpen,
        CyclePhase::Evaluation,
        CyclePhase::ApplicationsOpen,
        CyclePhase::RcReview,
        CyclePhase::CommitteeReview,
        CyclePhase::Completed,
        CyclePhase::Cancelled,
    ];

    /// Phases in which records attached to the cycle may still change.
    pub const NON_TERMINAL: [CyclePhase; 6] = [
        CyclePhase::Draft,
        CyclePhase::NominationsOpen,
        CyclePhase::Evaluation,
        CyclePhase::ApplicationsOpen,
        CyclePhase::RcReview,
        CyclePhase::CommitteeReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Draft => "draft",
            CyclePhase::NominationsOpen => "nominations_open",
            CyclePhase::Evaluation => "evaluation",
            CyclePhase::ApplicationsOpen => "applications_open",
            CyclePhase::RcReview => "rc_review",
            CyclePhase::CommitteeReview => "committee_review",
            CyclePhase::Completed => "completed",
            CyclePhase::Cancelled => "cancelled",
        }
    }

    /// The phase that follows this one in the pipeline.
    pub fn next(&self) -> Option<CyclePhase> {
        let idx = Self::PIPELINE.iter().position(|p| p == self)?;
        Self::PIPELINE.get(idx + 1).copied()
    }

    /// True while the cycle counts as the active cycle of its scope.
    pub fn is_active(&self) -> bool {
        !matches!(self, CyclePhase::Completed | CyclePhase::Cancelled)
    }
}

impl StateMachine for CyclePhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        if !self.is_active() {
            return false;
        }
        *target == CyclePhase::Cancelled || self.next() == Some(*target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match (self.is_active(), self.next()) {
            (false, _) => vec![],
            (true, Some(next)) => vec![next, CyclePhase::Cancelled],
            (true, None) => vec![CyclePhase::Cancelled],
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CyclePhase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CyclePhase::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| {
                ValidationError::invalid_format("phase", format!("unknown cycle phase '{}'", s))
            })
    }
}
