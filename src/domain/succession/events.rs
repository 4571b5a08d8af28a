//! Succession domain events.
//!
//! Published after commit for the notification dispatcher:
//! - `CyclePhaseChanged` - Cycle moved to a new phase
//! - `ApproachCreated` - Nominee approached for a position
//! - `ApproachResponded` - Nominee answered an approach
//! - `RcApprovalRecorded` - Regional council signed off a nomination

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    domain_event, ApproachId, CycleId, EventId, NominationId, PositionId, RcApprovalId,
    Timestamp, UserId,
};

use super::{Approach, ApproachStatus, Cycle, CyclePhase, RcApproval};

// ════════════════════════════════════════════════════════════════════════════
// CyclePhaseChanged
// ════════════════════════════════════════════════════════════════════════════

/// Published when a cycle advances or is cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclePhaseChanged {
    pub event_id: EventId,
    pub cycle_id: CycleId,
    pub scope: String,
    pub from_phase: CyclePhase,
    pub to_phase: CyclePhase,
    pub changed_by: Option<UserId>,
    pub changed_at: Timestamp,
}

domain_event!(
    CyclePhaseChanged,
    event_type = "succession.cycle_phase_changed.v1",
    aggregate_id = cycle_id,
    aggregate_type = "Cycle",
    occurred_at = changed_at,
    event_id = event_id
);

impl CyclePhaseChanged {
    pub fn new(cycle: &Cycle, from_phase: CyclePhase, changed_by: Option<UserId>) -> Self {
        Self {
            event_id: EventId::new(),
            cycle_id: cycle.id,
            scope: cycle.scope.clone(),
            from_phase,
            to_phase: cycle.phase,
            changed_by,
            changed_at: cycle.updated_at,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ApproachCreated
// ════════════════════════════════════════════════════════════════════════════

/// Published when a nominee is approached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproachCreated {
    pub event_id: EventId,
    pub approach_id: ApproachId,
    pub cycle_id: CycleId,
    pub nominee_id: UserId,
    pub position_id: PositionId,
    pub approached_by: Option<UserId>,
    pub approached_at: Timestamp,
}

domain_event!(
    ApproachCreated,
    event_type = "succession.approach_created.v1",
    aggregate_id = approach_id,
    aggregate_type = "Approach",
    occurred_at = approached_at,
    event_id = event_id
);

impl From<&Approach> for ApproachCreated {
    fn from(approach: &Approach) -> Self {
        Self {
            event_id: EventId::new(),
            approach_id: approach.id,
            cycle_id: approach.cycle_id,
            nominee_id: approach.nominee_id.clone(),
            position_id: approach.position_id,
            approached_by: approach.approached_by.clone(),
            approached_at: approach.approached_at,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ApproachResponded
// ════════════════════════════════════════════════════════════════════════════

/// Published when a nominee answers, including conditional answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproachResponded {
    pub event_id: EventId,
    pub approach_id: ApproachId,
    pub cycle_id: CycleId,
    pub nominee_id: UserId,
    pub previous_status: ApproachStatus,
    pub response_status: ApproachStatus,
    pub responded_at: Timestamp,
}

domain_event!(
    ApproachResponded,
    event_type = "succession.approach_responded.v1",
    aggregate_id = approach_id,
    aggregate_type = "Approach",
    occurred_at = responded_at,
    event_id = event_id
);

impl ApproachResponded {
    pub fn new(approach: &Approach, previous_status: ApproachStatus, at: Timestamp) -> Self {
        Self {
            event_id: EventId::new(),
            approach_id: approach.id,
            cycle_id: approach.cycle_id,
            nominee_id: approach.nominee_id.clone(),
            previous_status,
            response_status: approach.response_status,
            responded_at: at,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RcApprovalRecorded
// ════════════════════════════════════════════════════════════════════════════

/// Published when the regional council approves a nomination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcApprovalRecorded {
    pub event_id: EventId,
    pub approval_id: RcApprovalId,
    pub cycle_id: CycleId,
    pub nomination_id: NominationId,
    pub approved_by: UserId,
    pub approved_at: Timestamp,
}

domain_event!(
    RcApprovalRecorded,
    event_type = "succession.rc_approval_recorded.v1",
    aggregate_id = nomination_id,
    aggregate_type = "Nomination",
    occurred_at = approved_at,
    event_id = event_id
);

impl From<&RcApproval> for RcApprovalRecorded {
    fn from(approval: &RcApproval) -> Self {
        Self {
            event_id: EventId::new(),
            approval_id: approval.id,
            cycle_id: approval.cycle_id,
            nomination_id: approval.nomination_id,
            approved_by: approval.approved_by.clone(),
            approved_at: approval.approved_at,
        }
    }
}
