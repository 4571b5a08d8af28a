//! HTTP DTOs for succession endpoints.
//!
//! Requests carry identifiers as strings so malformed ids surface as 400s
//! from the handlers instead of extractor rejections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::handlers::succession::NominationRanking;
use crate::domain::foundation::Timestamp;
use crate::domain::succession::{
    Approach, ApproachStatus, Criterion, Cycle, CyclePhase, EvaluationScore, Meeting,
    MeetingStatus, MeetingType, Nomination, NominationScore, NominationStatus,
    PartialScoringPolicy, Position, RankedNomination, RcApproval,
};

fn rfc3339(ts: &Timestamp) -> String {
    ts.as_datetime().to_rfc3339()
}

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCycleRequest {
    pub scope: String,
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionCycleRequest {
    pub target_phase: CyclePhase,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefinePositionRequest {
    pub title: String,
    pub hierarchy_level: u16,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddCriterionRequest {
    pub name: String,
    pub weight: u8,
    pub max_score: u32,
    #[serde(default)]
    pub display_order: u32,
}

/// The nominator is the calling actor.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitNominationRequest {
    pub position_id: String,
    pub nominee_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WithdrawNominationRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// The evaluator is the calling actor.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub criterion_id: String,
    pub raw_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApproachRequest {
    pub nominee_id: String,
    pub position_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApproachResponseRequest {
    pub response: ApproachStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleMeetingRequest {
    pub meeting_type: MeetingType,
    pub meeting_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteMeetingRequest {
    #[serde(default)]
    pub outcome_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelMeetingRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RcApprovalRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct CycleResponse {
    pub id: String,
    pub scope: String,
    pub name: String,
    pub year: i32,
    pub phase: CyclePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Cycle> for CycleResponse {
    fn from(cycle: Cycle) -> Self {
        Self {
            id: cycle.id.to_string(),
            scope: cycle.scope,
            name: cycle.name,
            year: cycle.year,
            phase: cycle.phase,
            description: cycle.description,
            created_at: rfc3339(&cycle.created_at),
            updated_at: rfc3339(&cycle.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionResponse {
    pub id: String,
    pub cycle_id: String,
    pub title: String,
    pub hierarchy_level: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<Position> for PositionResponse {
    fn from(position: Position) -> Self {
        Self {
            id: position.id.to_string(),
            cycle_id: position.cycle_id.to_string(),
            title: position.title,
            hierarchy_level: position.hierarchy_level,
            description: position.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CriterionResponse {
    pub id: String,
    pub position_id: String,
    pub name: String,
    pub weight: u8,
    pub max_score: u32,
    pub display_order: u32,
}

impl From<Criterion> for CriterionResponse {
    fn from(criterion: Criterion) -> Self {
        Self {
            id: criterion.id.to_string(),
            position_id: criterion.position_id.to_string(),
            name: criterion.name,
            weight: criterion.weight.value(),
            max_score: criterion.max_score,
            display_order: criterion.display_order,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NominationResponse {
    pub id: String,
    pub cycle_id: String,
    pub position_id: String,
    pub nominee_id: String,
    pub nominator_id: String,
    pub status: NominationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: String,
}

impl From<Nomination> for NominationResponse {
    fn from(nomination: Nomination) -> Self {
        Self {
            id: nomination.id.to_string(),
            cycle_id: nomination.cycle_id.to_string(),
            position_id: nomination.position_id.to_string(),
            nominee_id: nomination.nominee_id.to_string(),
            nominator_id: nomination.nominator_id.to_string(),
            status: nomination.status,
            reason: nomination.reason,
            created_at: rfc3339(&nomination.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub id: String,
    pub nomination_id: String,
    pub evaluator_id: String,
    pub criterion_id: String,
    pub raw_score: f64,
    pub updated_at: String,
}

impl From<EvaluationScore> for ScoreResponse {
    fn from(score: EvaluationScore) -> Self {
        Self {
            id: score.id.to_string(),
            nomination_id: score.nomination_id.to_string(),
            evaluator_id: score.evaluator_id.to_string(),
            criterion_id: score.criterion_id.to_string(),
            raw_score: score.raw_score,
            updated_at: rfc3339(&score.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproachResponse {
    pub id: String,
    pub cycle_id: String,
    pub nominee_id: String,
    pub position_id: String,
    pub response_status: ApproachStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approached_by: Option<String>,
    pub approached_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<Approach> for ApproachResponse {
    fn from(approach: Approach) -> Self {
        Self {
            id: approach.id.to_string(),
            cycle_id: approach.cycle_id.to_string(),
            nominee_id: approach.nominee_id.to_string(),
            position_id: approach.position_id.to_string(),
            response_status: approach.response_status,
            approached_by: approach.approached_by.map(|u| u.to_string()),
            approached_at: rfc3339(&approach.approached_at),
            responded_at: approach.responded_at.as_ref().map(rfc3339),
            notes: approach.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeetingResponse {
    pub id: String,
    pub cycle_id: String,
    pub meeting_type: MeetingType,
    pub meeting_date: String,
    pub status: MeetingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome_notes: Option<String>,
}

impl From<Meeting> for MeetingResponse {
    fn from(meeting: Meeting) -> Self {
        Self {
            id: meeting.id.to_string(),
            cycle_id: meeting.cycle_id.to_string(),
            meeting_type: meeting.meeting_type,
            meeting_date: meeting.meeting_date.to_rfc3339(),
            status: meeting.status,
            outcome_notes: meeting.outcome_notes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RcApprovalResponse {
    pub id: String,
    pub nomination_id: String,
    pub approved_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub approved_at: String,
}

impl From<RcApproval> for RcApprovalResponse {
    fn from(approval: RcApproval) -> Self {
        Self {
            id: approval.id.to_string(),
            nomination_id: approval.nomination_id.to_string(),
            approved_by: approval.approved_by.to_string(),
            notes: approval.notes,
            approved_at: rfc3339(&approval.approved_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingResponse {
    pub position_id: String,
    pub policy: PartialScoringPolicy,
    pub ranked: Vec<RankedNomination>,
    pub scores: Vec<NominationScore>,
}

impl From<NominationRanking> for RankingResponse {
    fn from(ranking: NominationRanking) -> Self {
        Self {
            position_id: ranking.position_id.to_string(),
            policy: ranking.policy,
            ranked: ranking.ranked,
            scores: ranking.scores,
        }
    }
}

/// Error body for all failed requests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CycleId, PositionId, UserId};

    #[test]
    fn transition_request_reads_snake_case_phase() {
        let req: TransitionCycleRequest =
            serde_json::from_str(r#"{"target_phase":"nominations_open"}"#).unwrap();
        assert_eq!(req.target_phase, CyclePhase::NominationsOpen);
        assert!(req.notes.is_none());
    }

    #[test]
    fn approach_response_omits_unset_fields() {
        let (approach, _) = Approach::create(
            CycleId::new(),
            UserId::new("nominee-1").unwrap(),
            PositionId::new(),
            None,
            None,
        );

        let json = serde_json::to_value(ApproachResponse::from(approach)).unwrap();

        assert_eq!(json["response_status"], "pending");
        assert!(json.get("responded_at").is_none());
        assert!(json.get("approached_by").is_none());
    }

    #[test]
    fn error_response_carries_field() {
        let error = ErrorResponse::new("VALIDATION_ERROR", "must not be empty").with_field("name");
        let json = serde_json::to_value(error).unwrap();
        assert_eq!(json["field"], "name");
    }
}
