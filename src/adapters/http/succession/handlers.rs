//! HTTP handlers for succession endpoints.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::adapters::http::middleware::{OptionalActor, RequireActor};
use crate::adapters::wiring::SuccessionPorts;
use crate::application::handlers::succession::{
    AddCriterionCommand, AddCriterionHandler, CancelMeetingCommand, CancelMeetingHandler,
    CompleteMeetingCommand, CompleteMeetingHandler, CreateApproachCommand, CreateApproachHandler,
    CreateCycleCommand, CreateCycleHandler, DefinePositionCommand, DefinePositionHandler,
    GetActiveCycleHandler, GetActiveCycleQuery, GetCycleStatisticsHandler,
    GetCycleStatisticsQuery, GetNominationRankingHandler, GetNominationRankingQuery,
    GetPendingRcReviewHandler, GetPendingRcReviewQuery, GetStatusHistoryHandler,
    GetStatusHistoryQuery, RecordApproachResponseCommand, RecordApproachResponseHandler,
    RecordRcApprovalCommand, RecordRcApprovalHandler, ScheduleMeetingCommand,
    ScheduleMeetingHandler, SubmitEvaluationScoreCommand, SubmitEvaluationScoreHandler,
    SubmitNominationCommand, SubmitNominationHandler, TransitionCycleCommand,
    TransitionCycleHandler, UpdateEvaluationScoreCommand, UpdateEvaluationScoreHandler,
    WithdrawNominationCommand, WithdrawNominationHandler,
};
use crate::domain::foundation::{UserId, ValidationError};
use crate::domain::succession::{Entity, PartialScoringPolicy, SuccessionError};

use super::dto::{
    AddCriterionRequest, ApproachResponse, ApproachResponseRequest, CancelMeetingRequest,
    CompleteMeetingRequest, CreateApproachRequest, CreateCycleRequest, CriterionResponse,
    CycleResponse, DefinePositionRequest, ErrorResponse, MeetingResponse, NominationResponse,
    PositionResponse, RankingResponse, RcApprovalRequest, RcApprovalResponse,
    ScheduleMeetingRequest, ScoreRequest, ScoreResponse, SubmitNominationRequest,
    TransitionCycleRequest, WithdrawNominationRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SuccessionHandlers {
    create_cycle: Arc<CreateCycleHandler>,
    transition_cycle: Arc<TransitionCycleHandler>,
    active_cycle: Arc<GetActiveCycleHandler>,
    define_position: Arc<DefinePositionHandler>,
    add_criterion: Arc<AddCriterionHandler>,
    submit_nomination: Arc<SubmitNominationHandler>,
    withdraw_nomination: Arc<WithdrawNominationHandler>,
    submit_score: Arc<SubmitEvaluationScoreHandler>,
    update_score: Arc<UpdateEvaluationScoreHandler>,
    ranking: Arc<GetNominationRankingHandler>,
    create_approach: Arc<CreateApproachHandler>,
    record_response: Arc<RecordApproachResponseHandler>,
    schedule_meeting: Arc<ScheduleMeetingHandler>,
    complete_meeting: Arc<CompleteMeetingHandler>,
    cancel_meeting: Arc<CancelMeetingHandler>,
    rc_approval: Arc<RecordRcApprovalHandler>,
    statistics: Arc<GetCycleStatisticsHandler>,
    pending_review: Arc<GetPendingRcReviewHandler>,
    history: Arc<GetStatusHistoryHandler>,
}

impl SuccessionHandlers {
    pub fn new(ports: SuccessionPorts, policy: PartialScoringPolicy) -> Self {
        let p = ports;
        Self {
            create_cycle: Arc::new(CreateCycleHandler::new(p.cycles.clone())),
            transition_cycle: Arc::new(TransitionCycleHandler::new(
                p.cycles.clone(),
                p.publisher.clone(),
            )),
            active_cycle: Arc::new(GetActiveCycleHandler::new(p.cycles.clone())),
            define_position: Arc::new(DefinePositionHandler::new(
                p.cycles.clone(),
                p.positions.clone(),
            )),
            add_criterion: Arc::new(AddCriterionHandler::new(p.cycles.clone(), p.positions.clone())),
            submit_nomination: Arc::new(SubmitNominationHandler::new(
                p.cycles.clone(),
                p.positions.clone(),
                p.nominations.clone(),
            )),
            withdraw_nomination: Arc::new(WithdrawNominationHandler::new(
                p.cycles.clone(),
                p.nominations.clone(),
            )),
            submit_score: Arc::new(SubmitEvaluationScoreHandler::new(
                p.cycles.clone(),
                p.positions.clone(),
                p.nominations.clone(),
                p.evaluations.clone(),
            )),
            update_score: Arc::new(UpdateEvaluationScoreHandler::new(
                p.cycles.clone(),
                p.positions.clone(),
                p.nominations.clone(),
                p.evaluations.clone(),
            )),
            ranking: Arc::new(GetNominationRankingHandler::new(
                p.positions.clone(),
                p.nominations.clone(),
                p.evaluations.clone(),
                policy,
            )),
            create_approach: Arc::new(CreateApproachHandler::new(
                p.cycles.clone(),
                p.positions.clone(),
                p.approaches.clone(),
                p.publisher.clone(),
            )),
            record_response: Arc::new(RecordApproachResponseHandler::new(
                p.cycles.clone(),
                p.approaches.clone(),
                p.publisher.clone(),
            )),
            schedule_meeting: Arc::new(ScheduleMeetingHandler::new(
                p.cycles.clone(),
                p.meetings.clone(),
            )),
            complete_meeting: Arc::new(CompleteMeetingHandler::new(
                p.cycles.clone(),
                p.meetings.clone(),
            )),
            cancel_meeting: Arc::new(CancelMeetingHandler::new(
                p.cycles.clone(),
                p.meetings.clone(),
            )),
            rc_approval: Arc::new(RecordRcApprovalHandler::new(
                p.cycles.clone(),
                p.nominations.clone(),
                p.approaches.clone(),
                p.approvals.clone(),
                p.publisher.clone(),
            )),
            statistics: Arc::new(GetCycleStatisticsHandler::new(p.records())),
            pending_review: Arc::new(GetPendingRcReviewHandler::new(p.records())),
            history: Arc::new(GetStatusHistoryHandler::new(p.history.clone())),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

/// Error type of every succession endpoint.
#[derive(Debug)]
pub struct ApiError(SuccessionError);

impl From<SuccessionError> for ApiError {
    fn from(err: SuccessionError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(SuccessionError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        handle_succession_error(self.0)
    }
}

fn handle_succession_error(error: SuccessionError) -> Response {
    let code = error.code().to_string();
    match error {
        SuccessionError::Validation(ref inner) => {
            let body = ErrorResponse::new(code, error.to_string()).with_field(inner.field());
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        SuccessionError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(code, error.to_string())),
        )
            .into_response(),
        SuccessionError::StateTransition { .. } | SuccessionError::Conflict(_) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(code, error.to_string())),
        )
            .into_response(),
        SuccessionError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(code, "Internal server error")),
        )
            .into_response(),
    }
}

fn parse_id<T: FromStr>(field: &'static str, raw: &str) -> Result<T, ApiError> {
    raw.parse::<T>()
        .map_err(|_| ValidationError::invalid_format(field, "not a valid UUID").into())
}

fn parse_user(field: &'static str, raw: &str) -> Result<UserId, ApiError> {
    UserId::new(raw).map_err(|_| ValidationError::empty_field(field).into())
}

type ApiResult = Result<Response, ApiError>;

// ════════════════════════════════════════════════════════════════════════════
// Cycles
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/succession/cycles
pub async fn create_cycle(
    State(handlers): State<SuccessionHandlers>,
    OptionalActor(actor): OptionalActor,
    Json(req): Json<CreateCycleRequest>,
) -> ApiResult {
    let cycle = handlers
        .create_cycle
        .handle(CreateCycleCommand {
            scope: req.scope,
            name: req.name,
            year: req.year,
            description: req.description,
            actor,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CycleResponse::from(cycle))).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ActiveCycleParams {
    pub scope: String,
}

/// GET /api/succession/active-cycle?scope=
pub async fn get_active_cycle(
    State(handlers): State<SuccessionHandlers>,
    Query(params): Query<ActiveCycleParams>,
) -> ApiResult {
    let scope = params.scope;
    match handlers
        .active_cycle
        .handle(GetActiveCycleQuery {
            scope: scope.clone(),
        })
        .await?
    {
        Some(cycle) => Ok((StatusCode::OK, Json(CycleResponse::from(cycle))).into_response()),
        None => Err(SuccessionError::not_found(Entity::Cycle, format!("active in '{}'", scope)).into()),
    }
}

/// POST /api/succession/cycles/:id/transition
pub async fn transition_cycle(
    State(handlers): State<SuccessionHandlers>,
    OptionalActor(actor): OptionalActor,
    Path(cycle_id): Path<String>,
    Json(req): Json<TransitionCycleRequest>,
) -> ApiResult {
    let cycle = handlers
        .transition_cycle
        .handle(TransitionCycleCommand {
            cycle_id: parse_id("cycle_id", &cycle_id)?,
            target_phase: req.target_phase,
            actor,
            notes: req.notes,
        })
        .await?;
    Ok((StatusCode::OK, Json(CycleResponse::from(cycle))).into_response())
}

/// GET /api/succession/cycles/:id/statistics
pub async fn get_cycle_statistics(
    State(handlers): State<SuccessionHandlers>,
    Path(cycle_id): Path<String>,
) -> ApiResult {
    let stats = handlers
        .statistics
        .handle(GetCycleStatisticsQuery {
            cycle_id: parse_id("cycle_id", &cycle_id)?,
        })
        .await?;
    Ok((StatusCode::OK, Json(stats)).into_response())
}

/// GET /api/succession/cycles/:id/pending-rc-review
pub async fn get_pending_rc_review(
    State(handlers): State<SuccessionHandlers>,
    Path(cycle_id): Path<String>,
) -> ApiResult {
    let queue = handlers
        .pending_review
        .handle(GetPendingRcReviewQuery {
            cycle_id: parse_id("cycle_id", &cycle_id)?,
        })
        .await?;
    Ok((StatusCode::OK, Json(queue)).into_response())
}

// ════════════════════════════════════════════════════════════════════════════
// Positions and criteria
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/succession/cycles/:id/positions
pub async fn define_position(
    State(handlers): State<SuccessionHandlers>,
    Path(cycle_id): Path<String>,
    Json(req): Json<DefinePositionRequest>,
) -> ApiResult {
    let position = handlers
        .define_position
        .handle(DefinePositionCommand {
            cycle_id: parse_id("cycle_id", &cycle_id)?,
            title: req.title,
            hierarchy_level: req.hierarchy_level,
            description: req.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(PositionResponse::from(position))).into_response())
}

/// POST /api/succession/positions/:id/criteria
pub async fn add_criterion(
    State(handlers): State<SuccessionHandlers>,
    Path(position_id): Path<String>,
    Json(req): Json<AddCriterionRequest>,
) -> ApiResult {
    let criterion = handlers
        .add_criterion
        .handle(AddCriterionCommand {
            position_id: parse_id("position_id", &position_id)?,
            name: req.name,
            weight: req.weight,
            max_score: req.max_score,
            display_order: req.display_order,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CriterionResponse::from(criterion))).into_response())
}

/// GET /api/succession/positions/:id/ranking
pub async fn get_nomination_ranking(
    State(handlers): State<SuccessionHandlers>,
    Path(position_id): Path<String>,
) -> ApiResult {
    let ranking = handlers
        .ranking
        .handle(GetNominationRankingQuery {
            position_id: parse_id("position_id", &position_id)?,
        })
        .await?;
    Ok((StatusCode::OK, Json(RankingResponse::from(ranking))).into_response())
}

// ════════════════════════════════════════════════════════════════════════════
// Nominations and scores
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/succession/cycles/:id/nominations
pub async fn submit_nomination(
    State(handlers): State<SuccessionHandlers>,
    RequireActor(actor): RequireActor,
    Path(cycle_id): Path<String>,
    Json(req): Json<SubmitNominationRequest>,
) -> ApiResult {
    let nomination = handlers
        .submit_nomination
        .handle(SubmitNominationCommand {
            cycle_id: parse_id("cycle_id", &cycle_id)?,
            position_id: parse_id("position_id", &req.position_id)?,
            nominee_id: parse_user("nominee_id", &req.nominee_id)?,
            nominator_id: actor.user_id,
            reason: req.reason,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(NominationResponse::from(nomination))).into_response())
}

/// POST /api/succession/nominations/:id/withdraw
pub async fn withdraw_nomination(
    State(handlers): State<SuccessionHandlers>,
    RequireActor(actor): RequireActor,
    Path(nomination_id): Path<String>,
    Json(req): Json<WithdrawNominationRequest>,
) -> ApiResult {
    let nomination = handlers
        .withdraw_nomination
        .handle(WithdrawNominationCommand {
            nomination_id: parse_id("nomination_id", &nomination_id)?,
            actor,
            reason: req.reason,
        })
        .await?;
    Ok((StatusCode::OK, Json(NominationResponse::from(nomination))).into_response())
}

/// POST /api/succession/nominations/:id/scores
pub async fn submit_evaluation_score(
    State(handlers): State<SuccessionHandlers>,
    RequireActor(actor): RequireActor,
    Path(nomination_id): Path<String>,
    Json(req): Json<ScoreRequest>,
) -> ApiResult {
    let score = handlers
        .submit_score
        .handle(SubmitEvaluationScoreCommand {
            nomination_id: parse_id("nomination_id", &nomination_id)?,
            evaluator_id: actor.user_id,
            criterion_id: parse_id("criterion_id", &req.criterion_id)?,
            raw_score: req.raw_score,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ScoreResponse::from(score))).into_response())
}

/// PUT /api/succession/nominations/:id/scores
pub async fn update_evaluation_score(
    State(handlers): State<SuccessionHandlers>,
    RequireActor(actor): RequireActor,
    Path(nomination_id): Path<String>,
    Json(req): Json<ScoreRequest>,
) -> ApiResult {
    let score = handlers
        .update_score
        .handle(UpdateEvaluationScoreCommand {
            nomination_id: parse_id("nomination_id", &nomination_id)?,
            evaluator_id: actor.user_id,
            criterion_id: parse_id("criterion_id", &req.criterion_id)?,
            raw_score: req.raw_score,
        })
        .await?;
    Ok((StatusCode::OK, Json(ScoreResponse::from(score))).into_response())
}

/// POST /api/succession/nominations/:id/rc-approval
pub async fn record_rc_approval(
    State(handlers): State<SuccessionHandlers>,
    RequireActor(actor): RequireActor,
    Path(nomination_id): Path<String>,
    Json(req): Json<RcApprovalRequest>,
) -> ApiResult {
    let approval = handlers
        .rc_approval
        .handle(RecordRcApprovalCommand {
            nomination_id: parse_id("nomination_id", &nomination_id)?,
            actor,
            notes: req.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(RcApprovalResponse::from(approval))).into_response())
}

// ════════════════════════════════════════════════════════════════════════════
// Approaches
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/succession/cycles/:id/approaches
pub async fn create_approach(
    State(handlers): State<SuccessionHandlers>,
    OptionalActor(actor): OptionalActor,
    Path(cycle_id): Path<String>,
    Json(req): Json<CreateApproachRequest>,
) -> ApiResult {
    let approach = handlers
        .create_approach
        .handle(CreateApproachCommand {
            cycle_id: parse_id("cycle_id", &cycle_id)?,
            nominee_id: parse_user("nominee_id", &req.nominee_id)?,
            position_id: parse_id("position_id", &req.position_id)?,
            actor,
            notes: req.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ApproachResponse::from(approach))).into_response())
}

/// POST /api/succession/approaches/:id/response
pub async fn record_approach_response(
    State(handlers): State<SuccessionHandlers>,
    OptionalActor(actor): OptionalActor,
    Path(approach_id): Path<String>,
    Json(req): Json<ApproachResponseRequest>,
) -> ApiResult {
    let approach = handlers
        .record_response
        .handle(RecordApproachResponseCommand {
            approach_id: parse_id("approach_id", &approach_id)?,
            response: req.response,
            actor,
            notes: req.notes,
        })
        .await?;
    Ok((StatusCode::OK, Json(ApproachResponse::from(approach))).into_response())
}

// ════════════════════════════════════════════════════════════════════════════
// Meetings
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/succession/cycles/:id/meetings
pub async fn schedule_meeting(
    State(handlers): State<SuccessionHandlers>,
    OptionalActor(actor): OptionalActor,
    Path(cycle_id): Path<String>,
    Json(req): Json<ScheduleMeetingRequest>,
) -> ApiResult {
    let meeting = handlers
        .schedule_meeting
        .handle(ScheduleMeetingCommand {
            cycle_id: parse_id("cycle_id", &cycle_id)?,
            meeting_type: req.meeting_type,
            meeting_date: req.meeting_date,
            actor,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(MeetingResponse::from(meeting))).into_response())
}

/// POST /api/succession/meetings/:id/complete
pub async fn complete_meeting(
    State(handlers): State<SuccessionHandlers>,
    OptionalActor(actor): OptionalActor,
    Path(meeting_id): Path<String>,
    Json(req): Json<CompleteMeetingRequest>,
) -> ApiResult {
    let meeting = handlers
        .complete_meeting
        .handle(CompleteMeetingCommand {
            meeting_id: parse_id("meeting_id", &meeting_id)?,
            outcome_notes: req.outcome_notes,
            actor,
        })
        .await?;
    Ok((StatusCode::OK, Json(MeetingResponse::from(meeting))).into_response())
}

/// POST /api/succession/meetings/:id/cancel
pub async fn cancel_meeting(
    State(handlers): State<SuccessionHandlers>,
    OptionalActor(actor): OptionalActor,
    Path(meeting_id): Path<String>,
    Json(req): Json<CancelMeetingRequest>,
) -> ApiResult {
    let meeting = handlers
        .cancel_meeting
        .handle(CancelMeetingCommand {
            meeting_id: parse_id("meeting_id", &meeting_id)?,
            reason: req.reason,
            actor,
        })
        .await?;
    Ok((StatusCode::OK, Json(MeetingResponse::from(meeting))).into_response())
}

// ════════════════════════════════════════════════════════════════════════════
// History
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/succession/history/:entity/:id
pub async fn get_status_history(
    State(handlers): State<SuccessionHandlers>,
    Path((entity, entity_id)): Path<(String, String)>,
) -> ApiResult {
    let entity: Entity = entity.parse()?;
    let entity_id: Uuid = parse_id("entity_id", &entity_id)?;
    let history = handlers
        .history
        .handle(GetStatusHistoryQuery { entity, entity_id })
        .await?;
    Ok((StatusCode::OK, Json(history)).into_response())
}
