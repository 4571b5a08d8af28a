//! Succession command and query handlers.

mod add_criterion;
mod create_approach;
mod create_cycle;
mod define_position;
mod get_active_cycle;
mod get_nomination_ranking;
mod meetings;
mod record_approach_response;
mod record_rc_approval;
mod reports;
mod submit_evaluation_score;
mod submit_nomination;
mod support;
mod transition_cycle;
mod update_evaluation_score;
mod withdraw_nomination;

#[cfg(test)]
pub(crate) mod testing;

pub use add_criterion::{AddCriterionCommand, AddCriterionHandler};
pub use create_approach::{CreateApproachCommand, CreateApproachHandler};
pub use create_cycle::{CreateCycleCommand, CreateCycleHandler};
pub use define_position::{DefinePositionCommand, DefinePositionHandler};
pub use get_active_cycle::{GetActiveCycleHandler, GetActiveCycleQuery};
pub use get_nomination_ranking::{
    GetNominationRankingHandler, GetNominationRankingQuery, NominationRanking,
};
pub use meetings::{
    CancelMeetingCommand, CancelMeetingHandler, CompleteMeetingCommand, CompleteMeetingHandler,
    ScheduleMeetingCommand, ScheduleMeetingHandler,
};
pub use record_approach_response::{RecordApproachResponseCommand, RecordApproachResponseHandler};
pub use record_rc_approval::{RecordRcApprovalCommand, RecordRcApprovalHandler};
pub use reports::{
    CycleRecords, GetCycleStatisticsHandler, GetCycleStatisticsQuery, GetPendingRcReviewHandler,
    GetPendingRcReviewQuery, GetStatusHistoryHandler, GetStatusHistoryQuery,
};
pub use submit_evaluation_score::{SubmitEvaluationScoreCommand, SubmitEvaluationScoreHandler};
pub use submit_nomination::{SubmitNominationCommand, SubmitNominationHandler};
pub use transition_cycle::{TransitionCycleCommand, TransitionCycleHandler};
pub use update_evaluation_score::{UpdateEvaluationScoreCommand, UpdateEvaluationScoreHandler};
pub use withdraw_nomination::{WithdrawNominationCommand, WithdrawNominationHandler};
