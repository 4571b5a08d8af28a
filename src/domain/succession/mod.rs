//! Succession module - the leadership succession pipeline.
//!
//! A cycle moves candidates from nomination through weighted evaluation,
//! outreach ("approach"), regional council review and committee decision.
//!
//! # Components
//!
//! - `Cycle` / `CyclePhase` - top-level state machine gating every mutation
//! - `Position` / `Criterion` - scoring rubrics per position
//! - `Nomination` - candidates put forward during `nominations_open`
//! - `EvaluationScore` + `WeightedScoreCalculator` - weighted scoring
//! - `Approach` - candidate outreach state
//! - `Meeting` - committee meetings tied to a cycle
//! - `StatisticsAggregator` - response rates and the pending RC review queue
//! - `StatusHistoryEntry` - append-only record of every status change

mod approach;
mod cycle;
mod entity;
mod errors;
mod evaluation;
mod events;
mod history;
mod meeting;
mod nomination;
mod phase;
mod position;
mod rc_approval;
mod scoring;
mod statistics;

pub use approach::{Approach, ApproachStatus};
pub use cycle::{Cycle, PhaseGate};
pub use entity::Entity;
pub use errors::SuccessionError;
pub use evaluation::EvaluationScore;
pub use events::{ApproachCreated, ApproachResponded, CyclePhaseChanged, RcApprovalRecorded};
pub use history::{is_consistent_chain, StatusHistoryEntry};
pub use meeting::{Meeting, MeetingStatus, MeetingType};
pub use nomination::{Nomination, NominationStatus};
pub use phase::CyclePhase;
pub use position::{Criterion, Position, Weight};
pub use rc_approval::RcApproval;
pub use scoring::{
    rank_nominations, CriterionContribution, EvaluatorTotal, NominationScore,
    PartialScoringPolicy, RankedNomination, WeightedScoreCalculator,
};
pub use statistics::{
    completion_ratio, pending_review_queue, ApproachCounts, CycleStatistics, MeetingCompletion,
    NominationCounts, PendingReviewEntry, StatisticsAggregator,
};
