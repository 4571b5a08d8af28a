//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types, the state machine
//! trait and event infrastructure that form the vocabulary of the
//! succession domain.

mod auth;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{Actor, ActorRole};
pub use errors::{DomainError, ErrorCode, TransitionRejected, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{
    ApproachId, CriterionId, CycleId, HistoryEntryId, MeetingId, NominationId, PositionId,
    RcApprovalId, ScoreId, UserId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
