//! Helpers shared by the succession handlers.

use crate::domain::foundation::{
    Actor, ApproachId, CycleId, DomainError, MeetingId, NominationId, PositionId,
    SerializableDomainEvent,
};
use crate::domain::succession::{
    Approach, Cycle, CyclePhase, Entity, Meeting, Nomination, PhaseGate, Position,
    SuccessionError,
};
use crate::ports::{
    ApproachRepository, CycleRepository, EventPublisher, MeetingRepository, NominationRepository,
    PositionRepository,
};

/// Phases each gated operation may run in.
pub(crate) mod gates {
    use crate::domain::succession::CyclePhase::{self, *};

    pub const RUBRIC: &[CyclePhase] = &[Draft, NominationsOpen];
    pub const NOMINATION: &[CyclePhase] = &[NominationsOpen];
    pub const EVALUATION: &[CyclePhase] = &[Evaluation];
    pub const APPROACH: &[CyclePhase] = &[ApplicationsOpen];
    pub const APPROACH_RESPONSE: &[CyclePhase] = &[ApplicationsOpen, RcReview];
    pub const RC_APPROVAL: &[CyclePhase] = &[RcReview];
}

/// Converts a port error, logging storage failures at the point they surface.
pub(crate) fn from_store(err: DomainError) -> SuccessionError {
    let err = SuccessionError::from(err);
    if let SuccessionError::Internal(message) = &err {
        tracing::error!(error = %message, "succession store failure");
    }
    err
}

pub(crate) async fn load_cycle(
    cycles: &dyn CycleRepository,
    id: &CycleId,
) -> Result<Cycle, SuccessionError> {
    cycles
        .find_by_id(id)
        .await
        .map_err(from_store)?
        .ok_or_else(|| SuccessionError::not_found(Entity::Cycle, id))
}

/// Loads the cycle and checks it is in one of `allowed`.
///
/// The returned gate goes to the store, which checks it again inside the
/// write.
pub(crate) async fn gated_cycle(
    cycles: &dyn CycleRepository,
    id: &CycleId,
    allowed: &'static [CyclePhase],
    operation: &'static str,
) -> Result<(Cycle, PhaseGate), SuccessionError> {
    let cycle = load_cycle(cycles, id).await?;
    let gate = cycle.ensure_phase(allowed, operation)?;
    Ok((cycle, gate))
}

/// Like [`gated_cycle`] for operations allowed in any non-terminal phase.
pub(crate) async fn mutable_cycle(
    cycles: &dyn CycleRepository,
    id: &CycleId,
    operation: &'static str,
) -> Result<(Cycle, PhaseGate), SuccessionError> {
    let cycle = load_cycle(cycles, id).await?;
    let gate = cycle.ensure_mutable(operation)?;
    Ok((cycle, gate))
}

pub(crate) async fn load_position(
    positions: &dyn PositionRepository,
    id: &PositionId,
) -> Result<Position, SuccessionError> {
    positions
        .find_position(id)
        .await
        .map_err(from_store)?
        .ok_or_else(|| SuccessionError::not_found(Entity::Position, id))
}

pub(crate) async fn load_nomination(
    nominations: &dyn NominationRepository,
    id: &NominationId,
) -> Result<Nomination, SuccessionError> {
    nominations
        .find_by_id(id)
        .await
        .map_err(from_store)?
        .ok_or_else(|| SuccessionError::not_found(Entity::Nomination, id))
}

pub(crate) async fn load_approach(
    approaches: &dyn ApproachRepository,
    id: &ApproachId,
) -> Result<Approach, SuccessionError> {
    approaches
        .find_by_id(id)
        .await
        .map_err(from_store)?
        .ok_or_else(|| SuccessionError::not_found(Entity::Approach, id))
}

pub(crate) async fn load_meeting(
    meetings: &dyn MeetingRepository,
    id: &MeetingId,
) -> Result<Meeting, SuccessionError> {
    meetings
        .find_by_id(id)
        .await
        .map_err(from_store)?
        .ok_or_else(|| SuccessionError::not_found(Entity::Meeting, id))
}

/// Publishes after commit. Failures are logged and swallowed; the state
/// change they describe has already happened.
pub(crate) async fn publish_best_effort<E>(
    publisher: &dyn EventPublisher,
    event: &E,
    actor: Option<&Actor>,
) where
    E: SerializableDomainEvent,
{
    let envelope = match event.to_envelope() {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::warn!(event_type = event.event_type(), error = %err, "failed to encode succession event");
            return;
        }
    };
    let envelope = match actor {
        Some(actor) => envelope.with_user_id(actor.user_id.as_str()),
        None => envelope,
    };

    if let Err(err) = publisher.publish(envelope).await {
        tracing::warn!(
            event_type = event.event_type(),
            aggregate_id = %event.aggregate_id(),
            error = %err,
            "failed to publish succession event"
        );
    }
}
