//! Nomination repository port.

use async_trait::async_trait;

use crate::domain::foundation::{CycleId, DomainError, NominationId, PositionId};
use crate::domain::succession::{Nomination, PhaseGate, StatusHistoryEntry};

/// Repository port for nominations.
#[async_trait]
pub trait NominationRepository: Send + Sync {
    /// Stores a new nomination and its creation entry.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the cycle is outside the gate's phases
    /// - `Conflict` if the nominee already has an active nomination for the
    ///   position in this cycle
    /// - `DatabaseError` on persistence failure
    async fn create(
        &self,
        gate: &PhaseGate,
        nomination: &Nomination,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError>;

    /// Persists a status change together with its history entry.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the cycle is outside the gate's phases
    /// - `NominationNotFound` if the nomination doesn't exist
    /// - `Conflict` if the stored status no longer equals `entry.from_status`
    async fn update_status(
        &self,
        gate: &PhaseGate,
        nomination: &Nomination,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &NominationId) -> Result<Option<Nomination>, DomainError>;

    /// All nominations of a cycle, oldest first.
    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Nomination>, DomainError>;

    /// All nominations for a position, oldest first.
    async fn list_by_position(
        &self,
        position_id: &PositionId,
    ) -> Result<Vec<Nomination>, DomainError>;
}
