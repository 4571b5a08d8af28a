//! Approach repository port.

use async_trait::async_trait;

use crate::domain::foundation::{ApproachId, CycleId, DomainError};
use crate::domain::succession::{Approach, PhaseGate, StatusHistoryEntry};

/// Repository port for candidate approaches.
#[async_trait]
pub trait ApproachRepository: Send + Sync {
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the cycle is outside the gate's phases
    /// - `Conflict` if the nominee was already approached for the position
    ///   in this cycle
    /// - `DatabaseError` on persistence failure
    async fn create(
        &self,
        gate: &PhaseGate,
        approach: &Approach,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError>;

    /// Persists a response together with its history entry.
    ///
    /// # Errors
    ///
    /// - `ApproachNotFound` if the approach doesn't exist
    /// - `InvalidStateTransition` if the cycle is outside the gate's phases
    /// - `Conflict` if the stored status no longer equals `entry.from_status`
    async fn update_response(
        &self,
        gate: &PhaseGate,
        approach: &Approach,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ApproachId) -> Result<Option<Approach>, DomainError>;

    /// All approaches of a cycle, oldest first.
    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Approach>, DomainError>;
}
