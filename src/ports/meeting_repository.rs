//! Meeting repository port (the meeting ledger).

use async_trait::async_trait;

use crate::domain::foundation::{CycleId, DomainError, MeetingId};
use crate::domain::succession::{Meeting, PhaseGate, StatusHistoryEntry};

#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the cycle is outside the gate's phases
    async fn create(
        &self,
        gate: &PhaseGate,
        meeting: &Meeting,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError>;

    /// Persists a status change together with its history entry.
    ///
    /// # Errors
    ///
    /// - `MeetingNotFound` if the meeting doesn't exist
    /// - `InvalidStateTransition` if the cycle is outside the gate's phases
    /// - `Conflict` if the stored status no longer equals `entry.from_status`
    async fn update_status(
        &self,
        gate: &PhaseGate,
        meeting: &Meeting,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &MeetingId) -> Result<Option<Meeting>, DomainError>;

    /// All meetings of a cycle ordered by meeting date.
    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Meeting>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn MeetingRepository) {}
    }
}
