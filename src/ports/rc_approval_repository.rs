//! Regional council approval repository port.

use async_trait::async_trait;

use crate::domain::foundation::{CycleId, DomainError, NominationId};
use crate::domain::succession::{PhaseGate, RcApproval};

#[async_trait]
pub trait RcApprovalRepository: Send + Sync {
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the cycle is outside the gate's phases
    /// - `InvalidStateTransition` if the nomination was withdrawn
    /// - `Conflict` if the nomination is already approved
    /// - `DatabaseError` on persistence failure
    async fn create(&self, gate: &PhaseGate, approval: &RcApproval) -> Result<(), DomainError>;

    async fn find_by_nomination(
        &self,
        nomination_id: &NominationId,
    ) -> Result<Option<RcApproval>, DomainError>;

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<RcApproval>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc_approval_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn RcApprovalRepository) {}
    }
}
