//! Cycle repository port.
//!
//! # Design
//!
//! - **Active-cycle invariant**: at most one cycle per scope that is not
//!   completed or cancelled. Enforced here, at write time.
//! - **History in the same write**: every phase change is stored together
//!   with its status history entry.

use async_trait::async_trait;

use crate::domain::foundation::{CycleId, DomainError};
use crate::domain::succession::{Cycle, StatusHistoryEntry};

/// Repository port for Cycle persistence.
#[async_trait]
pub trait CycleRepository: Send + Sync {
    /// Stores a new cycle and its creation entry.
    ///
    /// # Errors
    ///
    /// - `ActiveCycleExists` if the scope already has an active cycle
    /// - `DatabaseError` on persistence failure
    async fn create(&self, cycle: &Cycle, entry: &StatusHistoryEntry) -> Result<(), DomainError>;

    /// Persists a phase change together with its history entry.
    ///
    /// The stored phase must still equal `entry.from_status`; a cycle moved
    /// by someone else in the meantime yields `Conflict`.
    ///
    /// # Errors
    ///
    /// - `CycleNotFound` if the cycle doesn't exist
    /// - `Conflict` on a concurrent phase change
    /// - `DatabaseError` on persistence failure
    async fn update_phase(&self, cycle: &Cycle, entry: &StatusHistoryEntry)
        -> Result<(), DomainError>;

    /// Find a cycle by its ID.
    async fn find_by_id(&self, id: &CycleId) -> Result<Option<Cycle>, DomainError>;

    /// The cycle of `scope` that is neither completed nor cancelled.
    async fn find_active(&self, scope: &str) -> Result<Option<Cycle>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CycleRepository) {}
    }
}
