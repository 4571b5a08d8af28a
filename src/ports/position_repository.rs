//! Position and criteria repository port (the criteria store).

use async_trait::async_trait;

use crate::domain::foundation::{CriterionId, CycleId, DomainError, PositionId};
use crate::domain::succession::{Criterion, PhaseGate, Position};

/// Repository port for positions and their scoring rubrics.
#[async_trait]
pub trait PositionRepository: Send + Sync {
    /// # Errors
    ///
    /// - `CycleNotFound` if the cycle doesn't exist
    /// - `InvalidStateTransition` if the cycle is outside the gate's phases
    /// - `DatabaseError` on persistence failure
    async fn save_position(&self, gate: &PhaseGate, position: &Position)
        -> Result<(), DomainError>;

    async fn find_position(&self, id: &PositionId) -> Result<Option<Position>, DomainError>;

    /// Positions of a cycle ordered by hierarchy level, then title.
    async fn positions_for_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Position>, DomainError>;

    /// # Errors
    ///
    /// - `PositionNotFound` if the position doesn't exist
    /// - `InvalidStateTransition` if the cycle is outside the gate's phases
    /// - `Conflict` if the position already has a criterion with this name
    /// - `DatabaseError` on persistence failure
    async fn save_criterion(
        &self,
        gate: &PhaseGate,
        criterion: &Criterion,
    ) -> Result<(), DomainError>;

    async fn find_criterion(&self, id: &CriterionId) -> Result<Option<Criterion>, DomainError>;

    /// Rubric of a position ordered by display order.
    async fn criteria_for_position(
        &self,
        position_id: &PositionId,
    ) -> Result<Vec<Criterion>, DomainError>;
}
