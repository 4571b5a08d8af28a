//! Cycle aggregate - the top-level succession state machine.
//!
//! The cycle gates every mutation in the pipeline: each operation names the
//! phases it is allowed in and calls [`Cycle::ensure_phase`] before touching
//! anything else.
//!
//! # Invariants
//!
//! - At most one cycle per scope is active (not completed/cancelled). The
//!   repository enforces this at write time.
//! - Phases only move one step forward, or to `cancelled`.
//! - Cycles are never deleted; cancellation is a phase.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Actor, CycleId, StateMachine, Timestamp, ValidationError};

use super::{CyclePhase, Entity, StatusHistoryEntry, SuccessionError};

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

/// A succession cycle for one organizational scope (chapter, region, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub id: CycleId,
    pub scope: String,
    pub name: String,
    pub year: i32,
    pub phase: CyclePhase,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cycle {
    /// Creates a new cycle in `draft` together with its first history entry.
    pub fn create(
        scope: impl Into<String>,
        name: impl Into<String>,
        year: i32,
        description: Option<String>,
        created_by: Option<&Actor>,
    ) -> Result<(Self, StatusHistoryEntry), SuccessionError> {
        let scope = scope.into().trim().to_string();
        let name = name.into().trim().to_string();

        if scope.is_empty() {
            return Err(ValidationError::empty_field("scope").into());
        }
        if name.is_empty() {
            return Err(ValidationError::empty_field("name").into());
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ValidationError::out_of_range("year", MIN_YEAR, MAX_YEAR, year).into());
        }

        let now = Timestamp::now();
        let cycle = Self {
            id: CycleId::new(),
            scope,
            name,
            year,
            phase: CyclePhase::Draft,
            description: description.filter(|d| !d.trim().is_empty()),
            created_at: now,
            updated_at: now,
        };
        let entry = StatusHistoryEntry::created(
            Entity::Cycle,
            *cycle.id.as_uuid(),
            cycle.phase,
            created_by.map(|a| a.user_id.clone()),
            now,
        );

        Ok((cycle, entry))
    }

    /// True while this cycle is the active cycle of its scope.
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    /// Moves the cycle to `target`, returning the history entry to persist
    /// alongside the new phase.
    pub fn transition(
        &mut self,
        target: CyclePhase,
        actor: Option<&Actor>,
        notes: Option<String>,
    ) -> Result<StatusHistoryEntry, SuccessionError> {
        let from = self.phase;
        self.phase = from
            .transition_to(target)
            .map_err(|e| SuccessionError::rejected(Entity::Cycle, e))?;
        self.updated_at = Timestamp::now();

        Ok(StatusHistoryEntry::transition(
            Entity::Cycle,
            *self.id.as_uuid(),
            from,
            target,
            actor.map(|a| a.user_id.clone()),
            self.updated_at,
        )
        .with_notes(notes))
    }

    /// Fails unless the cycle is in one of `allowed`.
    ///
    /// The returned gate travels with the write so the store can check the
    /// phase again under the same lock or transaction.
    pub fn ensure_phase(
        &self,
        allowed: &'static [CyclePhase],
        operation: &'static str,
    ) -> Result<PhaseGate, SuccessionError> {
        let gate = PhaseGate::new(self.id, allowed, operation);
        gate.check(self.phase)?;
        Ok(gate)
    }

    /// Fails once the cycle is completed or cancelled.
    pub fn ensure_mutable(&self, operation: &'static str) -> Result<PhaseGate, SuccessionError> {
        self.ensure_phase(&CyclePhase::NON_TERMINAL, operation)
    }
}

/// Phases a write against a cycle's records is allowed in.
///
/// Handlers check the gate on the cycle they loaded; repositories check it
/// again against the stored phase inside the write itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseGate {
    pub cycle_id: CycleId,
    pub allowed: &'static [CyclePhase],
    pub operation: &'static str,
}

impl PhaseGate {
    pub fn new(
        cycle_id: CycleId,
        allowed: &'static [CyclePhase],
        operation: &'static str,
    ) -> Self {
        Self {
            cycle_id,
            allowed,
            operation,
        }
    }

    /// Any phase before `completed` or `cancelled`.
    pub fn open(cycle_id: CycleId, operation: &'static str) -> Self {
        Self::new(cycle_id, &CyclePhase::NON_TERMINAL, operation)
    }

    pub fn check(&self, phase: CyclePhase) -> Result<(), SuccessionError> {
        if self.allowed.contains(&phase) {
            Ok(())
        } else {
            Err(SuccessionError::state_transition(
                Entity::Cycle,
                phase,
                self.operation,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ActorRole, UserId};

    fn admin() -> Actor {
        Actor::new(UserId::new("admin-1").unwrap(), ActorRole::Admin)
    }

    fn draft_cycle() -> Cycle {
        Cycle::create("chapter-12", "2026 Succession", 2026, None, Some(&admin()))
            .unwrap()
            .0
    }

    #[test]
    fn create_starts_in_draft_with_creation_entry() {
        let (cycle, entry) =
            Cycle::create("chapter-12", "2026 Succession", 2026, None, Some(&admin())).unwrap();

        assert_eq!(cycle.phase, CyclePhase::Draft);
        assert!(cycle.is_active());
        assert_eq!(entry.entity, Entity::Cycle);
        assert_eq!(entry.to_status, "draft");
        assert_eq!(entry.changed_by.as_ref().map(|u| u.as_str()), Some("admin-1"));
    }

    #[test]
    fn create_rejects_blank_name_and_scope() {
        assert!(matches!(
            Cycle::create("chapter-12", "  ", 2026, None, None),
            Err(SuccessionError::Validation(_))
        ));
        assert!(matches!(
            Cycle::create("", "Name", 2026, None, None),
            Err(SuccessionError::Validation(_))
        ));
    }

    #[test]
    fn create_rejects_implausible_year() {
        assert!(Cycle::create("s", "n", 12, None, None).is_err());
        assert!(Cycle::create("s", "n", 10_000, None, None).is_err());
    }

    #[test]
    fn transition_records_from_and_to() {
        let mut cycle = draft_cycle();
        let entry = cycle
            .transition(CyclePhase::NominationsOpen, Some(&admin()), Some("kickoff".into()))
            .unwrap();

        assert_eq!(cycle.phase, CyclePhase::NominationsOpen);
        assert_eq!(entry.from_status.as_deref(), Some("draft"));
        assert_eq!(entry.to_status, "nominations_open");
        assert_eq!(entry.notes.as_deref(), Some("kickoff"));
    }

    #[test]
    fn skipping_to_completed_names_both_phases() {
        let mut cycle = draft_cycle();
        let err = cycle.transition(CyclePhase::Completed, None, None).unwrap_err();

        assert_eq!(
            err,
            SuccessionError::state_transition(Entity::Cycle, "draft", "completed")
        );
        assert_eq!(cycle.phase, CyclePhase::Draft);
    }

    #[test]
    fn completed_cycle_cannot_move() {
        let mut cycle = draft_cycle();
        for phase in &CyclePhase::PIPELINE[1..] {
            cycle.transition(*phase, None, None).unwrap();
        }
        assert_eq!(cycle.phase, CyclePhase::Completed);

        for target in CyclePhase::ALL {
            assert!(cycle.clone().transition(target, None, None).is_err());
        }
    }

    #[test]
    fn ensure_phase_reports_operation() {
        let cycle = draft_cycle();
        let err = cycle
            .ensure_phase(&[CyclePhase::NominationsOpen], "submit_nomination")
            .unwrap_err();

        assert_eq!(
            err,
            SuccessionError::state_transition(Entity::Cycle, "draft", "submit_nomination")
        );
    }

    #[test]
    fn cancelled_cycle_is_immutable() {
        let mut cycle = draft_cycle();
        cycle.transition(CyclePhase::Cancelled, None, None).unwrap();

        assert!(!cycle.is_active());
        assert!(cycle.ensure_mutable("schedule_meeting").is_err());
    }

    #[test]
    fn gate_from_loaded_cycle_rejects_a_later_phase() {
        let mut cycle = draft_cycle();
        cycle.transition(CyclePhase::NominationsOpen, None, None).unwrap();
        let gate = cycle
            .ensure_phase(&[CyclePhase::NominationsOpen], "submit_nomination")
            .unwrap();
        assert_eq!(gate.cycle_id, cycle.id);

        cycle.transition(CyclePhase::Evaluation, None, None).unwrap();
        assert_eq!(
            gate.check(cycle.phase).unwrap_err(),
            SuccessionError::state_transition(Entity::Cycle, "evaluation", "submit_nomination")
        );
    }

    #[test]
    fn open_gate_allows_every_non_terminal_phase() {
        let gate = PhaseGate::open(CycleId::new(), "schedule_meeting");
        for phase in CyclePhase::NON_TERMINAL {
            assert!(gate.check(phase).is_ok());
        }
        assert!(gate.check(CyclePhase::Completed).is_err());
        assert!(gate.check(CyclePhase::Cancelled).is_err());
    }
}
