//! Fixtures for handler tests: an in-memory store plus an event bus, and
//! shortcuts that seed records without going through the phase gates.

use std::sync::Arc;

use crate::adapters::events::InMemoryEventBus;
use crate::adapters::memory::InMemorySuccessionStore;
use crate::domain::foundation::{Actor, ActorRole, CycleId, UserId};
use crate::domain::succession::{
    Criterion, Cycle, CyclePhase, Nomination, PhaseGate, Position, Weight,
};
use crate::ports::{
    ApproachRepository, CycleRepository, EvaluationRepository, EventPublisher,
    MeetingRepository, NominationRepository, PositionRepository, RcApprovalRepository,
    StatusHistoryReader,
};

pub fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub fn admin() -> Actor {
    Actor::new(user("admin-1"), ActorRole::Admin)
}

pub fn member(id: &str) -> Actor {
    Actor::new(user(id), ActorRole::Member)
}

/// Gate for seeding writes: any phase short of completed or cancelled.
pub fn open_gate(cycle_id: CycleId) -> PhaseGate {
    PhaseGate::open(cycle_id, "test_setup")
}

pub struct Fixture {
    pub store: InMemorySuccessionStore,
    pub bus: Arc<InMemoryEventBus>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: InMemorySuccessionStore::new(),
            bus: Arc::new(InMemoryEventBus::new()),
        }
    }

    pub fn cycles(&self) -> Arc<dyn CycleRepository> {
        Arc::new(self.store.clone())
    }

    pub fn positions(&self) -> Arc<dyn PositionRepository> {
        Arc::new(self.store.clone())
    }

    pub fn nominations(&self) -> Arc<dyn NominationRepository> {
        Arc::new(self.store.clone())
    }

    pub fn evaluations(&self) -> Arc<dyn EvaluationRepository> {
        Arc::new(self.store.clone())
    }

    pub fn approaches(&self) -> Arc<dyn ApproachRepository> {
        Arc::new(self.store.clone())
    }

    pub fn meetings(&self) -> Arc<dyn MeetingRepository> {
        Arc::new(self.store.clone())
    }

    pub fn rc_approvals(&self) -> Arc<dyn RcApprovalRepository> {
        Arc::new(self.store.clone())
    }

    pub fn history(&self) -> Arc<dyn StatusHistoryReader> {
        Arc::new(self.store.clone())
    }

    pub fn publisher(&self) -> Arc<dyn EventPublisher> {
        self.bus.clone()
    }

    /// A cycle in scope `chapter-12` walked forward to `phase`.
    pub async fn cycle_in(&self, phase: CyclePhase) -> Cycle {
        self.cycle_in_scope("chapter-12", phase).await
    }

    pub async fn cycle_in_scope(&self, scope: &str, phase: CyclePhase) -> Cycle {
        let (mut cycle, entry) =
            Cycle::create(scope, "2026 Succession", 2026, None, Some(&admin())).unwrap();
        CycleRepository::create(&self.store, &cycle, &entry).await.unwrap();
        self.advance(&mut cycle, phase).await;
        cycle
    }

    /// Moves `cycle` forward (or straight to cancelled) until it reaches `phase`.
    pub async fn advance(&self, cycle: &mut Cycle, phase: CyclePhase) {
        while cycle.phase != phase {
            let next = if phase == CyclePhase::Cancelled {
                CyclePhase::Cancelled
            } else {
                cycle.phase.next().unwrap()
            };
            let entry = cycle.transition(next, Some(&admin()), None).unwrap();
            self.store.update_phase(cycle, &entry).await.unwrap();
        }
    }

    pub async fn position(&self, cycle: &Cycle, title: &str) -> Position {
        let position = Position::new(cycle.id, title, 1, None).unwrap();
        self.store
            .save_position(&open_gate(cycle.id), &position)
            .await
            .unwrap();
        position
    }

    pub async fn criterion(
        &self,
        position: &Position,
        name: &str,
        weight: u8,
        max_score: u32,
    ) -> Criterion {
        let criterion =
            Criterion::new(position.id, name, Weight::new(weight).unwrap(), max_score, 0).unwrap();
        self.store
            .save_criterion(&open_gate(position.cycle_id), &criterion)
            .await
            .unwrap();
        criterion
    }

    pub async fn nomination(&self, cycle: &Cycle, position: &Position, nominee: &str) -> Nomination {
        let (nomination, entry) = Nomination::submit(
            cycle.id,
            position.id,
            user(nominee),
            user("nominator-1"),
            None,
        )
        .unwrap();
        NominationRepository::create(&self.store, &open_gate(cycle.id), &nomination, &entry)
            .await
            .unwrap();
        nomination
    }
}
