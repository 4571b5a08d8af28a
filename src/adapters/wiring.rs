//! Port wiring for the succession pipeline.
//!
//! Bundles one implementation of every port so handler sets can be built
//! against either backend.

use std::sync::Arc;

use sqlx::PgPool;

use crate::adapters::memory::InMemorySuccessionStore;
use crate::adapters::postgres::{
    PostgresApproachRepository, PostgresCycleRepository, PostgresEvaluationRepository,
    PostgresMeetingRepository, PostgresNominationRepository, PostgresPositionRepository,
    PostgresRcApprovalRepository, PostgresStatusHistoryReader,
};
use crate::application::handlers::succession::CycleRecords;
use crate::ports::{
    ApproachRepository, CycleRepository, EvaluationRepository, EventPublisher, MeetingRepository,
    NominationRepository, PositionRepository, RcApprovalRepository, StatusHistoryReader,
};

#[derive(Clone)]
pub struct SuccessionPorts {
    pub cycles: Arc<dyn CycleRepository>,
    pub positions: Arc<dyn PositionRepository>,
    pub nominations: Arc<dyn NominationRepository>,
    pub evaluations: Arc<dyn EvaluationRepository>,
    pub approaches: Arc<dyn ApproachRepository>,
    pub meetings: Arc<dyn MeetingRepository>,
    pub approvals: Arc<dyn RcApprovalRepository>,
    pub history: Arc<dyn StatusHistoryReader>,
    pub publisher: Arc<dyn EventPublisher>,
}

impl SuccessionPorts {
    /// Every port backed by one shared in-memory store.
    pub fn in_memory(store: InMemorySuccessionStore, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            cycles: Arc::new(store.clone()),
            positions: Arc::new(store.clone()),
            nominations: Arc::new(store.clone()),
            evaluations: Arc::new(store.clone()),
            approaches: Arc::new(store.clone()),
            meetings: Arc::new(store.clone()),
            approvals: Arc::new(store.clone()),
            history: Arc::new(store),
            publisher,
        }
    }

    /// Every port backed by PostgreSQL through one pool.
    pub fn postgres(pool: PgPool, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            cycles: Arc::new(PostgresCycleRepository::new(pool.clone())),
            positions: Arc::new(PostgresPositionRepository::new(pool.clone())),
            nominations: Arc::new(PostgresNominationRepository::new(pool.clone())),
            evaluations: Arc::new(PostgresEvaluationRepository::new(pool.clone())),
            approaches: Arc::new(PostgresApproachRepository::new(pool.clone())),
            meetings: Arc::new(PostgresMeetingRepository::new(pool.clone())),
            approvals: Arc::new(PostgresRcApprovalRepository::new(pool.clone())),
            history: Arc::new(PostgresStatusHistoryReader::new(pool)),
            publisher,
        }
    }

    /// Read access used by the reporting handlers.
    pub fn records(&self) -> CycleRecords {
        CycleRecords {
            cycles: self.cycles.clone(),
            nominations: self.nominations.clone(),
            approaches: self.approaches.clone(),
            meetings: self.meetings.clone(),
            approvals: self.approvals.clone(),
        }
    }
}
