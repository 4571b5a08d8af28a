//! Read-side handlers: cycle statistics, the pending RC review queue and
//! status history.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::foundation::CycleId;
use crate::domain::succession::{
    pending_review_queue, CycleStatistics, Entity, PendingReviewEntry, StatisticsAggregator,
    StatusHistoryEntry, SuccessionError,
};
use crate::ports::{
    ApproachRepository, CycleRepository, MeetingRepository, NominationRepository,
    RcApprovalRepository, StatusHistoryReader,
};

use super::support::{from_store, load_cycle};

/// Read access to everything recorded against a cycle.
#[derive(Clone)]
pub struct CycleRecords {
    pub cycles: Arc<dyn CycleRepository>,
    pub nominations: Arc<dyn NominationRepository>,
    pub approaches: Arc<dyn ApproachRepository>,
    pub meetings: Arc<dyn MeetingRepository>,
    pub approvals: Arc<dyn RcApprovalRepository>,
}

// ════════════════════════════════════════════════════════════════════════════
// Statistics
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct GetCycleStatisticsQuery {
    pub cycle_id: CycleId,
}

pub struct GetCycleStatisticsHandler {
    records: CycleRecords,
}

impl GetCycleStatisticsHandler {
    pub fn new(records: CycleRecords) -> Self {
        Self { records }
    }

    pub async fn handle(
        &self,
        query: GetCycleStatisticsQuery,
    ) -> Result<CycleStatistics, SuccessionError> {
        let r = &self.records;
        let cycle = load_cycle(r.cycles.as_ref(), &query.cycle_id).await?;

        let nominations = r.nominations.list_by_cycle(&cycle.id).await.map_err(from_store)?;
        let approaches = r.approaches.list_by_cycle(&cycle.id).await.map_err(from_store)?;
        let meetings = r.meetings.list_by_cycle(&cycle.id).await.map_err(from_store)?;
        let approvals = r.approvals.list_by_cycle(&cycle.id).await.map_err(from_store)?;

        Ok(StatisticsAggregator::cycle_statistics(
            &cycle,
            &nominations,
            &approaches,
            &meetings,
            &approvals,
        ))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pending RC review queue
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct GetPendingRcReviewQuery {
    pub cycle_id: CycleId,
}

pub struct GetPendingRcReviewHandler {
    records: CycleRecords,
}

impl GetPendingRcReviewHandler {
    pub fn new(records: CycleRecords) -> Self {
        Self { records }
    }

    pub async fn handle(
        &self,
        query: GetPendingRcReviewQuery,
    ) -> Result<Vec<PendingReviewEntry>, SuccessionError> {
        let r = &self.records;
        let cycle = load_cycle(r.cycles.as_ref(), &query.cycle_id).await?;

        let nominations = r.nominations.list_by_cycle(&cycle.id).await.map_err(from_store)?;
        let approaches = r.approaches.list_by_cycle(&cycle.id).await.map_err(from_store)?;
        let approvals = r.approvals.list_by_cycle(&cycle.id).await.map_err(from_store)?;

        Ok(pending_review_queue(&nominations, &approaches, &approvals))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Status history
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct GetStatusHistoryQuery {
    pub entity: Entity,
    pub entity_id: Uuid,
}

pub struct GetStatusHistoryHandler {
    history: Arc<dyn StatusHistoryReader>,
}

impl GetStatusHistoryHandler {
    pub fn new(history: Arc<dyn StatusHistoryReader>) -> Self {
        Self { history }
    }

    /// Unknown ids yield an empty history.
    pub async fn handle(
        &self,
        query: GetStatusHistoryQuery,
    ) -> Result<Vec<StatusHistoryEntry>, SuccessionError> {
        self.history
            .history_for(query.entity, &query.entity_id)
            .await
            .map_err(from_store)
    }
}
