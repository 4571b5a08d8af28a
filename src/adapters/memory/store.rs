//! In-memory succession store.
//!
//! One `RwLock` guards every table, so a write and its history row land
//! atomically, the way a database transaction would. The uniqueness rules of
//! `migrations/0001_succession.sql` are checked by hand, and every gated write
//! re-reads the cycle phase under the write lock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::{
    ApproachId, CriterionId, CycleId, DomainError, ErrorCode, MeetingId, NominationId,
    PositionId, RcApprovalId, ScoreId, UserId,
};
use crate::domain::succession::{
    Approach, Criterion, Cycle, Entity, EvaluationScore, Meeting, Nomination, NominationStatus,
    PhaseGate, Position, RcApproval, StatusHistoryEntry, SuccessionError,
};
use crate::ports::{
    ApproachRepository, CycleRepository, EvaluationRepository, MeetingRepository,
    NominationRepository, PositionRepository, RcApprovalRepository, ReviewStart,
    StatusHistoryReader,
};

#[derive(Debug, Default)]
struct Tables {
    cycles: HashMap<CycleId, Cycle>,
    positions: HashMap<PositionId, Position>,
    criteria: HashMap<CriterionId, Criterion>,
    nominations: HashMap<NominationId, Nomination>,
    scores: HashMap<ScoreId, EvaluationScore>,
    approaches: HashMap<ApproachId, Approach>,
    meetings: HashMap<MeetingId, Meeting>,
    rc_approvals: HashMap<RcApprovalId, RcApproval>,
    history: Vec<StatusHistoryEntry>,
}

/// Keeps the whole pipeline in process memory. Cloning shares the tables.
#[derive(Debug, Clone, Default)]
pub struct InMemorySuccessionStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemorySuccessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of status history rows written so far.
    pub async fn history_len(&self) -> usize {
        self.tables.read().await.history.len()
    }
}

fn not_found(entity: Entity, id: impl ToString) -> DomainError {
    let id = id.to_string();
    DomainError::new(
        entity.not_found_code(),
        format!("{} not found: {}", entity.as_str(), id),
    )
    .with_detail("id", id)
}

fn conflict(message: &str) -> DomainError {
    DomainError::new(ErrorCode::Conflict, message)
}

/// Rejects a write whose recorded starting status no longer matches.
fn guard(current: &str, entry: &StatusHistoryEntry) -> Result<(), DomainError> {
    match entry.from_status.as_deref() {
        Some(expected) if expected != current => Err(conflict(&format!(
            "{} {} changed concurrently",
            entry.entity.as_str(),
            entry.entity_id
        ))),
        _ => Ok(()),
    }
}

/// Checks `gate` against the stored phase of its cycle.
fn check_gate(tables: &Tables, gate: &PhaseGate) -> Result<(), DomainError> {
    let cycle = tables
        .cycles
        .get(&gate.cycle_id)
        .ok_or_else(|| not_found(Entity::Cycle, gate.cycle_id))?;
    gate.check(cycle.phase).map_err(DomainError::from)
}

/// The stored status of a nomination about to be scored or approved.
fn active_nomination_status(
    tables: &Tables,
    id: &NominationId,
    operation: &str,
) -> Result<NominationStatus, DomainError> {
    let stored = tables
        .nominations
        .get(id)
        .ok_or_else(|| not_found(Entity::Nomination, id))?;
    if !stored.is_active() {
        return Err(
            SuccessionError::state_transition(Entity::Nomination, stored.status, operation).into(),
        );
    }
    Ok(stored.status)
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait]
impl CycleRepository for InMemorySuccessionStore {
    async fn create(&self, cycle: &Cycle, entry: &StatusHistoryEntry) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if cycle.is_active()
            && tables
                .cycles
                .values()
                .any(|c| c.scope == cycle.scope && c.is_active())
        {
            return Err(DomainError::new(
                ErrorCode::ActiveCycleExists,
                "Scope already has an active succession cycle",
            )
            .with_detail("scope", cycle.scope.clone()));
        }

        tables.cycles.insert(cycle.id, cycle.clone());
        tables.history.push(entry.clone());
        Ok(())
    }

    async fn update_phase(
        &self,
        cycle: &Cycle,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .cycles
            .get(&cycle.id)
            .ok_or_else(|| not_found(Entity::Cycle, cycle.id))?;
        guard(stored.phase.as_str(), entry)?;

        tables.cycles.insert(cycle.id, cycle.clone());
        tables.history.push(entry.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CycleId) -> Result<Option<Cycle>, DomainError> {
        Ok(self.tables.read().await.cycles.get(id).cloned())
    }

    async fn find_active(&self, scope: &str) -> Result<Option<Cycle>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .cycles
            .values()
            .find(|c| c.scope == scope && c.is_active())
            .cloned())
    }
}

#[async_trait]
impl PositionRepository for InMemorySuccessionStore {
    async fn save_position(
        &self,
        gate: &PhaseGate,
        position: &Position,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.cycles.contains_key(&position.cycle_id) {
            return Err(not_found(Entity::Cycle, position.cycle_id));
        }
        check_gate(&tables, gate)?;
        tables.positions.insert(position.id, position.clone());
        Ok(())
    }

    async fn find_position(&self, id: &PositionId) -> Result<Option<Position>, DomainError> {
        Ok(self.tables.read().await.positions.get(id).cloned())
    }

    async fn positions_for_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Position>, DomainError> {
        let tables = self.tables.read().await;
        let positions = tables
            .positions
            .values()
            .filter(|p| p.cycle_id == *cycle_id)
            .cloned()
            .collect();
        Ok(sorted_by(positions, |p| (p.hierarchy_level, p.title.clone())))
    }

    async fn save_criterion(
        &self,
        gate: &PhaseGate,
        criterion: &Criterion,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.positions.contains_key(&criterion.position_id) {
            return Err(not_found(Entity::Position, criterion.position_id));
        }
        check_gate(&tables, gate)?;
        if tables.criteria.values().any(|c| {
            c.position_id == criterion.position_id && c.name == criterion.name && c.id != criterion.id
        }) {
            return Err(conflict("Position already has a criterion with this name"));
        }
        tables.criteria.insert(criterion.id, criterion.clone());
        Ok(())
    }

    async fn find_criterion(&self, id: &CriterionId) -> Result<Option<Criterion>, DomainError> {
        Ok(self.tables.read().await.criteria.get(id).cloned())
    }

    async fn criteria_for_position(
        &self,
        position_id: &PositionId,
    ) -> Result<Vec<Criterion>, DomainError> {
        let tables = self.tables.read().await;
        let criteria = tables
            .criteria
            .values()
            .filter(|c| c.position_id == *position_id)
            .cloned()
            .collect();
        Ok(sorted_by(criteria, |c| (c.display_order, c.name.clone())))
    }
}

fn active_duplicate(tables: &Tables, nomination: &Nomination) -> bool {
    nomination.is_active()
        && tables.nominations.values().any(|n| {
            n.id != nomination.id
                && n.is_active()
                && n.cycle_id == nomination.cycle_id
                && n.position_id == nomination.position_id
                && n.nominee_id == nomination.nominee_id
        })
}

fn apply_nomination_status(
    tables: &mut Tables,
    nomination: &Nomination,
    entry: &StatusHistoryEntry,
) -> Result<(), DomainError> {
    let stored = tables
        .nominations
        .get(&nomination.id)
        .ok_or_else(|| not_found(Entity::Nomination, nomination.id))?;
    guard(stored.status.as_str(), entry)?;
    if active_duplicate(tables, nomination) {
        return Err(conflict(
            "Nominee already has an active nomination for this position",
        ));
    }

    tables.nominations.insert(nomination.id, nomination.clone());
    tables.history.push(entry.clone());
    Ok(())
}

#[async_trait]
impl NominationRepository for InMemorySuccessionStore {
    async fn create(
        &self,
        gate: &PhaseGate,
        nomination: &Nomination,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        check_gate(&tables, gate)?;
        if active_duplicate(&tables, nomination) {
            return Err(conflict(
                "Nominee already has an active nomination for this position",
            ));
        }

        tables.nominations.insert(nomination.id, nomination.clone());
        tables.history.push(entry.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        gate: &PhaseGate,
        nomination: &Nomination,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        check_gate(&tables, gate)?;
        apply_nomination_status(&mut tables, nomination, entry)
    }

    async fn find_by_id(&self, id: &NominationId) -> Result<Option<Nomination>, DomainError> {
        Ok(self.tables.read().await.nominations.get(id).cloned())
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Nomination>, DomainError> {
        let tables = self.tables.read().await;
        let nominations = tables
            .nominations
            .values()
            .filter(|n| n.cycle_id == *cycle_id)
            .cloned()
            .collect();
        Ok(sorted_by(nominations, |n| (n.created_at, n.id)))
    }

    async fn list_by_position(
        &self,
        position_id: &PositionId,
    ) -> Result<Vec<Nomination>, DomainError> {
        let tables = self.tables.read().await;
        let nominations = tables
            .nominations
            .values()
            .filter(|n| n.position_id == *position_id)
            .cloned()
            .collect();
        Ok(sorted_by(nominations, |n| (n.created_at, n.id)))
    }
}

#[async_trait]
impl EvaluationRepository for InMemorySuccessionStore {
    async fn insert_score(
        &self,
        gate: &PhaseGate,
        score: &EvaluationScore,
        review: Option<ReviewStart<'_>>,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        check_gate(&tables, gate)?;
        if tables.scores.values().any(|s| s.key() == score.key()) {
            return Err(DomainError::new(
                ErrorCode::DuplicateScore,
                "Evaluator already scored this criterion for this nomination",
            ));
        }
        let status = active_nomination_status(&tables, &score.nomination_id, "score")?;

        // Another evaluator may have started the review since the snapshot.
        if let Some(review) = review.filter(|_| status == NominationStatus::Submitted) {
            tables
                .nominations
                .insert(review.nomination.id, review.nomination.clone());
            tables.history.push(review.entry.clone());
        }
        tables.scores.insert(score.id, score.clone());
        Ok(())
    }

    async fn update_score(
        &self,
        gate: &PhaseGate,
        score: &EvaluationScore,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        check_gate(&tables, gate)?;
        active_nomination_status(&tables, &score.nomination_id, "score")?;
        match tables.scores.get_mut(&score.id) {
            Some(stored) => {
                stored.raw_score = score.raw_score;
                stored.updated_at = score.updated_at;
                Ok(())
            }
            None => Err(not_found(Entity::Score, score.id)),
        }
    }

    async fn find_score(
        &self,
        nomination_id: &NominationId,
        evaluator_id: &UserId,
        criterion_id: &CriterionId,
    ) -> Result<Option<EvaluationScore>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .scores
            .values()
            .find(|s| {
                s.nomination_id == *nomination_id
                    && s.evaluator_id == *evaluator_id
                    && s.criterion_id == *criterion_id
            })
            .cloned())
    }

    async fn scores_for_nomination(
        &self,
        nomination_id: &NominationId,
    ) -> Result<Vec<EvaluationScore>, DomainError> {
        let tables = self.tables.read().await;
        let scores = tables
            .scores
            .values()
            .filter(|s| s.nomination_id == *nomination_id)
            .cloned()
            .collect();
        Ok(sorted_by(scores, |s| (s.created_at, s.id)))
    }
}

#[async_trait]
impl ApproachRepository for InMemorySuccessionStore {
    async fn create(
        &self,
        gate: &PhaseGate,
        approach: &Approach,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        check_gate(&tables, gate)?;
        if tables.approaches.values().any(|a| {
            a.cycle_id == approach.cycle_id
                && a.nominee_id == approach.nominee_id
                && a.position_id == approach.position_id
        }) {
            return Err(conflict("Nominee was already approached for this position"));
        }

        tables.approaches.insert(approach.id, approach.clone());
        tables.history.push(entry.clone());
        Ok(())
    }

    async fn update_response(
        &self,
        gate: &PhaseGate,
        approach: &Approach,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        check_gate(&tables, gate)?;
        let stored = tables
            .approaches
            .get(&approach.id)
            .ok_or_else(|| not_found(Entity::Approach, approach.id))?;
        guard(stored.response_status.as_str(), entry)?;

        let mut updated = approach.clone();
        if stored.responded_at.is_some() {
            updated.responded_at = stored.responded_at;
        }
        tables.approaches.insert(approach.id, updated);
        tables.history.push(entry.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ApproachId) -> Result<Option<Approach>, DomainError> {
        Ok(self.tables.read().await.approaches.get(id).cloned())
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Approach>, DomainError> {
        let tables = self.tables.read().await;
        let approaches = tables
            .approaches
            .values()
            .filter(|a| a.cycle_id == *cycle_id)
            .cloned()
            .collect();
        Ok(sorted_by(approaches, |a| (a.approached_at, a.id)))
    }
}

#[async_trait]
impl MeetingRepository for InMemorySuccessionStore {
    async fn create(
        &self,
        gate: &PhaseGate,
        meeting: &Meeting,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.cycles.contains_key(&meeting.cycle_id) {
            return Err(not_found(Entity::Cycle, meeting.cycle_id));
        }
        check_gate(&tables, gate)?;
        tables.meetings.insert(meeting.id, meeting.clone());
        tables.history.push(entry.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        gate: &PhaseGate,
        meeting: &Meeting,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        check_gate(&tables, gate)?;
        let stored = tables
            .meetings
            .get(&meeting.id)
            .ok_or_else(|| not_found(Entity::Meeting, meeting.id))?;
        guard(stored.status.as_str(), entry)?;

        tables.meetings.insert(meeting.id, meeting.clone());
        tables.history.push(entry.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &MeetingId) -> Result<Option<Meeting>, DomainError> {
        Ok(self.tables.read().await.meetings.get(id).cloned())
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Meeting>, DomainError> {
        let tables = self.tables.read().await;
        let meetings = tables
            .meetings
            .values()
            .filter(|m| m.cycle_id == *cycle_id)
            .cloned()
            .collect();
        Ok(sorted_by(meetings, |m| (m.meeting_date, m.id)))
    }
}

#[async_trait]
impl RcApprovalRepository for InMemorySuccessionStore {
    async fn create(&self, gate: &PhaseGate, approval: &RcApproval) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        check_gate(&tables, gate)?;
        active_nomination_status(&tables, &approval.nomination_id, "rc_approval")?;
        if tables
            .rc_approvals
            .values()
            .any(|a| a.nomination_id == approval.nomination_id)
        {
            return Err(conflict("Nomination already has an RC approval"));
        }
        tables.rc_approvals.insert(approval.id, approval.clone());
        Ok(())
    }

    async fn find_by_nomination(
        &self,
        nomination_id: &NominationId,
    ) -> Result<Option<RcApproval>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .rc_approvals
            .values()
            .find(|a| a.nomination_id == *nomination_id)
            .cloned())
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<RcApproval>, DomainError> {
        let tables = self.tables.read().await;
        let approvals = tables
            .rc_approvals
            .values()
            .filter(|a| a.cycle_id == *cycle_id)
            .cloned()
            .collect();
        Ok(sorted_by(approvals, |a| (a.approved_at, a.id)))
    }
}

#[async_trait]
impl StatusHistoryReader for InMemorySuccessionStore {
    async fn history_for(
        &self,
        entity: Entity,
        entity_id: &Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, DomainError> {
        let tables = self.tables.read().await;
        let entries = tables
            .history
            .iter()
            .filter(|e| e.entity == entity && e.entity_id == *entity_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps.
        Ok(sorted_by(entries, |e| e.changed_at))
    }
}
