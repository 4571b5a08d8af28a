//! Cycle statistics, derived on demand from source records.
//!
//! Nothing here is cached. Every figure is recomputed from the current
//! approaches, meetings, nominations and RC approvals of one cycle.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::foundation::{
    ApproachId, CycleId, NominationId, PositionId, Timestamp, UserId,
};

use super::{
    Approach, ApproachStatus, Cycle, CyclePhase, Meeting, MeetingStatus, MeetingType, Nomination,
    NominationStatus, RcApproval,
};

/// Approaches of a cycle by response status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproachCounts {
    pub pending: usize,
    pub accepted: usize,
    pub declined: usize,
    pub conditional: usize,
}

impl ApproachCounts {
    pub fn tally(approaches: &[Approach]) -> Self {
        approaches.iter().fold(Self::default(), |mut counts, a| {
            match a.response_status {
                ApproachStatus::Pending => counts.pending += 1,
                ApproachStatus::Accepted => counts.accepted += 1,
                ApproachStatus::Declined => counts.declined += 1,
                ApproachStatus::Conditional => counts.conditional += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.pending + self.accepted + self.declined + self.conditional
    }

    /// Share of approaches with a final answer; 0.0 when there are none.
    pub fn response_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.accepted + self.declined) as f64 / total as f64
    }
}

/// Nominations of a cycle by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationCounts {
    pub submitted: usize,
    pub under_review: usize,
    pub withdrawn: usize,
}

impl NominationCounts {
    pub fn tally(nominations: &[Nomination]) -> Self {
        nominations.iter().fold(Self::default(), |mut counts, n| {
            match n.status {
                NominationStatus::Submitted => counts.submitted += 1,
                NominationStatus::UnderReview => counts.under_review += 1,
                NominationStatus::Withdrawn => counts.withdrawn += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.submitted + self.under_review + self.withdrawn
    }
}

/// Meeting completion for one meeting type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingCompletion {
    pub meeting_type: MeetingType,
    pub total: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub completion_ratio: f64,
}

impl MeetingCompletion {
    /// Completion for every meeting type that occurs, ordered by type.
    pub fn per_type(meetings: &[Meeting]) -> Vec<Self> {
        let mut by_type: BTreeMap<MeetingType, Vec<&Meeting>> = BTreeMap::new();
        for meeting in meetings {
            by_type.entry(meeting.meeting_type).or_default().push(meeting);
        }

        by_type
            .into_iter()
            .map(|(meeting_type, group)| {
                let count = |status: MeetingStatus| group.iter().filter(|m| m.status == status).count();
                let total = group.len();
                let completed = count(MeetingStatus::Completed);
                Self {
                    meeting_type,
                    total,
                    scheduled: count(MeetingStatus::Scheduled),
                    completed,
                    cancelled: count(MeetingStatus::Cancelled),
                    completion_ratio: ratio(completed, total),
                }
            })
            .collect()
    }
}

/// completed / total for one meeting type; 0.0 when none exist.
pub fn completion_ratio(meetings: &[Meeting], meeting_type: MeetingType) -> f64 {
    let of_type: Vec<&Meeting> = meetings
        .iter()
        .filter(|m| m.meeting_type == meeting_type)
        .collect();
    let completed = of_type
        .iter()
        .filter(|m| m.status == MeetingStatus::Completed)
        .count();
    ratio(completed, of_type.len())
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// A nomination waiting for regional council sign-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReviewEntry {
    pub nomination_id: NominationId,
    pub position_id: PositionId,
    pub nominee_id: UserId,
    pub approach_id: ApproachId,
    pub accepted_at: Option<Timestamp>,
}

/// Active nominations whose approach was accepted and that have no RC
/// approval yet, oldest acceptance first.
///
/// A nomination is linked to the approach with the same cycle, nominee and
/// position.
pub fn pending_review_queue(
    nominations: &[Nomination],
    approaches: &[Approach],
    approvals: &[RcApproval],
) -> Vec<PendingReviewEntry> {
    let accepted: HashMap<(CycleId, &UserId, PositionId), &Approach> = approaches
        .iter()
        .filter(|a| a.response_status == ApproachStatus::Accepted)
        .map(|a| ((a.cycle_id, &a.nominee_id, a.position_id), a))
        .collect();
    let approved: HashSet<NominationId> = approvals.iter().map(|a| a.nomination_id).collect();

    let mut queue: Vec<PendingReviewEntry> = nominations
        .iter()
        .filter(|n| n.is_active() && !approved.contains(&n.id))
        .filter_map(|n| {
            accepted
                .get(&(n.cycle_id, &n.nominee_id, n.position_id))
                .map(|approach| PendingReviewEntry {
                    nomination_id: n.id,
                    position_id: n.position_id,
                    nominee_id: n.nominee_id.clone(),
                    approach_id: approach.id,
                    accepted_at: approach.responded_at,
                })
        })
        .collect();

    queue.sort_by(|a, b| {
        a.accepted_at
            .cmp(&b.accepted_at)
            .then_with(|| a.nomination_id.cmp(&b.nomination_id))
    });
    queue
}

/// Snapshot of a cycle's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleStatistics {
    pub cycle_id: CycleId,
    pub phase: CyclePhase,
    pub nominations: NominationCounts,
    pub approaches: ApproachCounts,
    pub total_approaches: usize,
    pub response_rate: f64,
    pub meetings: Vec<MeetingCompletion>,
    pub rc_approvals: usize,
    pub pending_rc_review: usize,
}

/// Derives statistics from the records of one cycle.
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    pub fn cycle_statistics(
        cycle: &Cycle,
        nominations: &[Nomination],
        approaches: &[Approach],
        meetings: &[Meeting],
        approvals: &[RcApproval],
    ) -> CycleStatistics {
        let counts = ApproachCounts::tally(approaches);

        CycleStatistics {
            cycle_id: cycle.id,
            phase: cycle.phase,
            nominations: NominationCounts::tally(nominations),
            approaches: counts,
            total_approaches: counts.total(),
            response_rate: counts.response_rate(),
            meetings: MeetingCompletion::per_type(meetings),
            rc_approvals: approvals.len(),
            pending_rc_review: pending_review_queue(nominations, approaches, approvals).len(),
        }
    }
}
