//! Regional council sign-off on an accepted nominee.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CycleId, NominationId, RcApprovalId, Timestamp, UserId};

use super::{Approach, ApproachStatus, Entity, Nomination, SuccessionError};

/// At most one per nomination. Its presence takes the nomination out of the
/// pending RC review queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcApproval {
    pub id: RcApprovalId,
    pub cycle_id: CycleId,
    pub nomination_id: NominationId,
    pub approved_by: UserId,
    pub notes: Option<String>,
    pub approved_at: Timestamp,
}

impl RcApproval {
    /// Signs off on `nomination`, whose nominee must have accepted
    /// `approach`.
    ///
    /// # Errors
    ///
    /// `StateTransition` on the nomination if it was withdrawn, or on the
    /// approach if there is none for this nominee and position or it is not
    /// accepted. A missing approach reports its status as `none`.
    pub fn record(
        nomination: &Nomination,
        approach: Option<&Approach>,
        approved_by: UserId,
        notes: Option<String>,
    ) -> Result<Self, SuccessionError> {
        if !nomination.is_active() {
            return Err(SuccessionError::state_transition(
                Entity::Nomination,
                nomination.status,
                "rc_approval",
            ));
        }
        match approach.filter(|a| a.is_for(nomination)) {
            Some(a) if a.response_status == ApproachStatus::Accepted => {}
            Some(a) => {
                return Err(SuccessionError::state_transition(
                    Entity::Approach,
                    a.response_status,
                    "rc_approval",
                ))
            }
            None => {
                return Err(SuccessionError::state_transition(
                    Entity::Approach,
                    "none",
                    "rc_approval",
                ))
            }
        }

        Ok(Self {
            id: RcApprovalId::new(),
            cycle_id: nomination.cycle_id,
            nomination_id: nomination.id,
            approved_by,
            notes: notes.filter(|n| !n.trim().is_empty()),
            approved_at: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Actor, ActorRole, PositionId};

    fn nomination() -> Nomination {
        Nomination::submit(
            CycleId::new(),
            PositionId::new(),
            UserId::new("nominee").unwrap(),
            UserId::new("nominator").unwrap(),
            None,
        )
        .unwrap()
        .0
    }

    fn approach_for(nomination: &Nomination, response: Option<ApproachStatus>) -> Approach {
        let (mut approach, _) = Approach::create(
            nomination.cycle_id,
            nomination.nominee_id.clone(),
            nomination.position_id,
            None,
            None,
        );
        if let Some(response) = response {
            approach.record_response(response, None, None).unwrap();
        }
        approach
    }

    fn rc() -> UserId {
        UserId::new("rc-1").unwrap()
    }

    #[test]
    fn withdrawn_nomination_cannot_be_approved() {
        let mut nomination = nomination();
        let accepted = approach_for(&nomination, Some(ApproachStatus::Accepted));

        let approval =
            RcApproval::record(&nomination, Some(&accepted), rc(), Some("ok".into())).unwrap();
        assert_eq!(approval.nomination_id, nomination.id);
        assert_eq!(approval.cycle_id, nomination.cycle_id);

        nomination
            .withdraw(
                &Actor::new(UserId::new("nominator").unwrap(), ActorRole::Member),
                None,
            )
            .unwrap();
        assert!(matches!(
            RcApproval::record(&nomination, Some(&accepted), rc(), None),
            Err(SuccessionError::StateTransition { entity: Entity::Nomination, .. })
        ));
    }

    #[test]
    fn nominee_must_have_accepted() {
        let nomination = nomination();

        for response in [None, Some(ApproachStatus::Conditional), Some(ApproachStatus::Declined)] {
            let approach = approach_for(&nomination, response);
            let err = RcApproval::record(&nomination, Some(&approach), rc(), None).unwrap_err();
            assert!(matches!(err, SuccessionError::StateTransition { entity: Entity::Approach, .. }));
        }
    }

    #[test]
    fn unapproached_nominee_cannot_be_approved() {
        let nomination = nomination();

        let err = RcApproval::record(&nomination, None, rc(), None).unwrap_err();

        assert_eq!(
            err,
            SuccessionError::state_transition(Entity::Approach, "none", "rc_approval")
        );
    }

    #[test]
    fn approach_for_another_nominee_does_not_count() {
        let nomination = nomination();
        let (mut other, _) = Approach::create(
            nomination.cycle_id,
            UserId::new("someone-else").unwrap(),
            nomination.position_id,
            None,
            None,
        );
        other.record_response(ApproachStatus::Accepted, None, None).unwrap();

        let err = RcApproval::record(&nomination, Some(&other), rc(), None).unwrap_err();

        assert_eq!(
            err,
            SuccessionError::state_transition(Entity::Approach, "none", "rc_approval")
        );
    }
}
