//! RecordRcApprovalHandler - Regional council sign-off on a nomination.
//!
//! Only a nominee who accepted the approach for the nominated position can be
//! signed off.

use std::sync::Arc;

use crate::domain::foundation::{Actor, NominationId};
use crate::domain::succession::{RcApproval, RcApprovalRecorded, SuccessionError};
use crate::ports::{
    ApproachRepository, CycleRepository, EventPublisher, NominationRepository,
    RcApprovalRepository,
};

use super::support::{from_store, gated_cycle, gates, load_nomination, publish_best_effort};

#[derive(Debug, Clone)]
pub struct RecordRcApprovalCommand {
    pub nomination_id: NominationId,
    pub actor: Actor,
    pub notes: Option<String>,
}

pub struct RecordRcApprovalHandler {
    cycles: Arc<dyn CycleRepository>,
    nominations: Arc<dyn NominationRepository>,
    approaches: Arc<dyn ApproachRepository>,
    approvals: Arc<dyn RcApprovalRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl RecordRcApprovalHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        nominations: Arc<dyn NominationRepository>,
        approaches: Arc<dyn ApproachRepository>,
        approvals: Arc<dyn RcApprovalRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            cycles,
            nominations,
            approaches,
            approvals,
            publisher,
        }
    }

    pub async fn handle(&self, cmd: RecordRcApprovalCommand) -> Result<RcApproval, SuccessionError> {
        let nomination = load_nomination(self.nominations.as_ref(), &cmd.nomination_id).await?;
        let (_, gate) = gated_cycle(
            self.cycles.as_ref(),
            &nomination.cycle_id,
            gates::RC_APPROVAL,
            "record_rc_approval",
        )
        .await?;

        let approach = self
            .approaches
            .list_by_cycle(&nomination.cycle_id)
            .await
            .map_err(from_store)?
            .into_iter()
            .find(|a| a.is_for(&nomination));
        let approval = RcApproval::record(
            &nomination,
            approach.as_ref(),
            cmd.actor.user_id.clone(),
            cmd.notes,
        )?;
        self.approvals
            .create(&gate, &approval)
            .await
            .map_err(from_store)?;

        tracing::info!(
            nomination_id = %nomination.id,
            approved_by = %approval.approved_by,
            "rc approval recorded"
        );

        publish_best_effort(
            self.publisher.as_ref(),
            &RcApprovalRecorded::from(&approval),
            Some(&cmd.actor),
        )
        .await;

        Ok(approval)
    }
}
