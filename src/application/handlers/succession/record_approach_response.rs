//! RecordApproachResponseHandler - Records a nominee's answer to an approach.

use std::sync::Arc;

use crate::domain::foundation::{Actor, ApproachId};
use crate::domain::succession::{Approach, ApproachResponded, ApproachStatus, SuccessionError};
use crate::ports::{ApproachRepository, CycleRepository, EventPublisher};

use super::support::{from_store, gated_cycle, gates, load_approach, publish_best_effort};

#[derive(Debug, Clone)]
pub struct RecordApproachResponseCommand {
    pub approach_id: ApproachId,
    pub response: ApproachStatus,
    pub actor: Option<Actor>,
    pub notes: Option<String>,
}

pub struct RecordApproachResponseHandler {
    cycles: Arc<dyn CycleRepository>,
    approaches: Arc<dyn ApproachRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl RecordApproachResponseHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        approaches: Arc<dyn ApproachRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            cycles,
            approaches,
            publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordApproachResponseCommand,
    ) -> Result<Approach, SuccessionError> {
        let mut approach = load_approach(self.approaches.as_ref(), &cmd.approach_id).await?;
        let (_, gate) = gated_cycle(
            self.cycles.as_ref(),
            &approach.cycle_id,
            gates::APPROACH_RESPONSE,
            "record_approach_response",
        )
        .await?;

        let previous = approach.response_status;
        let entry = approach.record_response(cmd.response, cmd.actor.as_ref(), cmd.notes)?;
        self.approaches
            .update_response(&gate, &approach, &entry)
            .await
            .map_err(from_store)?;

        tracing::info!(
            approach_id = %approach.id,
            from = %previous,
            to = %approach.response_status,
            "approach response recorded"
        );

        let event = ApproachResponded::new(&approach, previous, entry.changed_at);
        publish_best_effort(self.publisher.as_ref(), &event, cmd.actor.as_ref()).await;

        Ok(approach)
    }
}
