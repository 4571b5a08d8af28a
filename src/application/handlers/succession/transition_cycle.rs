//! TransitionCycleHandler - Moves a cycle to its next phase or cancels it.

use std::sync::Arc;

use crate::domain::foundation::{Actor, CycleId};
use crate::domain::succession::{Cycle, CyclePhase, CyclePhaseChanged, SuccessionError};
use crate::ports::{CycleRepository, EventPublisher};

use super::support::{from_store, load_cycle, publish_best_effort};

/// Command to change a cycle's phase.
#[derive(Debug, Clone)]
pub struct TransitionCycleCommand {
    pub cycle_id: CycleId,
    pub target_phase: CyclePhase,
    pub actor: Option<Actor>,
    pub notes: Option<String>,
}

pub struct TransitionCycleHandler {
    cycles: Arc<dyn CycleRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl TransitionCycleHandler {
    pub fn new(cycles: Arc<dyn CycleRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { cycles, publisher }
    }

    pub async fn handle(&self, cmd: TransitionCycleCommand) -> Result<Cycle, SuccessionError> {
        let mut cycle = load_cycle(self.cycles.as_ref(), &cmd.cycle_id).await?;
        let from = cycle.phase;

        let entry = cycle.transition(cmd.target_phase, cmd.actor.as_ref(), cmd.notes)?;
        self.cycles
            .update_phase(&cycle, &entry)
            .await
            .map_err(from_store)?;

        tracing::info!(cycle_id = %cycle.id, from = %from, to = %cycle.phase, "succession cycle transitioned");

        let event = CyclePhaseChanged::new(&cycle, from, entry.changed_by.clone());
        publish_best_effort(self.publisher.as_ref(), &event, cmd.actor.as_ref()).await;

        Ok(cycle)
    }
}
