//! CreateCycleHandler - Opens a new succession cycle in `draft`.

use std::sync::Arc;

use crate::domain::foundation::Actor;
use crate::domain::succession::{Cycle, SuccessionError};
use crate::ports::CycleRepository;

use super::support::from_store;

/// Command to create a succession cycle.
#[derive(Debug, Clone)]
pub struct CreateCycleCommand {
    pub scope: String,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub actor: Option<Actor>,
}

/// Handler for creating cycles.
///
/// The active-cycle check happens at write time in the repository; a second
/// active cycle in the same scope comes back as a conflict.
pub struct CreateCycleHandler {
    cycles: Arc<dyn CycleRepository>,
}

impl CreateCycleHandler {
    pub fn new(cycles: Arc<dyn CycleRepository>) -> Self {
        Self { cycles }
    }

    pub async fn handle(&self, cmd: CreateCycleCommand) -> Result<Cycle, SuccessionError> {
        let (cycle, entry) = Cycle::create(
            cmd.scope,
            cmd.name,
            cmd.year,
            cmd.description,
            cmd.actor.as_ref(),
        )?;

        self.cycles.create(&cycle, &entry).await.map_err(from_store)?;

        tracing::info!(cycle_id = %cycle.id, scope = %cycle.scope, year = cycle.year, "succession cycle created");
        Ok(cycle)
    }
}
