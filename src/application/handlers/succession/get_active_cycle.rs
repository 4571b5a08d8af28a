//! GetActiveCycleHandler - Query for the open cycle of a scope.

use std::sync::Arc;

use crate::domain::succession::{Cycle, SuccessionError};
use crate::ports::CycleRepository;

use super::support::from_store;

#[derive(Debug, Clone)]
pub struct GetActiveCycleQuery {
    pub scope: String,
}

pub struct GetActiveCycleHandler {
    cycles: Arc<dyn CycleRepository>,
}

impl GetActiveCycleHandler {
    pub fn new(cycles: Arc<dyn CycleRepository>) -> Self {
        Self { cycles }
    }

    /// Returns the cycle of `scope` that is neither completed nor cancelled.
    pub async fn handle(&self, query: GetActiveCycleQuery) -> Result<Option<Cycle>, SuccessionError> {
        self.cycles
            .find_active(query.scope.trim())
            .await
            .map_err(from_store)
    }
}
