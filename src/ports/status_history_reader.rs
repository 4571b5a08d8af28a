//! Status history reader port (read side).
//!
//! History rows are written by the repositories as part of each state
//! change; this port only reads them back.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::foundation::DomainError;
use crate::domain::succession::{Entity, StatusHistoryEntry};

#[async_trait]
pub trait StatusHistoryReader: Send + Sync {
    /// Entries of one record ordered by `changed_at`, oldest first.
    async fn history_for(
        &self,
        entity: Entity,
        entity_id: &Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_history_reader_is_object_safe() {
        fn _accepts_dyn(_reader: &dyn StatusHistoryReader) {}
    }
}
