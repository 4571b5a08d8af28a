//! Append-only status history.
//!
//! Every state change of a cycle, nomination, approach or meeting produces one
//! entry. Entries are written in the same transaction as the change they
//! describe and are never updated afterwards, so ordering by `changed_at` per
//! parent entity is monotonic.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::{HistoryEntryId, Timestamp, UserId};

use super::Entity;

/// One recorded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: HistoryEntryId,
    pub entity: Entity,
    pub entity_id: Uuid,
    /// `None` for the entry recording creation.
    pub from_status: Option<String>,
    pub to_status: String,
    pub changed_by: Option<UserId>,
    pub changed_at: Timestamp,
    pub notes: Option<String>,
}

impl StatusHistoryEntry {
    /// Entry for a freshly created record.
    pub fn created(
        entity: Entity,
        entity_id: Uuid,
        status: impl fmt::Display,
        changed_by: Option<UserId>,
        changed_at: Timestamp,
    ) -> Self {
        Self {
            id: HistoryEntryId::new(),
            entity,
            entity_id,
            from_status: None,
            to_status: status.to_string(),
            changed_by,
            changed_at,
            notes: None,
        }
    }

    /// Entry for a move between two statuses.
    pub fn transition(
        entity: Entity,
        entity_id: Uuid,
        from: impl fmt::Display,
        to: impl fmt::Display,
        changed_by: Option<UserId>,
        changed_at: Timestamp,
    ) -> Self {
        Self {
            id: HistoryEntryId::new(),
            entity,
            entity_id,
            from_status: Some(from.to_string()),
            to_status: to.to_string(),
            changed_by,
            changed_at,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self
    }
}

/// Checks that a history slice links up: each entry starts where the previous
/// one ended and timestamps never go backwards.
pub fn is_consistent_chain(entries: &[StatusHistoryEntry]) -> bool {
    entries.windows(2).all(|pair| {
        let (prev, next) = (&pair[0], &pair[1]);
        next.from_status.as_deref() == Some(prev.to_status.as_str())
            && !next.changed_at.is_before(&prev.changed_at)
    })
}
