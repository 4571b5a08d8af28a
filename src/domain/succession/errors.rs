//! Succession-specific error taxonomy.
//!
//! Every core operation returns one of five outcomes on failure. The first
//! four are expected control flow and carry enough context for the caller to
//! explain the refusal; `Internal` wraps storage or transport failures.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | NotFound | 404 |
//! | StateTransition | 409 |
//! | Conflict | 409 |
//! | Internal | 500 |

use std::fmt;

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, TransitionRejected, ValidationError};

use super::Entity;

/// Errors returned by succession pipeline operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SuccessionError {
    /// Malformed or out-of-range input.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The operation is not valid for the current phase or status.
    #[error("Cannot move {entity} from '{current}' to '{requested}'")]
    StateTransition {
        entity: Entity,
        current: String,
        requested: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    /// Uniqueness violation (duplicate score, second active cycle, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage or transport failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SuccessionError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SuccessionError::Validation(ValidationError::invalid_format(field, reason))
    }

    pub fn state_transition(
        entity: Entity,
        current: impl fmt::Display,
        requested: impl fmt::Display,
    ) -> Self {
        SuccessionError::StateTransition {
            entity,
            current: current.to_string(),
            requested: requested.to_string(),
        }
    }

    /// Wraps a rejected status change of the given entity.
    pub fn rejected(entity: Entity, rejected: TransitionRejected) -> Self {
        SuccessionError::StateTransition {
            entity,
            current: rejected.from,
            requested: rejected.to,
        }
    }

    pub fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        SuccessionError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        SuccessionError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        SuccessionError::Internal(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SuccessionError::Validation(ValidationError::EmptyField { .. }) => ErrorCode::EmptyField,
            SuccessionError::Validation(ValidationError::OutOfRange { .. }) => ErrorCode::OutOfRange,
            SuccessionError::Validation(_) => ErrorCode::ValidationFailed,
            SuccessionError::StateTransition { .. } => ErrorCode::InvalidStateTransition,
            SuccessionError::NotFound { entity, .. } => entity.not_found_code(),
            SuccessionError::Conflict(_) => ErrorCode::Conflict,
            SuccessionError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Only storage failures may be retried, and only by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SuccessionError::Internal(_))
    }
}

impl From<DomainError> for SuccessionError {
    fn from(err: DomainError) -> Self {
        if let Some(entity) = Entity::from_not_found_code(err.code) {
            let id = err
                .details
                .get("id")
                .cloned()
                .unwrap_or_else(|| err.message.clone());
            return SuccessionError::NotFound { entity, id };
        }
        if err.code.is_conflict() {
            return SuccessionError::Conflict(err.message);
        }
        match err.code {
            ErrorCode::InvalidStateTransition => {
                let detail = |key: &str| err.details.get(key).cloned().unwrap_or_default();
                SuccessionError::StateTransition {
                    entity: detail("entity").parse().unwrap_or(Entity::Cycle),
                    current: detail("current"),
                    requested: detail("requested"),
                }
            }
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => {
                let field = err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                SuccessionError::validation(field, err.message)
            }
            _ => SuccessionError::Internal(err.to_string()),
        }
    }
}

impl From<SuccessionError> for DomainError {
    fn from(err: SuccessionError) -> Self {
        let domain = DomainError::new(err.code(), err.to_string());
        match err {
            SuccessionError::StateTransition {
                entity,
                current,
                requested,
            } => domain
                .with_detail("entity", entity.as_str())
                .with_detail("current", current)
                .with_detail("requested", requested),
            SuccessionError::NotFound { id, .. } => domain.with_detail("id", id),
            _ => domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_transition_names_current_and_requested() {
        let err = SuccessionError::state_transition(Entity::Cycle, "draft", "completed");
        assert_eq!(err.to_string(), "Cannot move cycle from 'draft' to 'completed'");
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn rejected_transition_keeps_both_states() {
        let err = SuccessionError::rejected(
            Entity::Approach,
            TransitionRejected {
                from: "accepted".into(),
                to: "declined".into(),
            },
        );
        assert!(matches!(
            err,
            SuccessionError::StateTransition { entity: Entity::Approach, ref current, ref requested }
            if current == "accepted" && requested == "declined"
        ));
    }

    #[test]
    fn not_found_uses_entity_specific_code() {
        let err = SuccessionError::not_found(Entity::Meeting, "m-1");
        assert_eq!(err.code(), ErrorCode::MeetingNotFound);
        assert!(err.to_string().contains("m-1"));
    }

    #[test]
    fn only_internal_is_retryable() {
        assert!(SuccessionError::internal("db down").is_retryable());
        assert!(!SuccessionError::conflict("dup").is_retryable());
        assert!(!SuccessionError::validation("raw_score", "too high").is_retryable());
    }

    #[test]
    fn converts_storage_errors_by_code() {
        let dup = DomainError::new(ErrorCode::DuplicateScore, "score exists");
        assert!(matches!(SuccessionError::from(dup), SuccessionError::Conflict(_)));

        let missing = DomainError::new(ErrorCode::CycleNotFound, "gone").with_detail("id", "c-9");
        assert_eq!(
            SuccessionError::from(missing),
            SuccessionError::NotFound {
                entity: Entity::Cycle,
                id: "c-9".to_string()
            }
        );

        let db = DomainError::new(ErrorCode::DatabaseError, "connection reset");
        assert!(matches!(SuccessionError::from(db), SuccessionError::Internal(_)));
    }

    #[test]
    fn state_transition_survives_the_store_boundary() {
        let original = SuccessionError::state_transition(Entity::Cycle, "completed", "submit_evaluation_score");
        let through_port: DomainError = original.clone().into();

        assert_eq!(through_port.code, ErrorCode::InvalidStateTransition);
        assert_eq!(SuccessionError::from(through_port), original);
    }

    #[test]
    fn converts_to_domain_error_with_code() {
        let err: DomainError = SuccessionError::conflict("active cycle exists").into();
        assert_eq!(err.code, ErrorCode::Conflict);
    }
}
