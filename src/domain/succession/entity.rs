//! Entity kinds of the succession pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{ErrorCode, ValidationError};

/// The record types the pipeline persists, used in errors and history rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Cycle,
    Position,
    Criterion,
    Nomination,
    Score,
    Approach,
    Meeting,
    RcApproval,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Cycle => "cycle",
            Entity::Position => "position",
            Entity::Criterion => "criterion",
            Entity::Nomination => "nomination",
            Entity::Score => "score",
            Entity::Approach => "approach",
            Entity::Meeting => "meeting",
            Entity::RcApproval => "rc_approval",
        }
    }

    /// Error code reported when a record of this kind is missing.
    pub fn not_found_code(&self) -> ErrorCode {
        match self {
            Entity::Cycle => ErrorCode::CycleNotFound,
            Entity::Position => ErrorCode::PositionNotFound,
            Entity::Criterion => ErrorCode::CriterionNotFound,
            Entity::Nomination | Entity::RcApproval => ErrorCode::NominationNotFound,
            Entity::Score => ErrorCode::ScoreNotFound,
            Entity::Approach => ErrorCode::ApproachNotFound,
            Entity::Meeting => ErrorCode::MeetingNotFound,
        }
    }

    /// Inverse of [`Entity::not_found_code`].
    pub fn from_not_found_code(code: ErrorCode) -> Option<Self> {
        match code {
            ErrorCode::CycleNotFound => Some(Entity::Cycle),
            ErrorCode::PositionNotFound => Some(Entity::Position),
            ErrorCode::CriterionNotFound => Some(Entity::Criterion),
            ErrorCode::NominationNotFound => Some(Entity::Nomination),
            ErrorCode::ScoreNotFound => Some(Entity::Score),
            ErrorCode::ApproachNotFound => Some(Entity::Approach),
            ErrorCode::MeetingNotFound => Some(Entity::Meeting),
            _ => None,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Entity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cycle" => Ok(Entity::Cycle),
            "position" => Ok(Entity::Position),
            "criterion" => Ok(Entity::Criterion),
            "nomination" => Ok(Entity::Nomination),
            "score" => Ok(Entity::Score),
            "approach" => Ok(Entity::Approach),
            "meeting" => Ok(Entity::Meeting),
            "rc_approval" => Ok(Entity::RcApproval),
            other => Err(ValidationError::invalid_format(
                "entity",
                format!("unknown entity kind '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes_round_trip() {
        for entity in [
            Entity::Cycle,
            Entity::Position,
            Entity::Criterion,
            Entity::Nomination,
            Entity::Score,
            Entity::Approach,
            Entity::Meeting,
        ] {
            assert_eq!(Entity::from_not_found_code(entity.not_found_code()), Some(entity));
        }
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("rc_approval".parse::<Entity>().unwrap(), Entity::RcApproval);
        assert!("member".parse::<Entity>().is_err());
    }
}
