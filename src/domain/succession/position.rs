//! Positions and their scoring rubrics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{CriterionId, CycleId, PositionId, Timestamp, ValidationError};

/// Relative contribution of a criterion to the weighted score, 0-100.
///
/// Weights of one position are not required to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Weight(u8);

impl Weight {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value > Self::MAX {
            return Err(ValidationError::out_of_range("weight", 0, Self::MAX, value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.0)
    }
}

impl TryFrom<u8> for Weight {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Weight::new(value)
    }
}

impl From<Weight> for u8 {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A leadership role filled during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub cycle_id: CycleId,
    pub title: String,
    /// Ordinal rank; 1 is the most senior.
    pub hierarchy_level: u16,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

impl Position {
    pub fn new(
        cycle_id: CycleId,
        title: impl Into<String>,
        hierarchy_level: u16,
        description: Option<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        if hierarchy_level == 0 {
            return Err(ValidationError::out_of_range(
                "hierarchy_level",
                1,
                u16::MAX,
                hierarchy_level,
            ));
        }

        Ok(Self {
            id: PositionId::new(),
            cycle_id,
            title,
            hierarchy_level,
            description: description.filter(|d| !d.trim().is_empty()),
            created_at: Timestamp::now(),
        })
    }
}

/// One line of a position's scoring rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    pub position_id: PositionId,
    pub name: String,
    pub weight: Weight,
    pub max_score: u32,
    pub display_order: u32,
}

impl Criterion {
    pub fn new(
        position_id: PositionId,
        name: impl Into<String>,
        weight: Weight,
        max_score: u32,
        display_order: u32,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if max_score == 0 {
            return Err(ValidationError::out_of_range(
                "max_score",
                1,
                u32::MAX,
                max_score,
            ));
        }

        Ok(Self {
            id: CriterionId::new(),
            position_id,
            name,
            weight,
            max_score,
            display_order,
        })
    }

    /// Checks that `raw` is a score this criterion can hold.
    pub fn validate_raw_score(&self, raw: f64) -> Result<(), ValidationError> {
        if !raw.is_finite() || raw < 0.0 || raw > f64::from(self.max_score) {
            return Err(ValidationError::out_of_range(
                "raw_score",
                0,
                self.max_score,
                if raw.is_finite() { raw } else { f64::NAN },
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criterion(max: u32) -> Criterion {
        Criterion::new(PositionId::new(), "Vision", Weight::new(60).unwrap(), max, 1).unwrap()
    }

    #[test]
    fn weight_caps_at_one_hundred() {
        assert!(Weight::new(100).is_ok());
        assert!(Weight::new(0).is_ok());
        assert!(matches!(
            Weight::new(101),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn weight_deserialization_is_checked() {
        assert_eq!(serde_json::from_str::<Weight>("40").unwrap().value(), 40);
        assert!(serde_json::from_str::<Weight>("140").is_err());
    }

    #[test]
    fn position_requires_title_and_rank() {
        assert!(Position::new(CycleId::new(), " ", 1, None).is_err());
        assert!(Position::new(CycleId::new(), "Chair", 0, None).is_err());
        let chair = Position::new(CycleId::new(), " Chair ", 1, Some("".into())).unwrap();
        assert_eq!(chair.title, "Chair");
        assert!(chair.description.is_none());
    }

    #[test]
    fn criterion_rejects_zero_max_score() {
        let err = Criterion::new(PositionId::new(), "Vision", Weight::new(10).unwrap(), 0, 1);
        assert!(err.is_err());
    }

    #[test]
    fn raw_score_bounds_are_inclusive() {
        let c = criterion(10);
        assert!(c.validate_raw_score(0.0).is_ok());
        assert!(c.validate_raw_score(10.0).is_ok());
        assert!(c.validate_raw_score(10.5).is_err());
        assert!(c.validate_raw_score(-1.0).is_err());
        assert!(c.validate_raw_score(f64::NAN).is_err());
        assert!(c.validate_raw_score(f64::INFINITY).is_err());
    }
}
