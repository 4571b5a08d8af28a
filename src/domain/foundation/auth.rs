//! Acting-user types supplied by the identity provider.
//!
//! The succession core does not authenticate anyone or resolve roles. The
//! caller (HTTP layer, job runner) has already authorized the action and
//! hands over who is acting and in which role.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{UserId, ValidationError};

/// Organizational role of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    #[default]
    Member,
    Evaluator,
    RegionalCouncil,
    Admin,
}

impl ActorRole {
    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Member => "member",
            ActorRole::Evaluator => "evaluator",
            ActorRole::RegionalCouncil => "regional_council",
            ActorRole::Admin => "admin",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "member" => Ok(ActorRole::Member),
            "evaluator" => Ok(ActorRole::Evaluator),
            "regional_council" | "rc" => Ok(ActorRole::RegionalCouncil),
            "admin" => Ok(ActorRole::Admin),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// The user performing an operation, as resolved by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(user_id: UserId, role: ActorRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<ActorRole>().unwrap(), ActorRole::Admin);
        assert_eq!("rc".parse::<ActorRole>().unwrap(), ActorRole::RegionalCouncil);
        assert!("chair".parse::<ActorRole>().is_err());
    }

    #[test]
    fn only_admin_role_is_admin() {
        let user = UserId::new("u-1").unwrap();
        assert!(Actor::new(user.clone(), ActorRole::Admin).is_admin());
        assert!(!Actor::new(user, ActorRole::RegionalCouncil).is_admin());
    }
}
