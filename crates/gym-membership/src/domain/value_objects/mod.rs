//! Value Objects module
//!
//! Immutable, validated domain primitives.

pub mod period;
pub mod quota;

pub use period::{add_days, add_months, whole_days_between, BillingInterval, RenewalPeriod};
pub use quota::{Quota, Remaining};

use serde::{Deserialize, Serialize};

/// Identifier value object for entities
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::from_string(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Member gender as recorded at the front desk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Which members a benefit is offered to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderScope {
    #[default]
    All,
    Male,
    Female,
}

impl GenderScope {
    pub fn admits(&self, gender: Gender) -> bool {
        matches!(
            (self, gender),
            (Self::All, _) | (Self::Male, Gender::Male) | (Self::Female, Gender::Female)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_scope() {
        assert!(GenderScope::All.admits(Gender::Female));
        assert!(GenderScope::Male.admits(Gender::Male));
        assert!(!GenderScope::Male.admits(Gender::Female));
        assert!(!GenderScope::Female.admits(Gender::Male));
    }

    #[test]
    fn test_entity_id_is_transparent() {
        let id = EntityId::from_string("sauna");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"sauna\"");
    }

    #[test]
    fn test_entity_id_from_owned_and_borrowed() {
        let owned = String::from("pool");
        assert_eq!(EntityId::from(owned), EntityId::from("pool"));
    }
}
