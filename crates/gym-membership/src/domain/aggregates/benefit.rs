//! Benefit Catalog
//!
//! Named perks (sauna, pool, towel service, ...) that plans may grant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::value_objects::{EntityId, Gender, GenderScope};

/// Catalog entry for a single benefit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitDefinition {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub gender_scope: GenderScope,
    pub active: bool,
}

impl BenefitDefinition {
    /// Create a new active benefit offered to everyone
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gender_scope: GenderScope::All,
            active: true,
        }
    }

    pub fn with_scope(mut self, scope: GenderScope) -> Self {
        self.gender_scope = scope;
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn available_to(&self, gender: Gender) -> bool {
        self.active && self.gender_scope.admits(gender)
    }
}

/// All benefit definitions of one organization
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenefitCatalog {
    benefits: BTreeMap<EntityId, BenefitDefinition>,
}

impl BenefitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a definition
    pub fn upsert(&mut self, benefit: BenefitDefinition) {
        self.benefits.insert(benefit.id.clone(), benefit);
    }

    pub fn get(&self, id: &EntityId) -> Option<&BenefitDefinition> {
        self.benefits.get(id)
    }

    pub fn list(&self) -> impl Iterator<Item = &BenefitDefinition> {
        self.benefits.values()
    }

    pub fn list_active(&self) -> Vec<&BenefitDefinition> {
        self.benefits.values().filter(|b| b.active).collect()
    }

    pub fn list_for(&self, gender: Gender) -> Vec<&BenefitDefinition> {
        self.benefits
            .values()
            .filter(|b| b.available_to(gender))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.benefits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benefits.is_empty()
    }
}

impl FromIterator<BenefitDefinition> for BenefitCatalog {
    fn from_iter<I: IntoIterator<Item = BenefitDefinition>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for benefit in iter {
            catalog.upsert(benefit);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> BenefitCatalog {
        [
            BenefitDefinition::new("sauna", "Sauna"),
            BenefitDefinition::new("ladies-spa", "Ladies Spa").with_scope(GenderScope::Female),
            BenefitDefinition::new("boxing", "Boxing Ring").deactivated(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(&"sauna".into()).unwrap().name, "Sauna");
        assert!(catalog.get(&"pool".into()).is_none());
    }

    #[test]
    fn test_list_active_skips_inactive() {
        let catalog = catalog();
        let active: Vec<_> = catalog.list_active().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(active, vec!["ladies-spa", "sauna"]);
    }

    #[test]
    fn test_list_for_gender() {
        let catalog = catalog();
        assert_eq!(catalog.list_for(Gender::Male).len(), 1);
        assert_eq!(catalog.list_for(Gender::Female).len(), 2);
    }
}
