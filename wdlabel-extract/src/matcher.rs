//! Membership test against the known entity set

use std::collections::HashSet;

/// Canonical identifiers of the entities known to the knowledge base
pub type EntitySet = HashSet<String>;

/// Read-only view over the [`EntitySet`]
#[derive(Debug, Clone, Default)]
pub struct EntityMatcher {
    entities: EntitySet,
}

impl EntityMatcher {
    pub fn new(entities: EntitySet) -> Self {
        Self { entities }
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in ascending order
    pub fn sorted(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.entities.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted
    }
}

impl FromIterator<String> for EntityMatcher {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
