//! Read-only view over the configured consent categories.

use consentkit_core::CategoryDefinition;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    categories: Vec<CategoryDefinition>,
}

impl CategoryRegistry {
    /// Build from configured definitions. A repeated id keeps the slot of its
    /// first appearance but takes the last definition.
    pub fn new(definitions: &[CategoryDefinition]) -> Self {
        let mut categories: Vec<CategoryDefinition> = Vec::with_capacity(definitions.len());
        for def in definitions {
            match categories.iter_mut().find(|c| c.id == def.id) {
                Some(existing) => {
                    warn!("Category '{}' defined more than once; last definition wins", def.id);
                    *existing = def.clone();
                }
                None => categories.push(def.clone()),
            }
        }
        Self { categories }
    }

    pub fn find(&self, id: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.id.as_str() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryDefinition> {
        self.categories.iter()
    }

    pub fn required(&self) -> impl Iterator<Item = &CategoryDefinition> {
        self.categories.iter().filter(|c| c.required)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
