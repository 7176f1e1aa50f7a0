//! Entity identities and the registry that materializes them

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Entity handle - an opaque identity compared by its stable key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    key: Arc<str>,
}

impl Entity {
    /// Build a handle for `key` without registering it.
    ///
    /// Handles built this way compare equal to the ones returned by
    /// [`EntityRegistry::resolve`] for the same key.
    pub fn named(key: impl AsRef<str>) -> Self {
        Self {
            key: Arc::from(key.as_ref()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Entity registry
///
/// There is no spawn or despawn: an entity exists from the first time its
/// key is resolved until the registry is dropped.
pub struct EntityRegistry {
    known: HashSet<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            known: HashSet::new(),
        }
    }

    pub fn resolve(&mut self, key: &str) -> Entity {
        let entity = Entity::named(key);
        if let Some(existing) = self.known.get(&entity) {
            return existing.clone();
        }
        self.known.insert(entity.clone());
        entity
    }

    pub fn is_known(&self, entity: &Entity) -> bool {
        self.known.contains(entity)
    }

    pub fn count(&self) -> usize {
        self.known.len()
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
