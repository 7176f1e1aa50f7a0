//! Component tables, one per component type

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::Entity;

/// Trait for components
pub trait Component: Send + Sync + 'static {}

/// Identity of a component type, used for multi-type queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Type-erased component storage
pub trait ComponentStorage: Send + Sync {
    fn remove(&mut self, entity: &Entity);
    fn has(&self, entity: &Entity) -> bool;
    fn entities(&self) -> Vec<Entity>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Concrete storage for a specific component type
pub struct TypedComponentStorage<T: Component> {
    pub(crate) data: HashMap<Entity, T>,
}

impl<T: Component> TypedComponentStorage<T> {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Store `component`, handing back whatever it replaced.
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        self.data.insert(entity, component)
    }

    pub fn get(&self, entity: &Entity) -> Option<&T> {
        self.data.get(entity)
    }

    pub fn get_mut(&mut self, entity: &Entity) -> Option<&mut T> {
        self.data.get_mut(entity)
    }

    pub fn take(&mut self, entity: &Entity) -> Option<T> {
        self.data.remove(entity)
    }
}

impl<T: Component> Default for TypedComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for TypedComponentStorage<T> {
    fn remove(&mut self, entity: &Entity) {
        self.data.remove(entity);
    }

    fn has(&self, entity: &Entity) -> bool {
        self.data.contains_key(entity)
    }

    fn entities(&self) -> Vec<Entity> {
        self.data.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
