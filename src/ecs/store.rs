//! Component store - one table per component type, keyed by type identity

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use super::{Component, ComponentStorage, ComponentType, Entity, TypedComponentStorage};

pub struct ComponentStore {
    tables: HashMap<TypeId, Box<dyn ComponentStorage>>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Attach `component` to `entity`, replacing any previous value of that type.
    pub fn set<T: Component>(&mut self, entity: Entity, component: T) -> Option<T> {
        self.table_mut_or_insert::<T>().insert(entity, component)
    }

    pub fn get<T: Component>(&self, entity: &Entity) -> Option<&T> {
        self.table::<T>()?.get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: &Entity) -> Option<&mut T> {
        self.table_mut::<T>()?.get_mut(entity)
    }

    /// Detach the `T` held by `entity`. Absent entries are a no-op.
    pub fn remove<T: Component>(&mut self, entity: &Entity) -> Option<T> {
        self.table_mut::<T>()?.take(entity)
    }

    pub fn has<T: Component>(&self, entity: &Entity) -> bool {
        self.has_type(ComponentType::of::<T>(), entity)
    }

    pub fn has_type(&self, component: ComponentType, entity: &Entity) -> bool {
        self.tables
            .get(&component.id())
            .is_some_and(|table| table.has(entity))
    }

    pub fn entities_with<T: Component>(&self) -> HashSet<Entity> {
        self.entities_with_type(ComponentType::of::<T>())
    }

    pub fn entities_with_type(&self, component: ComponentType) -> HashSet<Entity> {
        self.tables
            .get(&component.id())
            .map(|table| table.entities().into_iter().collect())
            .unwrap_or_default()
    }

    /// Entities holding every one of `components`. An empty list matches nothing.
    pub fn entities_with_all(&self, components: &[ComponentType]) -> HashSet<Entity> {
        let Some((first, rest)) = components.split_first() else {
            return HashSet::new();
        };
        let mut matches = self.entities_with_type(*first);
        for component in rest {
            if matches.is_empty() {
                break;
            }
            matches.retain(|entity| self.has_type(*component, entity));
        }
        matches
    }

    pub fn table<T: Component>(&self) -> Option<&TypedComponentStorage<T>> {
        self.tables
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<TypedComponentStorage<T>>()
    }

    pub fn table_mut<T: Component>(&mut self) -> Option<&mut TypedComponentStorage<T>> {
        self.tables
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<TypedComponentStorage<T>>()
    }

    /// Number of distinct component types that have ever been stored.
    pub fn type_count(&self) -> usize {
        self.tables.len()
    }

    fn table_mut_or_insert<T: Component>(&mut self) -> &mut TypedComponentStorage<T> {
        self.tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(TypedComponentStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut::<TypedComponentStorage<T>>()
            .expect("component table keyed by its own TypeId")
    }
}

impl Default for ComponentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Position(&'static str);
    impl Component for Position {}

    #[derive(Debug, Clone, PartialEq)]
    struct Exits(Vec<&'static str>);
    impl Component for Exits {}

    #[derive(Debug, Clone, PartialEq)]
    struct Cargo(u32);
    impl Component for Cargo {}

    fn e(key: &str) -> Entity {
        Entity::named(key)
    }

    #[test]
    fn test_get_returns_last_set_until_removed() {
        let mut store = ComponentStore::new();

        store.set(e("player"), Position("Commons"));
        assert_eq!(store.get::<Position>(&e("player")), Some(&Position("Commons")));

        store.set(e("player"), Position("Engine"));
        assert_eq!(store.get::<Position>(&e("player")), Some(&Position("Engine")));

        assert_eq!(store.remove::<Position>(&e("player")), Some(Position("Engine")));
        assert_eq!(store.get::<Position>(&e("player")), None);
        assert!(!store.has::<Position>(&e("player")));
    }

    #[test]
    fn test_missing_entries_are_absent_not_errors() {
        let mut store = ComponentStore::new();

        assert!(store.get::<Cargo>(&e("nobody")).is_none());
        assert!(store.get_mut::<Cargo>(&e("nobody")).is_none());
        assert!(store.remove::<Cargo>(&e("nobody")).is_none());
        assert!(store.entities_with::<Cargo>().is_empty());
    }

    #[test]
    fn test_types_are_stored_independently() {
        let mut store = ComponentStore::new();

        store.set(e("Commons"), Exits(vec!["aft", "fore"]));
        store.set(e("Commons"), Cargo(3));
        store.remove::<Cargo>(&e("Commons"));

        assert!(store.has::<Exits>(&e("Commons")));
        assert!(!store.has::<Cargo>(&e("Commons")));
        assert_eq!(store.type_count(), 2);
    }

    #[test]
    fn test_get_mut_mutates_in_place() {
        let mut store = ComponentStore::new();
        store.set(e("hold"), Cargo(1));

        if let Some(cargo) = store.get_mut::<Cargo>(&e("hold")) {
            cargo.0 += 4;
        }

        assert_eq!(store.get::<Cargo>(&e("hold")), Some(&Cargo(5)));
    }

    #[test]
    fn test_entities_with_all_is_intersection() {
        let mut store = ComponentStore::new();
        store.set(e("player"), Position("Commons"));
        store.set(e("drone"), Position("Cargo"));
        store.set(e("drone"), Cargo(2));
        store.set(e("Commons"), Exits(vec!["aft"]));
        store.set(e("Commons"), Cargo(0));

        let position = ComponentType::of::<Position>();
        let cargo = ComponentType::of::<Cargo>();
        let exits = ComponentType::of::<Exits>();

        for (a, b) in [(position, cargo), (cargo, exits), (position, exits)] {
            let expected: HashSet<Entity> = store
                .entities_with_type(a)
                .intersection(&store.entities_with_type(b))
                .cloned()
                .collect();
            assert_eq!(store.entities_with_all(&[a, b]), expected);
        }

        assert_eq!(
            store.entities_with_all(&[position, cargo]),
            HashSet::from([e("drone")])
        );
        assert!(store.entities_with_all(&[position, cargo, exits]).is_empty());
        assert!(store.entities_with_all(&[]).is_empty());
    }
}
