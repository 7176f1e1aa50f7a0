//! World - central ECS container and the single access point for game logic

use std::collections::HashSet;

use thiserror::Error;
use tracing::info;

use super::{Component, ComponentStore, ComponentType, Entity, EntityRegistry};
use crate::rng::{RngManager, SystemRng};
use crate::scheduler::{Scheduler, System, SystemHandle};
use crate::session::SessionState;

/// Broken world state. Always a setup bug, never a player mistake.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("entity '{entity}' has no {component} component")]
    MissingComponent {
        entity: String,
        component: &'static str,
    },

    #[error("no {system} system is registered")]
    MissingSystem { system: &'static str },
}

/// World holds all entities, components and systems
pub struct World {
    entities: EntityRegistry,
    components: ComponentStore,
    scheduler: Scheduler,
    rng: RngManager,
    session: SessionState,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self {
            entities: EntityRegistry::new(),
            components: ComponentStore::new(),
            scheduler: Scheduler::new(),
            rng: RngManager::new(seed),
            session: SessionState::Active,
        }
    }

    /// Resolve `key` to its entity, materializing it on first use
    pub fn entity(&mut self, key: &str) -> Entity {
        self.entities.resolve(key)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.count()
    }

    /// Add or replace a component on an entity
    pub fn set_component<T: Component>(&mut self, entity: &Entity, component: T) -> Option<T> {
        if !self.entities.is_known(entity) {
            self.entities.resolve(entity.key());
        }
        self.components.set(entity.clone(), component)
    }

    pub fn get_component<T: Component>(&self, entity: &Entity) -> Option<&T> {
        self.components.get(entity)
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: &Entity) -> Option<&mut T> {
        self.components.get_mut(entity)
    }

    pub fn remove_component<T: Component>(&mut self, entity: &Entity) -> Option<T> {
        self.components.remove(entity)
    }

    pub fn has_component<T: Component>(&self, entity: &Entity) -> bool {
        self.components.has::<T>(entity)
    }

    /// Get a component that world setup guarantees to exist
    pub fn require<T: Component>(&self, entity: &Entity) -> Result<&T, WorldError> {
        self.components
            .get(entity)
            .ok_or_else(|| missing_component::<T>(entity))
    }

    pub fn require_mut<T: Component>(&mut self, entity: &Entity) -> Result<&mut T, WorldError> {
        self.components
            .get_mut(entity)
            .ok_or_else(|| missing_component::<T>(entity))
    }

    pub fn entities_with<T: Component>(&self) -> HashSet<Entity> {
        self.components.entities_with::<T>()
    }

    pub fn entities_with_all(&self, components: &[ComponentType]) -> HashSet<Entity> {
        self.components.entities_with_all(components)
    }

    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    pub fn register_system(&mut self, system: impl System) -> SystemHandle {
        self.scheduler.register(Box::new(system))
    }

    pub fn register_boxed_system(&mut self, system: Box<dyn System>) -> SystemHandle {
        self.scheduler.register(system)
    }

    pub fn unregister_system(&mut self, handle: SystemHandle) -> Option<Box<dyn System>> {
        self.scheduler.unregister(handle)
    }

    pub fn system<T: System>(&self) -> Option<&T> {
        self.scheduler.get::<T>()
    }

    /// Like [`World::system`], but a missing system is an error.
    pub fn require_system<T: System>(&self) -> Result<&T, WorldError> {
        self.scheduler.get::<T>().ok_or(WorldError::MissingSystem {
            system: std::any::type_name::<T>(),
        })
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Run `f` with the registered `T` system and mutable access to the world.
    ///
    /// The system is lent out of the scheduler for the duration of the call,
    /// so `f` may look up and run any other system, but not `T` itself.
    pub fn with_system<T, R>(&mut self, f: impl FnOnce(&T, &mut World) -> R) -> Option<R>
    where
        T: System,
    {
        let (handle, system) = self.scheduler.take::<T>()?;
        let result = system
            .as_any()
            .downcast_ref::<T>()
            .map(|typed| f(typed, self));
        self.scheduler.restore(handle, system);
        result
    }

    /// Like [`World::with_system`], but a missing system is an error.
    pub fn run_system<T, R>(
        &mut self,
        f: impl FnOnce(&T, &mut World) -> Result<R, WorldError>,
    ) -> Result<R, WorldError>
    where
        T: System,
    {
        self.with_system(f).ok_or(WorldError::MissingSystem {
            system: std::any::type_name::<T>(),
        })?
    }

    /// End-of-turn bookkeeping: keeps system order current.
    pub fn tick(&mut self) {
        self.scheduler.tick();
    }

    pub fn rng_stream(&mut self, name: &str) -> SystemRng<'_> {
        self.rng.stream(name)
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn set_session(&mut self, session: SessionState) {
        if self.session != session {
            info!(from = ?self.session, to = ?session, "session state changed");
        }
        self.session = session;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(42)
    }
}

fn missing_component<T: Component>(entity: &Entity) -> WorldError {
    WorldError::MissingComponent {
        entity: entity.key().to_string(),
        component: std::any::type_name::<T>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug, PartialEq)]
    struct Position {
        room: &'static str,
    }
    impl Component for Position {}

    #[derive(Debug, PartialEq)]
    struct Fuel(u32);
    impl Component for Fuel {}

    struct Refuel;

    impl System for Refuel {
        fn name(&self) -> &str {
            "refuel"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl Refuel {
        fn top_up(&self, world: &mut World, entity: &Entity) -> Result<u32, WorldError> {
            let fuel = world.require_mut::<Fuel>(entity)?;
            fuel.0 = 100;
            Ok(fuel.0)
        }
    }

    #[test]
    fn test_world_components() {
        let mut world = World::new(1);
        let player = world.entity("player");

        world.set_component(&player, Position { room: "Commons" });
        world.set_component(&player, Fuel(3));

        assert!(world.has_component::<Position>(&player));
        assert_eq!(world.get_component::<Position>(&player).unwrap().room, "Commons");

        if let Some(fuel) = world.get_component_mut::<Fuel>(&player) {
            fuel.0 += 1;
        }
        assert_eq!(world.get_component::<Fuel>(&player), Some(&Fuel(4)));

        world.remove_component::<Fuel>(&player);
        assert!(!world.has_component::<Fuel>(&player));
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_setting_on_unresolved_entity_materializes_it() {
        let mut world = World::new(1);
        world.set_component(&Entity::named("Engine"), Fuel(0));

        assert_eq!(world.entity_count(), 1);
        assert!(world.entities_with::<Fuel>().contains(&Entity::named("Engine")));
    }

    #[test]
    fn test_require_reports_missing_component() {
        let world = World::new(1);
        let err = world.require::<Fuel>(&Entity::named("player")).unwrap_err();
        assert!(matches!(err, WorldError::MissingComponent { ref entity, .. } if entity == "player"));
    }

    #[test]
    fn test_with_system_lends_system_and_world() {
        let mut world = World::new(1);
        let tank = world.entity("tank");
        world.set_component(&tank, Fuel(1));
        let handle = world.register_system(Refuel);
        world.tick();

        let topped = world.run_system::<Refuel, _>(|refuel, world| refuel.top_up(world, &tank));
        assert_eq!(topped.unwrap(), 100);
        assert!(world.system::<Refuel>().is_some());

        world.unregister_system(handle);
        assert!(matches!(
            world.require_system::<Refuel>(),
            Err(WorldError::MissingSystem { .. })
        ));
        let missing = world.run_system::<Refuel, _>(|refuel, world| refuel.top_up(world, &tank));
        assert!(matches!(missing, Err(WorldError::MissingSystem { .. })));
    }
}
