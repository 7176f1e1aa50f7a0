use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::components::{
    AirlockState, Callsigns, Description, DockedVariant, Docking, Equipment, EquipmentSlot, Exits,
    FixedItems, Inventory, ItemDescription, Items, Landmarks, Position, Wearable, AIRLOCK_STATE,
    DOCKING, PLAYER, SHIP,
};
use crate::ecs::World;

const BUILTIN: &str = include_str!("../scenarios/ky25b.yaml");

fn default_inventory_capacity() -> usize {
    10
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("room '{0}' is declared more than once")]
    DuplicateRoom(String),

    #[error("exit '{direction}' from '{from}' leads to unknown room '{to}'")]
    UnknownExit {
        from: String,
        direction: String,
        to: String,
    },

    #[error("{role} room '{room}' does not exist")]
    UnknownRoom { role: &'static str, room: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub start: String,
    #[serde(default = "default_inventory_capacity")]
    pub inventory_capacity: usize,
    pub landmarks: Landmarks,
    pub callsigns: Callsigns,
    #[serde(default)]
    pub welcome: Vec<String>,
    pub rooms: Vec<ScenarioRoom>,
    #[serde(default)]
    pub items: BTreeMap<String, ScenarioItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioRoom {
    pub name: String,
    pub short: String,
    pub long: String,
    /// Long description once the ship is docked.
    #[serde(default)]
    pub docked: Option<String>,
    #[serde(default)]
    pub exits: Vec<ScenarioExit>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub fixed: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioExit {
    pub direction: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioItem {
    #[serde(default)]
    pub slot: Option<EquipmentSlot>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rooms: BTreeMap<String, String>,
    #[serde(default)]
    pub docked: BTreeMap<String, String>,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// The KY-25B scenario compiled into the binary.
    pub fn builtin() -> Result<Self> {
        serde_yaml::from_str(BUILTIN).context("Failed to parse built-in scenario")
    }

    /// Check room references, then populate a fresh world. Systems are not registered here.
    pub fn build_world(&self, seed: u64) -> Result<World, ScenarioError> {
        self.validate()?;

        let mut world = World::new(seed);
        for room in &self.rooms {
            let entity = world.entity(&room.name);
            world.set_component(&entity, Description::new(&room.short, &room.long));
            let mut exits = Exits::new();
            for exit in &room.exits {
                exits.add(&exit.direction, &exit.to);
            }
            world.set_component(&entity, exits);
            world.set_component(&entity, Items::new(room.items.iter().cloned()));
            world.set_component(&entity, FixedItems::new(room.fixed.iter().cloned()));
            if let Some(docked) = &room.docked {
                world.set_component(
                    &entity,
                    DockedVariant {
                        in_space: room.long.clone(),
                        docked: docked.clone(),
                    },
                );
            }
        }

        for (name, item) in &self.items {
            let entity = world.entity(name);
            if let Some(slot) = item.slot {
                world.set_component(&entity, Wearable { slot });
            }
            if item.description.is_some() || !item.rooms.is_empty() || !item.docked.is_empty() {
                world.set_component(
                    &entity,
                    ItemDescription {
                        default: item.description.clone(),
                        rooms: item.rooms.clone(),
                        rooms_docked: item.docked.clone(),
                    },
                );
            }
        }

        let player = world.entity(PLAYER);
        world.set_component(&player, Position::new(&self.start));
        world.set_component(&player, Inventory::with_capacity(self.inventory_capacity));
        world.set_component(&player, Equipment::new());

        let docking = world.entity(DOCKING);
        world.set_component(&docking, Docking::new());
        let airlock = world.entity(AIRLOCK_STATE);
        world.set_component(&airlock, AirlockState::default());
        let ship = world.entity(SHIP);
        world.set_component(&ship, self.landmarks.clone());
        world.set_component(&ship, self.callsigns.clone());

        debug!(
            scenario = %self.name,
            rooms = self.rooms.len(),
            entities = world.entity_count(),
            "world built"
        );
        Ok(world)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        let mut names = HashSet::new();
        for room in &self.rooms {
            if !names.insert(room.name.as_str()) {
                return Err(ScenarioError::DuplicateRoom(room.name.clone()));
            }
        }
        for room in &self.rooms {
            for exit in &room.exits {
                if !names.contains(exit.to.as_str()) {
                    return Err(ScenarioError::UnknownExit {
                        from: room.name.clone(),
                        direction: exit.direction.clone(),
                        to: exit.to.clone(),
                    });
                }
            }
        }
        let required = [
            ("start", &self.start),
            ("command deck", &self.landmarks.command_deck),
            ("airlock", &self.landmarks.airlock),
            ("open space", &self.landmarks.open_space),
        ];
        for (role, room) in required {
            if !names.contains(room.as_str()) {
                return Err(ScenarioError::UnknownRoom {
                    role,
                    room: room.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;

    #[test]
    fn builtin_scenario_builds() {
        let scenario = Scenario::builtin().unwrap();
        assert_eq!(scenario.start, "Commons");
        assert_eq!(scenario.inventory_capacity, 10);

        let world = scenario.build_world(1).unwrap();
        let engine = world.get_component::<Exits>(&Entity::named("Engine")).unwrap();
        assert_eq!(engine.get("fore"), Some("Commons"));
        assert_eq!(engine.directions().collect::<Vec<_>>(), vec!["down", "fore"]);

        let suit = world.get_component::<Wearable>(&Entity::named("vac-suit")).unwrap();
        assert_eq!(suit.slot, EquipmentSlot::VacSuit);
        assert!(world.has_component::<DockedVariant>(&Entity::named("Stateroom")));
        assert!(!world.has_component::<DockedVariant>(&Entity::named("Hall")));
    }

    #[test]
    fn dangling_exit_is_rejected() {
        let mut scenario = Scenario::builtin().unwrap();
        scenario.rooms[0].exits.push(ScenarioExit {
            direction: "up".into(),
            to: "Observatory".into(),
        });

        let Err(err) = scenario.build_world(1) else {
            panic!("dangling exit accepted");
        };
        assert!(matches!(err, ScenarioError::UnknownExit { ref to, .. } if to == "Observatory"));
    }

    #[test]
    fn duplicate_rooms_and_missing_landmarks_are_rejected() {
        let mut scenario = Scenario::builtin().unwrap();
        let copy = scenario.rooms[1].clone();
        scenario.rooms.push(copy);
        assert!(matches!(
            scenario.build_world(1),
            Err(ScenarioError::DuplicateRoom(_))
        ));

        let mut scenario = Scenario::builtin().unwrap();
        scenario.landmarks.airlock = "Moon Pool".into();
        assert!(matches!(
            scenario.build_world(1),
            Err(ScenarioError::UnknownRoom { role: "airlock", .. })
        ));
    }
}
