use std::any::Any;

use crate::components::{Docking, ItemDescription, DOCKING};
use crate::ecs::{Entity, World, WorldError};
use crate::scheduler::System;

const NOTHING_SPECIAL: &str = "You see nothing special about it.";

/// Examine text for items, chosen by room and docking state.
pub struct ItemDescriptionSystem;

impl ItemDescriptionSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn describe_in_room(&self, world: &World, item: &str, room: &str) -> Result<String, WorldError> {
        let in_space = world.require::<Docking>(&Entity::named(DOCKING))?.in_space();
        let text = world
            .get_component::<ItemDescription>(&Entity::named(item))
            .and_then(|desc| desc.describe(room, in_space))
            .unwrap_or(NOTHING_SPECIAL);
        Ok(text.to_string())
    }
}

impl Default for ItemDescriptionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ItemDescriptionSystem {
    fn name(&self) -> &str {
        "item_description"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
