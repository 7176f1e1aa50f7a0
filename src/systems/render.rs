use std::any::Any;

use tracing::debug;

use crate::components::{Description, DockedVariant, Equipment, EquipmentSlot, Exits, Inventory};
use crate::ecs::{ComponentType, Entity, World, WorldError};
use crate::scheduler::System;

/// Turns room and inventory state into text, and keeps docking-dependent
/// descriptions in step with the docking state.
pub struct RenderSystem;

impl RenderSystem {
    pub fn new() -> Self {
        Self
    }

    /// Long form on the first visit or when forced, short form otherwise.
    pub fn describe(
        &self,
        world: &mut World,
        room: &Entity,
        force_long: bool,
    ) -> Result<String, WorldError> {
        let desc = world.require_mut::<Description>(room)?;
        if force_long || desc.first_visit {
            desc.first_visit = false;
            Ok(desc.long.clone())
        } else {
            Ok(desc.short.clone())
        }
    }

    /// Description followed by the exits line.
    pub fn display_room(
        &self,
        world: &mut World,
        room: &Entity,
        force_long: bool,
    ) -> Result<Vec<String>, WorldError> {
        let mut lines = vec![self.describe(world, room, force_long)?];
        if let Some(exits) = world.get_component::<Exits>(room) {
            let directions: Vec<&str> = exits.directions().collect();
            lines.push(format!("Exits: {}", directions.join(" ")));
        }
        Ok(lines)
    }

    pub fn display_inventory(&self, world: &World, entity: &Entity) -> Vec<String> {
        let mut lines = Vec::new();
        match world.get_component::<Inventory>(entity) {
            Some(inventory) if !inventory.items().is_empty() => {
                lines.push(format!("You are carrying: {}", inventory.items().join(", ")));
            }
            _ => lines.push("Your inventory is empty.".to_string()),
        }
        if let Some(equipment) = world.get_component::<Equipment>(entity) {
            if let Some(suit) = equipment.item_in(EquipmentSlot::VacSuit) {
                lines.push(format!("You are wearing a {suit}."));
            }
            for slot in [EquipmentSlot::Tool, EquipmentSlot::Weapon] {
                if let Some(item) = equipment.item_in(slot) {
                    lines.push(format!("You have the {item} at the ready."));
                }
            }
        }
        lines
    }

    /// New long descriptions for every docking-dependent room.
    ///
    /// Nothing is written; the caller applies the plan with
    /// [`RenderSystem::apply_refresh`] once every lookup has succeeded.
    pub fn plan_docking_refresh(
        &self,
        world: &World,
        in_space: bool,
    ) -> Result<Vec<(Entity, String)>, WorldError> {
        let rooms = world.entities_with_all(&[
            ComponentType::of::<Description>(),
            ComponentType::of::<DockedVariant>(),
        ]);
        let mut plan = Vec::with_capacity(rooms.len());
        for room in rooms {
            let long = world.require::<DockedVariant>(&room)?.for_state(in_space).to_string();
            plan.push((room, long));
        }
        plan.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(plan)
    }

    pub fn apply_refresh(
        &self,
        world: &mut World,
        plan: Vec<(Entity, String)>,
    ) -> Result<(), WorldError> {
        for (room, long) in plan {
            debug!(room = %room, "description refreshed for docking state");
            world.require_mut::<Description>(&room)?.long = long;
        }
        Ok(())
    }
}

impl Default for RenderSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RenderSystem {
    fn name(&self) -> &str {
        "render"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
