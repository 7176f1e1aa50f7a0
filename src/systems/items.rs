use std::any::Any;

use tracing::debug;

use super::{ItemDescriptionSystem, Outcome, Rejection};
use crate::components::{Equipment, EquipmentSlot, FixedItems, Inventory, Items, Position, Wearable};
use crate::ecs::{Entity, World, WorldError};
use crate::scheduler::System;

/// Picking up, dropping, wearing and examining items.
pub struct ItemSystem;

impl ItemSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn take_item(&self, world: &mut World, actor: &Entity, item: &str) -> Result<Outcome, WorldError> {
        if item.is_empty() {
            return Ok(Outcome::rejected(Rejection::UnknownTarget, "Take what?"));
        }
        let room = Entity::named(&world.require::<Position>(actor)?.room);
        let present = world
            .get_component::<Items>(&room)
            .is_some_and(|items| items.contains(item));
        if !present {
            return Ok(Outcome::rejected(Rejection::UnknownTarget, "You can't take that."));
        }
        if world.require::<Inventory>(actor)?.is_full() {
            return Ok(Outcome::rejected(
                Rejection::CapacityExceeded,
                "Your inventory is full.",
            ));
        }

        world.require_mut::<Inventory>(actor)?.add(item);
        world.require_mut::<Items>(&room)?.remove(item);
        debug!(entity = %actor, item, room = %room, "item taken");
        Ok(Outcome::done([format!("You take the {item}.")]))
    }

    pub fn drop_item(&self, world: &mut World, actor: &Entity, item: &str) -> Result<Outcome, WorldError> {
        if item.is_empty() {
            return Ok(Outcome::rejected(Rejection::UnknownTarget, "Drop what?"));
        }
        if !world.require::<Inventory>(actor)?.contains(item) {
            return Ok(Outcome::rejected(Rejection::UnknownTarget, "You don't have that."));
        }
        if world.require::<Equipment>(actor)?.slot_of(item).is_some() {
            return Ok(Outcome::rejected(
                Rejection::Precondition,
                format!("You'll need to remove the {item} first."),
            ));
        }
        let room = Entity::named(&world.require::<Position>(actor)?.room);
        // Every room carries an Items table; check before touching the inventory.
        world.require::<Items>(&room)?;

        world.require_mut::<Inventory>(actor)?.remove(item);
        world.require_mut::<Items>(&room)?.add(item);
        debug!(entity = %actor, item, room = %room, "item dropped");
        Ok(Outcome::done([format!("You drop the {item}.")]))
    }

    pub fn wear_item(&self, world: &mut World, actor: &Entity, item: &str) -> Result<Outcome, WorldError> {
        if item.is_empty() {
            return Ok(Outcome::rejected(Rejection::UnknownTarget, "Wear what?"));
        }
        let Some(Wearable { slot }) = world.get_component::<Wearable>(&Entity::named(item)).copied() else {
            return Ok(Outcome::rejected(Rejection::UnknownTarget, "You can't wear that."));
        };
        if !world.require::<Inventory>(actor)?.contains(item) {
            return Ok(Outcome::rejected(
                Rejection::UnknownTarget,
                format!("You don't have a {item} to wear."),
            ));
        }
        let equipment = world.require_mut::<Equipment>(actor)?;
        match equipment.item_in(slot) {
            Some(current) if current == item => Ok(Outcome::rejected(
                Rejection::Precondition,
                format!("You're already wearing a {item}."),
            )),
            Some(current) => Ok(Outcome::rejected(
                Rejection::Precondition,
                format!("Your {slot} slot is taken by the {current}."),
            )),
            None => {
                equipment.equip(slot, item);
                debug!(entity = %actor, item, ?slot, "item equipped");
                let line = match slot {
                    EquipmentSlot::VacSuit => format!("You don the {item}."),
                    EquipmentSlot::Tool | EquipmentSlot::Weapon => format!("You ready the {item}."),
                };
                Ok(Outcome::done([line]))
            }
        }
    }

    pub fn remove_item(&self, world: &mut World, actor: &Entity, item: &str) -> Result<Outcome, WorldError> {
        if item.is_empty() {
            return Ok(Outcome::rejected(Rejection::UnknownTarget, "Remove what?"));
        }
        let wearable = world.has_component::<Wearable>(&Entity::named(item));
        let equipment = world.require_mut::<Equipment>(actor)?;
        let Some(slot) = equipment.slot_of(item) else {
            let line = if wearable {
                format!("You're not wearing a {item}.")
            } else {
                "You're not wearing that.".to_string()
            };
            return Ok(Outcome::rejected(Rejection::Precondition, line));
        };
        equipment.unequip(slot);
        debug!(entity = %actor, item, ?slot, "item unequipped");
        Ok(Outcome::done([format!("You remove the {item}.")]))
    }

    pub fn examine_item(&self, world: &World, actor: &Entity, item: &str) -> Result<Outcome, WorldError> {
        if item.is_empty() {
            return Ok(Outcome::rejected(Rejection::UnknownTarget, "Examine what?"));
        }
        let room_name = &world.require::<Position>(actor)?.room;
        let room = Entity::named(room_name);
        let visible = world
            .get_component::<Items>(&room)
            .is_some_and(|items| items.contains(item))
            || world
                .get_component::<FixedItems>(&room)
                .is_some_and(|fixed| fixed.contains(item))
            || world
                .get_component::<Inventory>(actor)
                .is_some_and(|inventory| inventory.contains(item));
        if !visible {
            return Ok(Outcome::rejected(
                Rejection::UnknownTarget,
                "Nothing special to see here.",
            ));
        }
        let text = world
            .require_system::<ItemDescriptionSystem>()?
            .describe_in_room(world, item, room_name)?;
        Ok(Outcome::done([text]))
    }
}

impl Default for ItemSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ItemSystem {
    fn name(&self) -> &str {
        "items"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::PLAYER;
    use crate::systems::testing::{move_player_to, ship_world};

    fn player() -> Entity {
        Entity::named(PLAYER)
    }

    fn room_items(world: &World, room: &str) -> Vec<String> {
        world
            .get_component::<Items>(&Entity::named(room))
            .unwrap()
            .items()
            .to_vec()
    }

    fn held(world: &World) -> Vec<String> {
        world.get_component::<Inventory>(&player()).unwrap().items().to_vec()
    }

    #[test]
    fn take_moves_item_into_inventory() {
        let mut world = ship_world();
        move_player_to(&mut world, "Engine");

        let outcome = ItemSystem::new().take_item(&mut world, &player(), "wrench").unwrap();

        assert_eq!(outcome.text(), "You take the wrench.");
        assert!(room_items(&world, "Engine").is_empty());
        assert_eq!(held(&world), vec!["wrench"]);
    }

    #[test]
    fn take_at_capacity_changes_nothing() {
        let mut world = ship_world();
        move_player_to(&mut world, "Ship Locker");
        let items = ItemSystem::new();
        world.get_component_mut::<Inventory>(&player()).unwrap().add("tarp");
        world.get_component_mut::<Inventory>(&player()).unwrap().add("flare");

        let outcome = items.take_item(&mut world, &player(), "vac-suit").unwrap();

        assert_eq!(outcome.rejection(), Some(Rejection::CapacityExceeded));
        assert_eq!(room_items(&world, "Ship Locker"), vec!["vac-suit", "tank"]);
        assert_eq!(held(&world), vec!["tarp", "flare"]);
    }

    #[test]
    fn fixtures_cannot_be_taken() {
        let mut world = ship_world();
        move_player_to(&mut world, "Bridge");

        let outcome = ItemSystem::new().take_item(&mut world, &player(), "window").unwrap();

        assert_eq!(outcome.rejection(), Some(Rejection::UnknownTarget));
        assert!(held(&world).is_empty());
    }

    #[test]
    fn wear_and_remove_suit() {
        let mut world = ship_world();
        move_player_to(&mut world, "Ship Locker");
        let items = ItemSystem::new();

        let not_held = items.wear_item(&mut world, &player(), "vac-suit").unwrap();
        assert_eq!(not_held.text(), "You don't have a vac-suit to wear.");

        items.take_item(&mut world, &player(), "vac-suit").unwrap();
        assert_eq!(
            items.wear_item(&mut world, &player(), "vac-suit").unwrap().text(),
            "You don the vac-suit."
        );
        assert!(world.get_component::<Equipment>(&player()).unwrap().is_suited());
        assert_eq!(
            items.wear_item(&mut world, &player(), "vac-suit").unwrap().text(),
            "You're already wearing a vac-suit."
        );

        let refused = items.drop_item(&mut world, &player(), "vac-suit").unwrap();
        assert_eq!(refused.rejection(), Some(Rejection::Precondition));

        assert_eq!(
            items.remove_item(&mut world, &player(), "vac-suit").unwrap().text(),
            "You remove the vac-suit."
        );
        assert_eq!(
            items.remove_item(&mut world, &player(), "vac-suit").unwrap().text(),
            "You're not wearing a vac-suit."
        );
        assert_eq!(
            items.wear_item(&mut world, &player(), "tank").unwrap().text(),
            "You can't wear that."
        );
    }

    #[test]
    fn drop_returns_item_to_room() {
        let mut world = ship_world();
        move_player_to(&mut world, "Engine");
        let items = ItemSystem::new();
        items.take_item(&mut world, &player(), "wrench").unwrap();
        move_player_to(&mut world, "Commons");

        let outcome = items.drop_item(&mut world, &player(), "wrench").unwrap();

        assert!(outcome.success());
        assert!(held(&world).is_empty());
        assert_eq!(room_items(&world, "Commons"), vec!["wrench"]);
        let again = items.drop_item(&mut world, &player(), "wrench").unwrap();
        assert_eq!(again.text(), "You don't have that.");
    }

    #[test]
    fn examine_needs_item_in_view() {
        let mut world = ship_world();
        move_player_to(&mut world, "Bridge");
        let items = ItemSystem::new();

        let window = items.examine_item(&world, &player(), "window").unwrap();
        assert_eq!(window.text(), "Stars wheel past the window.");

        let missing = items.examine_item(&world, &player(), "wrench").unwrap();
        assert_eq!(missing.text(), "Nothing special to see here.");
    }

    #[test]
    fn examine_without_description_system_is_an_error() {
        let mut world = ship_world();
        move_player_to(&mut world, "Bridge");
        let handle = world.scheduler().handle_of::<ItemDescriptionSystem>().unwrap();
        world.unregister_system(handle);

        let result = ItemSystem::new().examine_item(&world, &player(), "window");
        assert!(matches!(result, Err(WorldError::MissingSystem { .. })));
    }
}
