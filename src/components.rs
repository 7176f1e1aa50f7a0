use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ecs::Component;

/// Key of the player entity.
pub const PLAYER: &str = "player";
/// Key of the entity holding the ship's [`Docking`] state.
pub const DOCKING: &str = "docking";
/// Key of the entity holding the [`AirlockState`].
pub const AIRLOCK_STATE: &str = "airlock";
/// Key of the entity holding the ship's [`Landmarks`] and [`Callsigns`].
pub const SHIP: &str = "ship";

/// Number of unprotected turns in the airlock that kills.
pub const HAZARD_THRESHOLD: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub room: String,
}

impl Position {
    pub fn new(room: impl Into<String>) -> Self {
        Self { room: room.into() }
    }
}

/// Direction label to destination room, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Exits {
    routes: Vec<(String, String)>,
}

impl Exits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, direction: impl Into<String>, destination: impl Into<String>) {
        let direction = direction.into();
        let destination = destination.into();
        match self.routes.iter_mut().find(|(dir, _)| *dir == direction) {
            Some(route) => route.1 = destination,
            None => self.routes.push((direction, destination)),
        }
    }

    pub fn get(&self, direction: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|(dir, _)| dir == direction)
            .map(|(_, destination)| destination.as_str())
    }

    pub fn directions(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(dir, _)| dir.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inventory {
    items: Vec<String>,
    capacity: usize,
}

impl Inventory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Returns false, leaving the inventory untouched, when full.
    pub fn add(&mut self, item: impl Into<String>) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item.into());
        true
    }

    pub fn remove(&mut self, item: &str) -> bool {
        match self.items.iter().position(|held| held == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|held| held == item)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentSlot {
    VacSuit,
    Tool,
    Weapon,
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EquipmentSlot::VacSuit => "suit",
            EquipmentSlot::Tool => "tool",
            EquipmentSlot::Weapon => "weapon",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Equipment {
    equipped: BTreeMap<EquipmentSlot, String>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equip(&mut self, slot: EquipmentSlot, item: impl Into<String>) -> Option<String> {
        self.equipped.insert(slot, item.into())
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<String> {
        self.equipped.remove(&slot)
    }

    pub fn item_in(&self, slot: EquipmentSlot) -> Option<&str> {
        self.equipped.get(&slot).map(String::as_str)
    }

    pub fn is_equipped(&self, slot: EquipmentSlot) -> bool {
        self.equipped.contains_key(&slot)
    }

    pub fn slot_of(&self, item: &str) -> Option<EquipmentSlot> {
        self.equipped
            .iter()
            .find(|(_, equipped)| *equipped == item)
            .map(|(slot, _)| *slot)
    }

    pub fn is_suited(&self) -> bool {
        self.is_equipped(EquipmentSlot::VacSuit)
    }
}

/// Takeable items lying in a room.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Items {
    items: Vec<String>,
}

impl Items {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    pub fn remove(&mut self, item: &str) -> bool {
        match self.items.iter().position(|present| present == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|present| present == item)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}

/// Fixtures in a room: examinable, never takeable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedItems {
    items: Vec<String>,
}

impl FixedItems {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|present| present == item)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Description {
    pub short: String,
    pub long: String,
    pub first_visit: bool,
}

impl Description {
    pub fn new(short: impl Into<String>, long: impl Into<String>) -> Self {
        Self {
            short: short.into(),
            long: long.into(),
            first_visit: true,
        }
    }
}

/// Long descriptions for a room whose view depends on the docking state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DockedVariant {
    pub in_space: String,
    pub docked: String,
}

impl DockedVariant {
    pub fn for_state(&self, in_space: bool) -> &str {
        if in_space {
            &self.in_space
        } else {
            &self.docked
        }
    }
}

/// Docking sequence. Only moves forward: unrequested, cleared with a pad, docked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Docking {
    requested: bool,
    initiated: bool,
    /// Assigned pad in 1..=5, `None` until clearance is granted.
    pad: Option<u8>,
    in_space: bool,
}

impl Docking {
    pub const PADS: u8 = 5;

    pub fn new() -> Self {
        Self {
            requested: false,
            initiated: false,
            pad: None,
            in_space: true,
        }
    }

    pub fn requested(&self) -> bool {
        self.requested
    }

    pub fn initiated(&self) -> bool {
        self.initiated
    }

    pub fn in_space(&self) -> bool {
        self.in_space
    }

    pub fn pad(&self) -> Option<u8> {
        self.pad
    }

    /// Record clearance for `pad`. Refused if already requested or `pad` is out of range.
    pub fn grant_clearance(&mut self, pad: u8) -> bool {
        if self.requested || !(1..=Self::PADS).contains(&pad) {
            return false;
        }
        self.requested = true;
        self.pad = Some(pad);
        true
    }

    pub fn is_ready_for_initiation(&self) -> bool {
        self.requested && !self.initiated
    }

    /// Dock for good. Refused unless cleared and not yet docked.
    pub fn complete(&mut self) -> bool {
        if !self.is_ready_for_initiation() {
            return false;
        }
        self.initiated = true;
        self.in_space = false;
        true
    }

    pub fn is_docked(&self) -> bool {
        self.initiated && !self.in_space
    }
}

impl Default for Docking {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AirlockState {
    pub unprotected_turns: u32,
    pub cycled: bool,
}

impl AirlockState {
    pub fn reset(&mut self) {
        self.unprotected_turns = 0;
        self.cycled = false;
    }

    pub fn is_lethal(&self) -> bool {
        self.unprotected_turns >= HAZARD_THRESHOLD && !self.cycled
    }
}

/// Rooms with special roles in the ship's state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmarks {
    pub command_deck: String,
    pub airlock: String,
    pub open_space: String,
}

/// Radio names used in docking chatter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callsigns {
    pub ship: String,
    pub station: String,
}

/// Marks an item that occupies an equipment slot when worn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wearable {
    pub slot: EquipmentSlot,
}

/// Context-sensitive examine text for an item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemDescription {
    pub default: Option<String>,
    pub rooms: BTreeMap<String, String>,
    pub rooms_docked: BTreeMap<String, String>,
}

impl ItemDescription {
    pub fn describe(&self, room: &str, in_space: bool) -> Option<&str> {
        let docked = if in_space {
            None
        } else {
            self.rooms_docked.get(room)
        };
        docked
            .or_else(|| self.rooms.get(room))
            .or(self.default.as_ref())
            .map(String::as_str)
    }
}

impl Component for Position {}
impl Component for Exits {}
impl Component for Inventory {}
impl Component for Equipment {}
impl Component for Items {}
impl Component for FixedItems {}
impl Component for Description {}
impl Component for DockedVariant {}
impl Component for Docking {}
impl Component for AirlockState {}
impl Component for Landmarks {}
impl Component for Callsigns {}
impl Component for Wearable {}
impl Component for ItemDescription {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_refuses_past_capacity() {
        let mut inventory = Inventory::with_capacity(2);
        assert!(inventory.add("wrench"));
        assert!(inventory.add("tank"));
        assert!(inventory.is_full());
        assert!(!inventory.add("tarp"));
        assert_eq!(inventory.items(), ["wrench", "tank"]);
    }

    #[test]
    fn exits_keep_declaration_order() {
        let mut exits = Exits::new();
        exits.add("port", "Stateroom");
        exits.add("aft", "Commons");
        exits.add("fore", "Bridge");
        exits.add("aft", "Engine");

        assert_eq!(exits.directions().collect::<Vec<_>>(), ["port", "aft", "fore"]);
        assert_eq!(exits.get("aft"), Some("Engine"));
        assert_eq!(exits.get("down"), None);
    }

    #[test]
    fn clearance_is_granted_once_and_in_range() {
        let mut docking = Docking::new();
        assert!(!docking.grant_clearance(0));
        assert!(!docking.grant_clearance(6));
        assert!(!docking.requested());
        assert!(docking.grant_clearance(3));
        assert!(!docking.grant_clearance(4));
        assert_eq!(docking.pad(), Some(3));
        assert!(docking.requested());
    }

    #[test]
    fn docking_completes_once_and_only_after_clearance() {
        let mut docking = Docking::new();
        assert!(!docking.is_ready_for_initiation());
        assert!(!docking.complete());
        assert!(docking.in_space());

        docking.grant_clearance(2);
        assert!(docking.is_ready_for_initiation());
        assert!(docking.complete());
        assert!(docking.is_docked());
        assert!(!docking.in_space());

        assert!(!docking.is_ready_for_initiation());
        assert!(!docking.complete());
        assert!(docking.is_docked());
    }

    #[test]
    fn airlock_is_lethal_at_threshold_unless_cycled() {
        let mut state = AirlockState::default();
        state.unprotected_turns = HAZARD_THRESHOLD - 1;
        assert!(!state.is_lethal());
        state.unprotected_turns = HAZARD_THRESHOLD;
        assert!(state.is_lethal());
        state.cycled = true;
        assert!(!state.is_lethal());
        state.reset();
        assert_eq!(state, AirlockState::default());
    }

    #[test]
    fn item_description_prefers_docked_then_room_then_default() {
        let mut desc = ItemDescription {
            default: Some("A window.".into()),
            ..Default::default()
        };
        desc.rooms.insert("Bridge".into(), "Stars.".into());
        desc.rooms_docked.insert("Bridge".into(), "The starbase.".into());

        assert_eq!(desc.describe("Bridge", true), Some("Stars."));
        assert_eq!(desc.describe("Bridge", false), Some("The starbase."));
        assert_eq!(desc.describe("Commons", false), Some("A window."));
    }
}
