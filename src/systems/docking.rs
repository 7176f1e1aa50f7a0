use std::any::Any;

use rand::Rng;
use tracing::{info, warn};

use super::{Outcome, Rejection, RenderSystem};
use crate::components::{Callsigns, Docking, Landmarks, Position, DOCKING, SHIP};
use crate::ecs::{Entity, World, WorldError};
use crate::scheduler::System;

/// Docking sequence: unrequested, requested with a pad, then docked for good.
pub struct DockingSystem;

impl DockingSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn request_docking(&self, world: &mut World, actor: &Entity) -> Result<Outcome, WorldError> {
        if let Some(refusal) = self.require_command_deck(world, actor, "request")? {
            return Ok(refusal);
        }
        let docking_entity = Entity::named(DOCKING);
        if world.require::<Docking>(&docking_entity)?.requested() {
            return Ok(Outcome::rejected(
                Rejection::Precondition,
                "Docking already requested.",
            ));
        }

        let drawn = world.rng_stream("docking").gen_range(1..=Docking::PADS);
        let docking = world.require_mut::<Docking>(&docking_entity)?;
        if !docking.grant_clearance(drawn) {
            warn!(drawn, existing = ?docking.pad(), "clearance refused by docking state");
        }
        let pad = docking.pad().unwrap_or(drawn);
        info!(pad, "docking clearance granted");

        let Callsigns { ship, station } = world.require::<Callsigns>(&Entity::named(SHIP))?;
        Ok(Outcome::done([
            "You lean into the comms unit and key the mic.".to_string(),
            format!("{ship}: '{station}, this is {ship} requesting docking clearance. Over.'"),
            "...static crackles...".to_string(),
            format!(
                "{station}: '{ship}, this is {station} Control. Clearance granted. \
                 Proceed to docking pad {pad}. Maintain approach vector. Out.'"
            ),
        ]))
    }

    pub fn initiate_docking(&self, world: &mut World, actor: &Entity) -> Result<Outcome, WorldError> {
        if let Some(refusal) = self.require_command_deck(world, actor, "initiate")? {
            return Ok(refusal);
        }
        let docking_entity = Entity::named(DOCKING);
        let docking = world.require::<Docking>(&docking_entity)?;
        if !docking.is_ready_for_initiation() {
            let line = if docking.requested() {
                "Docking sequence already complete."
            } else {
                "You need to request docking clearance first."
            };
            return Ok(Outcome::rejected(Rejection::Precondition, line));
        }

        // Every lookup the cascade needs happens before the first write.
        let plan = world.run_system::<RenderSystem, _>(|render, world| {
            render.plan_docking_refresh(world, false)
        })?;
        let callsigns = world.require::<Callsigns>(&Entity::named(SHIP))?.clone();

        let docking = world.require_mut::<Docking>(&docking_entity)?;
        docking.complete();
        let pad = docking
            .pad()
            .map(|pad| pad.to_string())
            .unwrap_or_else(|| "?".to_string());
        world.run_system::<RenderSystem, _>(|render, world| render.apply_refresh(world, plan))?;
        info!(pad = %pad, "docking complete");

        let Callsigns { ship, station } = callsigns;
        Ok(Outcome::done([
            format!("You grip the controls and align {ship} with pad {pad}."),
            "The ship hums as thrusters fire, nudging you toward the starbase.".to_string(),
            "The docking arms loom larger in the window, guiding you in.".to_string(),
            "A soft thud reverberates as magnetic clamps engage.".to_string(),
            format!("{station}: '{ship}, docking complete. Welcome aboard.'"),
        ]))
    }

    fn require_command_deck(
        &self,
        world: &World,
        actor: &Entity,
        verb: &str,
    ) -> Result<Option<Outcome>, WorldError> {
        let room = &world.require::<Position>(actor)?.room;
        let deck = &world.require::<Landmarks>(&Entity::named(SHIP))?.command_deck;
        if room == deck {
            return Ok(None);
        }
        Ok(Some(Outcome::rejected(
            Rejection::InvalidLocation,
            format!("You can only {verb} docking from the {}.", deck.to_lowercase()),
        )))
    }
}

impl Default for DockingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DockingSystem {
    fn name(&self) -> &str {
        "docking"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Description, PLAYER};
    use crate::systems::testing::{move_player_to, ship_world};

    fn request(world: &mut World) -> Outcome {
        world
            .run_system::<DockingSystem, _>(|docking, world| {
                docking.request_docking(world, &Entity::named(PLAYER))
            })
            .unwrap()
    }

    fn initiate(world: &mut World) -> Outcome {
        world
            .run_system::<DockingSystem, _>(|docking, world| {
                docking.initiate_docking(world, &Entity::named(PLAYER))
            })
            .unwrap()
    }

    fn docking(world: &World) -> Docking {
        world
            .get_component::<Docking>(&Entity::named(DOCKING))
            .unwrap()
            .clone()
    }

    #[test]
    fn request_only_from_command_deck() {
        let mut world = ship_world();
        move_player_to(&mut world, "Hall");

        let outcome = request(&mut world);

        assert_eq!(outcome.rejection(), Some(Rejection::InvalidLocation));
        assert_eq!(outcome.text(), "You can only request docking from the bridge.");
        assert_eq!(docking(&world), Docking::new());
    }

    #[test]
    fn second_request_keeps_pad() {
        let mut world = ship_world();
        move_player_to(&mut world, "Bridge");

        assert!(request(&mut world).success());
        let first = docking(&world);
        assert!(first.requested());
        assert!(matches!(first.pad(), Some(1..=5)));

        let again = request(&mut world);
        assert_eq!(again.rejection(), Some(Rejection::Precondition));
        assert_eq!(again.text(), "Docking already requested.");
        assert_eq!(docking(&world).pad(), first.pad());
    }

    #[test]
    fn initiate_before_request_changes_nothing() {
        let mut world = ship_world();
        move_player_to(&mut world, "Bridge");

        let outcome = initiate(&mut world);

        assert_eq!(outcome.rejection(), Some(Rejection::Precondition));
        let state = docking(&world);
        assert!(!state.initiated());
        assert!(state.in_space());
    }

    #[test]
    fn initiate_docks_and_refreshes_descriptions() {
        let mut world = ship_world();
        move_player_to(&mut world, "Bridge");
        request(&mut world);

        let outcome = initiate(&mut world);

        assert!(outcome.success());
        let state = docking(&world);
        assert!(state.is_docked());
        let bridge = world.get_component::<Description>(&Entity::named("Bridge")).unwrap();
        assert_eq!(bridge.long, "The bridge, docked.");
        let airlock = world.get_component::<Description>(&Entity::named("Airlock")).unwrap();
        assert_eq!(airlock.long, "The airlock opens onto the starbase.");

        let again = initiate(&mut world);
        assert_eq!(again.text(), "Docking sequence already complete.");
    }

    #[test]
    fn pad_is_deterministic_for_a_seed() {
        let mut a = ship_world();
        let mut b = ship_world();
        move_player_to(&mut a, "Bridge");
        move_player_to(&mut b, "Bridge");
        request(&mut a);
        request(&mut b);
        assert_eq!(docking(&a).pad(), docking(&b).pad());
    }
}
