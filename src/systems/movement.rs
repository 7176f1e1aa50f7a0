use std::any::Any;

use tracing::debug;

use super::{AirlockSystem, ExposureCheck, Outcome, Rejection, RenderSystem};
use crate::components::{Equipment, Exits, Position};
use crate::ecs::{Entity, World, WorldError};
use crate::scheduler::System;
use crate::session::HazardCause;

/// Moves entities along room exits. The only writer of [`Position`].
pub struct MovementSystem;

impl MovementSystem {
    pub fn new() -> Self {
        Self
    }

    /// Try to move `actor` one step in `direction`.
    ///
    /// Every attempt by an equipped actor is a turn for the airlock hazard,
    /// including attempts that hit a wall or name no direction.
    pub fn move_entity(
        &self,
        world: &mut World,
        actor: &Entity,
        direction: &str,
    ) -> Result<Outcome, WorldError> {
        let from = world.require::<Position>(actor)?.room.clone();
        let destination = world
            .require::<Exits>(&Entity::named(&from))?
            .get(direction)
            .filter(|_| !direction.is_empty())
            .filter(|to| *to != from)
            .map(str::to_string);
        let tracked = world.has_component::<Equipment>(actor);

        if let (Some(to), true) = (&destination, tracked) {
            let fatal = world.run_system::<AirlockSystem, _>(|airlock, world| {
                airlock.is_open_space_fatal(world, actor, to)
            })?;
            if fatal {
                return world.run_system::<AirlockSystem, _>(|airlock, world| {
                    Ok(airlock.trigger_fatal(world, HazardCause::OpenSpace))
                });
            }
        }

        let mut outcome = match &destination {
            Some(to) => {
                world.set_component(actor, Position::new(to.as_str()));
                debug!(entity = %actor, from = %from, to = %to, "moved");
                let room = Entity::named(to);
                let lines = world.run_system::<RenderSystem, _>(|render, world| {
                    render.display_room(world, &room, false)
                })?;
                Outcome::done(lines)
            }
            None if direction.is_empty() => Outcome::rejected(Rejection::UnknownTarget, "Go where?"),
            None => Outcome::rejected(Rejection::UnknownTarget, "You can't go that way."),
        };

        if !tracked {
            return Ok(outcome);
        }
        let check = world.run_system::<AirlockSystem, _>(|airlock, world| {
            airlock.record_turn(world, actor)
        })?;
        match check {
            ExposureCheck::Lethal => world.run_system::<AirlockSystem, _>(|airlock, world| {
                Ok(airlock.trigger_fatal(world, HazardCause::Exposure))
            }),
            ExposureCheck::Exposed { turns: 1, cycled: false } => {
                outcome.push(
                    "The air here is thin and bitterly cold. \
                     Suit up or cycle the airlock before the outer hatch vents.",
                );
                Ok(outcome)
            }
            _ => Ok(outcome),
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
