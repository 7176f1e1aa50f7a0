use std::any::Any;

use tracing::{debug, info, warn};

use super::{Outcome, Rejection};
use crate::components::{AirlockState, Docking, Equipment, Landmarks, Position, AIRLOCK_STATE, DOCKING, SHIP};
use crate::ecs::{Entity, World, WorldError};
use crate::scheduler::System;
use crate::session::{Ending, HazardCause, SessionState, SAFETY_PHRASE};

/// What one turn in (or out of) the airlock did to the exposure counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExposureCheck {
    /// Not exposed; counter and cycle flag cleared.
    Clear,
    Exposed { turns: u32, cycled: bool },
    Lethal,
}

/// Hazard rules for the airlock and the vacuum beyond it.
///
/// An actor is exposed while standing in the airlock, unsuited, with the ship
/// still in space. Every movement turn spent exposed counts; reaching
/// [`HAZARD_THRESHOLD`](crate::components::HAZARD_THRESHOLD) turns without a
/// cycle is fatal. Stepping into open space unsuited is fatal at once.
pub struct AirlockSystem;

impl AirlockSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn is_exposed(&self, world: &World, actor: &Entity) -> Result<bool, WorldError> {
        let room = &world.require::<Position>(actor)?.room;
        let airlock = &world.require::<Landmarks>(&Entity::named(SHIP))?.airlock;
        Ok(room == airlock && self.unprotected_in_space(world, actor)?)
    }

    /// Whether moving `actor` into `destination` means stepping into vacuum unsuited.
    pub fn is_open_space_fatal(
        &self,
        world: &World,
        actor: &Entity,
        destination: &str,
    ) -> Result<bool, WorldError> {
        let open_space = &world.require::<Landmarks>(&Entity::named(SHIP))?.open_space;
        Ok(destination == open_space && self.unprotected_in_space(world, actor)?)
    }

    /// Count one movement turn against the exposure counter.
    pub fn record_turn(&self, world: &mut World, actor: &Entity) -> Result<ExposureCheck, WorldError> {
        let exposed = self.is_exposed(world, actor)?;
        let state = world.require_mut::<AirlockState>(&Entity::named(AIRLOCK_STATE))?;
        if !exposed {
            if state.unprotected_turns > 0 || state.cycled {
                debug!("exposure ended, airlock state cleared");
            }
            state.reset();
            return Ok(ExposureCheck::Clear);
        }
        state.unprotected_turns += 1;
        debug!(turns = state.unprotected_turns, cycled = state.cycled, "unprotected turn in airlock");
        if state.is_lethal() {
            return Ok(ExposureCheck::Lethal);
        }
        Ok(ExposureCheck::Exposed {
            turns: state.unprotected_turns,
            cycled: state.cycled,
        })
    }

    /// Clear the counter if the actor is no longer exposed. Never counts a turn.
    pub fn settle(&self, world: &mut World, actor: &Entity) -> Result<(), WorldError> {
        if !self.is_exposed(world, actor)? {
            world
                .require_mut::<AirlockState>(&Entity::named(AIRLOCK_STATE))?
                .reset();
        }
        Ok(())
    }

    pub fn cycle_airlock(&self, world: &mut World, actor: &Entity) -> Result<Outcome, WorldError> {
        let room = &world.require::<Position>(actor)?.room;
        let airlock = &world.require::<Landmarks>(&Entity::named(SHIP))?.airlock;
        if room != airlock {
            return Ok(Outcome::rejected(
                Rejection::InvalidLocation,
                "You can only cycle the airlock from within it.",
            ));
        }
        let in_space = world.require::<Docking>(&Entity::named(DOCKING))?.in_space();
        let suited = world.require::<Equipment>(actor)?.is_suited();

        world
            .require_mut::<AirlockState>(&Entity::named(AIRLOCK_STATE))?
            .cycled = true;
        info!(in_space, suited, "airlock cycled");

        let follow_up = match (in_space, suited) {
            (true, true) => "You float weightless, the stars endless around you.",
            (true, false) => {
                "Without a suit the outer hatch stays locked. Fresh air floods the chamber."
            }
            (false, _) => "Beyond the hatch, the starbase's pressurized corridor waits.",
        };
        Ok(Outcome::done([
            "You cycle the airlock. The hatch controls chime.",
            follow_up,
        ]))
    }

    /// Hand control to the recovery prompt.
    pub fn trigger_fatal(&self, world: &mut World, cause: HazardCause) -> Outcome {
        warn!(?cause, "fatal hazard");
        world.set_session(SessionState::AwaitingHazardResponse { cause });
        let opening = match cause {
            HazardCause::OpenSpace => {
                "You step through the outer hatch without a suit. The void takes the air from your lungs."
            }
            HazardCause::Exposure => {
                "The outer hatch opens to the void. Silence engulfs you as the air rushes out."
            }
        };
        Outcome::fatal(
            cause,
            [
                opening,
                "Your vision blurs, ice crystals form on your skin, and your lungs burn.",
                "You float weightless, the stars spinning around you.",
                "You have one chance to survive. Cycle the airlock now, or perish.",
            ],
        )
    }

    /// Consume the one line answering the recovery prompt.
    pub fn resolve_hazard(&self, world: &mut World, answer: &str) -> Result<Outcome, WorldError> {
        let SessionState::AwaitingHazardResponse { cause } = world.session() else {
            return Ok(Outcome::rejected(
                Rejection::Precondition,
                "There is nothing to answer.",
            ));
        };
        if answer.trim().to_lowercase() == SAFETY_PHRASE {
            world
                .require_mut::<AirlockState>(&Entity::named(AIRLOCK_STATE))?
                .cycled = true;
            world.set_session(SessionState::Active);
            info!(?cause, "survived fatal hazard");
            return Ok(Outcome::done([
                "You slam the controls. The hatch seals, and air floods back in.",
                "You collapse, gasping, but alive.",
            ]));
        }
        world.set_session(SessionState::Ended(Ending::Died));
        Ok(Outcome::fatal(
            cause,
            ["The void claims you. Your body drifts among the stars."],
        ))
    }

    fn unprotected_in_space(&self, world: &World, actor: &Entity) -> Result<bool, WorldError> {
        let in_space = world.require::<Docking>(&Entity::named(DOCKING))?.in_space();
        let suited = world.require::<Equipment>(actor)?.is_suited();
        Ok(in_space && !suited)
    }
}

impl Default for AirlockSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for AirlockSystem {
    fn name(&self) -> &str {
        "airlock"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
