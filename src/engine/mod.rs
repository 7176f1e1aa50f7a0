//! Engine: owns the world and turns one input line into one [`Outcome`]

use tracing::{debug, info};

use crate::{
    command::{Command, HELP, UNKNOWN_COMMAND},
    components::{Position, PLAYER},
    ecs::{Entity, World, WorldError},
    scenario::{Scenario, ScenarioError},
    scheduler::System,
    session::{Ending, SessionState},
    systems::{
        AirlockSystem, DockingSystem, ItemDescriptionSystem, ItemSystem, MovementSystem, Outcome,
        Rejection, RenderSystem,
    },
};

pub struct EngineSettings {
    pub seed: u64,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// The six systems the game needs.
    pub fn with_default_systems(self) -> Self {
        self.with_system(RenderSystem::new())
            .with_system(MovementSystem::new())
            .with_system(ItemDescriptionSystem::new())
            .with_system(ItemSystem::new())
            .with_system(DockingSystem::new())
            .with_system(AirlockSystem::new())
    }

    pub fn build(self, scenario: &Scenario) -> Result<Engine, ScenarioError> {
        let mut world = scenario.build_world(self.settings.seed)?;
        for system in self.systems {
            world.register_boxed_system(system);
        }
        world.tick();
        info!(
            scenario = %scenario.name,
            seed = self.settings.seed,
            systems = world.scheduler().len(),
            "engine ready"
        );

        Ok(Engine {
            world,
            player: Entity::named(PLAYER),
            welcome: scenario.welcome.clone(),
        })
    }
}

pub struct Engine {
    world: World,
    player: Entity,
    welcome: Vec<String>,
}

impl Engine {
    /// Welcome banner followed by the starting room.
    pub fn start(&mut self) -> Result<Outcome, WorldError> {
        let room = self.player_room()?;
        let lines = self
            .world
            .run_system::<RenderSystem, _>(|render, world| render.display_room(world, &room, false))?;
        let mut outcome = Outcome::done(self.welcome.iter().cloned());
        outcome.extend(lines);
        Ok(outcome)
    }

    /// Handle one line of player input.
    ///
    /// While a hazard response is pending the line is the answer to the
    /// recovery prompt and is never parsed as a command.
    pub fn submit(&mut self, line: &str) -> Result<Outcome, WorldError> {
        let outcome = match self.world.session() {
            SessionState::Ended(_) => {
                return Ok(Outcome::rejected(
                    Rejection::Precondition,
                    "The session is over.",
                ))
            }
            SessionState::AwaitingHazardResponse { .. } => self
                .world
                .run_system::<AirlockSystem, _>(|airlock, world| airlock.resolve_hazard(world, line))?,
            SessionState::Active => {
                let command = Command::parse(line);
                debug!(?command, "dispatching");
                let outcome = self.dispatch(command)?;
                if self.world.session().is_active() {
                    let player = &self.player;
                    self.world
                        .run_system::<AirlockSystem, _>(|airlock, world| airlock.settle(world, player))?;
                }
                outcome
            }
        };
        self.world.tick();
        Ok(outcome)
    }

    fn dispatch(&mut self, command: Command) -> Result<Outcome, WorldError> {
        match command {
            Command::Go(direction) => self.move_player(&direction),
            Command::Look => self.look(),
            Command::Examine(item) => self.examine(&item),
            Command::Request(target) if target == "docking" => self.request_docking(),
            Command::Request(_) => Ok(Outcome::rejected(
                Rejection::UnknownTarget,
                "Request what? Try 'request docking' from the bridge.",
            )),
            Command::Initiate(target) if target == "docking" => self.initiate_docking(),
            Command::Initiate(_) => Ok(Outcome::rejected(
                Rejection::UnknownTarget,
                "Initiate what? Try 'initiate docking' from the bridge.",
            )),
            Command::Cycle(target) if target == "airlock" => self.cycle_airlock(),
            Command::Cycle(_) => Ok(Outcome::rejected(
                Rejection::UnknownTarget,
                "Cycle what? Try 'cycle airlock' from within the airlock.",
            )),
            Command::Inventory => self.inventory(),
            Command::Take(item) => self.take(&item),
            Command::Drop(item) => self.drop_item(&item),
            Command::Wear(item) => self.wear(&item),
            Command::Remove(item) => self.remove(&item),
            Command::Help => Ok(Outcome::done(HELP)),
            Command::Quit => Ok(self.quit()),
            Command::Empty => Ok(Outcome::done(Vec::<String>::new())),
            Command::Unknown(_) => Ok(Outcome::rejected(Rejection::UnknownTarget, UNKNOWN_COMMAND)),
        }
    }

    pub fn move_player(&mut self, direction: &str) -> Result<Outcome, WorldError> {
        let player = &self.player;
        self.world
            .run_system::<MovementSystem, _>(|movement, world| movement.move_entity(world, player, direction))
    }

    /// Full room description regardless of earlier visits.
    pub fn look(&mut self) -> Result<Outcome, WorldError> {
        let room = self.player_room()?;
        let lines = self
            .world
            .run_system::<RenderSystem, _>(|render, world| render.display_room(world, &room, true))?;
        Ok(Outcome::done(lines))
    }

    pub fn examine(&mut self, item: &str) -> Result<Outcome, WorldError> {
        let player = &self.player;
        self.world
            .run_system::<ItemSystem, _>(|items, world| items.examine_item(world, player, item))
    }

    pub fn request_docking(&mut self) -> Result<Outcome, WorldError> {
        let player = &self.player;
        self.world
            .run_system::<DockingSystem, _>(|docking, world| docking.request_docking(world, player))
    }

    pub fn initiate_docking(&mut self) -> Result<Outcome, WorldError> {
        let player = &self.player;
        self.world
            .run_system::<DockingSystem, _>(|docking, world| docking.initiate_docking(world, player))
    }

    pub fn cycle_airlock(&mut self) -> Result<Outcome, WorldError> {
        let player = &self.player;
        self.world
            .run_system::<AirlockSystem, _>(|airlock, world| airlock.cycle_airlock(world, player))
    }

    pub fn take(&mut self, item: &str) -> Result<Outcome, WorldError> {
        let player = &self.player;
        self.world
            .run_system::<ItemSystem, _>(|items, world| items.take_item(world, player, item))
    }

    pub fn drop_item(&mut self, item: &str) -> Result<Outcome, WorldError> {
        let player = &self.player;
        self.world
            .run_system::<ItemSystem, _>(|items, world| items.drop_item(world, player, item))
    }

    pub fn wear(&mut self, item: &str) -> Result<Outcome, WorldError> {
        let player = &self.player;
        self.world
            .run_system::<ItemSystem, _>(|items, world| items.wear_item(world, player, item))
    }

    pub fn remove(&mut self, item: &str) -> Result<Outcome, WorldError> {
        let player = &self.player;
        self.world
            .run_system::<ItemSystem, _>(|items, world| items.remove_item(world, player, item))
    }

    pub fn inventory(&self) -> Result<Outcome, WorldError> {
        let render = self.world.require_system::<RenderSystem>()?;
        Ok(Outcome::done(render.display_inventory(&self.world, &self.player)))
    }

    pub fn quit(&mut self) -> Outcome {
        self.world.set_session(SessionState::Ended(Ending::Quit));
        Outcome::done(["Shutting down systems. Goodbye, Commander."])
    }

    pub fn session(&self) -> SessionState {
        self.world.session()
    }

    pub fn is_over(&self) -> bool {
        self.world.session().ending().is_some()
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    fn player_room(&self) -> Result<Entity, WorldError> {
        Ok(Entity::named(&self.world.require::<Position>(&self.player)?.room))
    }
}
