pub mod command;
pub mod components;
pub mod config;
pub mod ecs;
pub mod engine;
pub mod rng;
pub mod scenario;
pub mod scheduler;
pub mod session;
pub mod systems;

pub use config::GameConfig;
pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use scenario::{Scenario, ScenarioLoader};
pub use session::SessionState;
pub use systems::{Outcome, Rejection, Status};
