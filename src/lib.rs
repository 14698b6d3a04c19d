//! Deterministic tick-driven simulation of a top-down survival shooter.

pub mod agent;
pub mod combat;
pub mod config;
pub mod debug;
pub mod error;
pub mod input;
pub mod level;
pub mod logging;
pub mod pickup;
pub mod resources;
pub mod simulation;
pub mod snapshot;
pub mod types;
pub mod utils;
pub mod visibility;
pub mod weapon;

pub use agent::{Agent, AiState, EnemyType};
pub use config::SimSettings;
pub use debug::ResourceOverrides;
pub use error::SimError;
pub use input::{ActionFlags, InputState};
pub use level::{GenerationError, Level, LevelParams, generate_level};
pub use simulation::{Simulation, SimulationState};
pub use snapshot::{DeathCause, Outcome, SimEvent, Snapshot};
pub use types::{AgentId, EntityId, Faction, Point, TileCoord};
pub use visibility::{ConeParams, VisibilityField, compute_visibility};
