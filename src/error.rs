use crate::level::GenerationError;
use crate::types::AgentId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("level generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("no agent with id {0}")]
    UnknownAgent(AgentId),
    #[error("player agent missing from simulation state")]
    PlayerMissing,
    #[error("invalid floor index {0}")]
    InvalidFloor(u32),
    #[error("state serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
