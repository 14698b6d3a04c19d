// Level generation errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("only {placed} rooms placed, at least {required} required")]
    TooFewRooms { placed: usize, required: usize },
    #[error("{unreachable} rooms unreachable from the start room")]
    Disconnected { unreachable: usize },
    #[error("level generation failed after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error("invalid generation parameters: {0}")]
    InvalidParams(String),
}
