//! # Game Error Types

use kestrel_core::EcsError;
use kestrel_shared::ConfigError;
use thiserror::Error;

/// Errors surfaced by the game loop.
#[derive(Error, Debug)]
pub enum GameError {
    /// Configuration could not be loaded or is out of range.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A system, hook or condition event failed.
    #[error("ecs error: {0}")]
    Ecs(#[from] EcsError),
}

/// Result alias for game loop operations.
pub type GameResult<T> = Result<T, GameError>;
