// Engine error type.

use thiserror::Error;

use crate::model::{GameId, TeamRef};

/// Contract violations surfaced by the engine.
///
/// Scoring itself never fails on messy data; these errors are raised only by
/// explicit validation, checked override pinning, and cancelled simulations.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("game `{game}` records winner `{winner}`, which plays in neither slot")]
    WinnerNotInGame { game: GameId, winner: TeamRef },

    #[error("team `{team}` does not play in game `{game}`")]
    TeamNotInGame { game: GameId, team: TeamRef },

    #[error("duplicate game id `{0}`")]
    DuplicateGame(GameId),

    #[error("duplicate player `{0}`")]
    DuplicatePlayer(String),

    #[error("simulation cancelled after {completed} trials")]
    Cancelled { completed: u32 },
}
