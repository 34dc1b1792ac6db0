// Scoring, ranking and projection engine for a bowl-game pick'em pool.
//
// Everything here is pure computation over value types: callers hand in a
// `PoolData` snapshot and receive freshly computed output on every call.

pub mod consensus;
pub mod elimination;
pub mod error;
pub mod model;
pub mod projection;
pub mod rank;
pub mod score;
pub mod simulation;
pub mod standings;
pub mod streak;

pub use error::EngineError;
pub use model::{Game, GameId, PickSet, PoolData, TeamRef};
pub use standings::{build_standings, compute_standings, PlayerStanding};
