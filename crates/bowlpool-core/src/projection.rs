// What-if projection: deterministic wins under hypothetical results.
//
// A caller pins winners for undecided games; every game then has an
// "effective winner" (real result, else the pin, else none) and players are
// scored against those. No randomness is involved.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::EngineError;
use crate::model::{Game, GameId, PickSet, TeamRef};
use crate::rank::{rank_by_wins, Ranked};

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Hypothetical winners keyed by game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides(HashMap<GameId, TeamRef>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a pin. Pinning the team already pinned for `game` clears it;
    /// pinning the other team replaces the old pin. Returns whether a pin is
    /// in place afterwards.
    pub fn toggle(&mut self, game: GameId, team: TeamRef) -> bool {
        if self.0.get(&game) == Some(&team) {
            self.0.remove(&game);
            false
        } else {
            self.0.insert(game, team);
            true
        }
    }

    /// Pin `team` for `game` after checking it actually plays in that game.
    pub fn pin_checked(&mut self, game: &Game, team: TeamRef) -> Result<(), EngineError> {
        if !game.involves(&team) {
            return Err(EngineError::TeamNotInGame {
                game: game.id.clone(),
                team,
            });
        }
        self.0.insert(game.id.clone(), team);
        Ok(())
    }

    pub fn get(&self, game: &GameId) -> Option<&TeamRef> {
        self.0.get(game)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Real winner when decided, otherwise the pinned winner, otherwise none.
pub fn effective_winner<'a>(game: &'a Game, overrides: &'a Overrides) -> Option<&'a TeamRef> {
    game.winner.as_ref().or_else(|| overrides.get(&game.id))
}

/// Projected wins per player name across decided and pinned games.
pub fn project(games: &[Game], players: &[PickSet], overrides: &Overrides) -> HashMap<String, u32> {
    players
        .iter()
        .map(|player| {
            let wins = games
                .iter()
                .filter(|game| {
                    match (effective_winner(game, overrides), player.pick_for(&game.id)) {
                        (Some(winner), Some(pick)) => winner == pick,
                        _ => false,
                    }
                })
                .count() as u32;
            (player.player_name.clone(), wins)
        })
        .collect()
}

/// One row of the projected table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedStanding {
    pub name: String,
    pub wins: u32,
    pub rank: u32,
}

impl Ranked for ProjectedStanding {
    fn wins(&self) -> u32 {
        self.wins
    }

    fn set_rank(&mut self, rank: u32) {
        self.rank = rank;
    }
}

/// Projected wins ranked with the standard competition ranking. Players keep
/// their input order within a tie.
pub fn projected_standings(
    games: &[Game],
    players: &[PickSet],
    overrides: &Overrides,
) -> Vec<ProjectedStanding> {
    let wins = project(games, players, overrides);
    let mut rows: Vec<ProjectedStanding> = players
        .iter()
        .map(|p| ProjectedStanding {
            name: p.player_name.clone(),
            wins: wins.get(&p.player_name).copied().unwrap_or(0),
            rank: 0,
        })
        .collect();
    rank_by_wins(&mut rows);
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
