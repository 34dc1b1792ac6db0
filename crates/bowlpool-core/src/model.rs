// Canonical pool entities: games, teams, and per-player pick sets.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Stable identifier of a bowl game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        GameId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        GameId::new(s)
    }
}

/// Opaque team identifier.
///
/// Labels are canonicalized exactly once, in [`TeamRef::from_label`], so the
/// rest of the engine compares teams by equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamRef(String);

impl TeamRef {
    /// Canonicalize a display label: trim, collapse inner whitespace, lowercase.
    ///
    /// Returns `None` for a blank label.
    pub fn from_label(label: &str) -> Option<Self> {
        let canonical = label
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if canonical.is_empty() {
            None
        } else {
            Some(TeamRef(canonical))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// A single bowl game. Decided iff `winner` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub date: Option<NaiveDate>,
    /// Minutes after midnight, local to the published schedule.
    pub kickoff_minutes: Option<u32>,
    /// The published kickoff time exists but could not be read. Such a game
    /// has no chronological position even when dated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub kickoff_unresolved: bool,
    pub team_a: TeamRef,
    pub team_b: TeamRef,
    pub winner: Option<TeamRef>,
}

impl Game {
    /// Build an undated, undecided game.
    pub fn new(id: impl Into<String>, name: impl Into<String>, team_a: TeamRef, team_b: TeamRef) -> Self {
        Game {
            id: GameId::new(id),
            name: name.into(),
            date: None,
            kickoff_minutes: None,
            kickoff_unresolved: false,
            team_a,
            team_b,
            winner: None,
        }
    }

    /// Set the schedule slot.
    pub fn scheduled(mut self, date: NaiveDate, kickoff_minutes: Option<u32>) -> Self {
        self.date = Some(date);
        self.kickoff_minutes = kickoff_minutes;
        self
    }

    /// Mark the kickoff time as unreadable.
    pub fn with_unresolved_kickoff(mut self) -> Self {
        self.kickoff_minutes = None;
        self.kickoff_unresolved = true;
        self
    }

    /// Record the winner.
    pub fn won_by(mut self, winner: TeamRef) -> Self {
        self.winner = Some(winner);
        self
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// Whether `team` plays in this game.
    pub fn involves(&self, team: &TeamRef) -> bool {
        &self.team_a == team || &self.team_b == team
    }

    /// Chronological key. `None` when the game has no date, an unreadable
    /// kickoff time, or a time that does not fit in a day; such games are
    /// left out of ordered passes. A dated game with no kickoff time sorts at
    /// the start of its day.
    pub fn kickoff(&self) -> Option<NaiveDateTime> {
        if self.kickoff_unresolved {
            return None;
        }
        let date = self.date?;
        let minutes = self.kickoff_minutes.unwrap_or(0);
        date.and_hms_opt(minutes / 60, minutes % 60, 0)
    }
}

// ---------------------------------------------------------------------------
// PickSet
// ---------------------------------------------------------------------------

/// One player's picks. Games without an entry count as losses once decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickSet {
    pub player_name: String,
    pub picks: HashMap<GameId, TeamRef>,
    /// Passed through for the surrounding application; unused by scoring.
    pub tiebreaker_score: Option<f64>,
}

impl PickSet {
    pub fn new(player_name: impl Into<String>) -> Self {
        PickSet {
            player_name: player_name.into(),
            picks: HashMap::new(),
            tiebreaker_score: None,
        }
    }

    /// Builder-style pick insertion.
    pub fn with_pick(mut self, game: impl Into<String>, team: TeamRef) -> Self {
        self.picks.insert(GameId::new(game), team);
        self
    }

    pub fn pick_for(&self, game: &GameId) -> Option<&TeamRef> {
        self.picks.get(game)
    }
}

// ---------------------------------------------------------------------------
// PoolData
// ---------------------------------------------------------------------------

/// Immutable snapshot of everything the engine needs: the season's games and
/// every player's picks. Built by a data source and passed in explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolData {
    pub games: Vec<Game>,
    pub players: Vec<PickSet>,
}

impl PoolData {
    pub fn new(games: Vec<Game>, players: Vec<PickSet>) -> Self {
        PoolData { games, players }
    }

    pub fn decided_count(&self) -> usize {
        self.games.iter().filter(|g| g.is_decided()).count()
    }

    /// Decided games whose winner matches neither participant.
    pub fn out_of_game_winners(&self) -> Vec<&Game> {
        self.games
            .iter()
            .filter(|g| g.winner.as_ref().is_some_and(|w| !g.involves(w)))
            .collect()
    }

    /// Check structural contracts: unique game ids, unique player names, and
    /// winners that belong to their game. Reports the first violation.
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut seen_games = HashSet::new();
        for game in &self.games {
            if !seen_games.insert(&game.id) {
                return Err(EngineError::DuplicateGame(game.id.clone()));
            }
        }

        let mut seen_players = HashSet::new();
        for player in &self.players {
            if !seen_players.insert(player.player_name.as_str()) {
                return Err(EngineError::DuplicatePlayer(player.player_name.clone()));
            }
        }

        for game in &self.games {
            if let Some(winner) = &game.winner {
                if !game.involves(winner) {
                    return Err(EngineError::WinnerNotInGame {
                        game: game.id.clone(),
                        winner: winner.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
