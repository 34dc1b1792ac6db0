// Win/loss records from decided games.

use serde::Serialize;

use crate::model::{Game, PickSet};

/// A player's record over decided games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
}

impl Record {
    pub fn decided(&self) -> u32 {
        self.wins + self.losses
    }

    /// Winning fraction in `[0, 1]`. Zero decided games report `0.0`.
    pub fn percentage(&self) -> f64 {
        let decided = self.decided();
        if decided == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(decided)
    }

    /// Baseball-style rendering: `.667`, `1.000`, `.000`.
    pub fn percentage_display(&self) -> String {
        let pct = self.percentage();
        if pct >= 1.0 {
            return "1.000".to_string();
        }
        let formatted = format!("{pct:.3}");
        formatted.trim_start_matches('0').to_string()
    }
}

/// Whether `player` called the winner of `game`. Undecided games, missing
/// picks, and winners outside the game all count as no match.
pub fn is_correct(player: &PickSet, game: &Game) -> bool {
    match (&game.winner, player.pick_for(&game.id)) {
        (Some(winner), Some(pick)) => winner == pick,
        _ => false,
    }
}

/// Score `player` against every decided game.
///
/// Undecided games are skipped entirely. A decided game the player did not
/// pick is a loss, never a bye.
pub fn compute_record(player: &PickSet, games: &[Game]) -> Record {
    let mut record = Record::default();
    for game in games.iter().filter(|g| g.is_decided()) {
        if is_correct(player, game) {
            record.wins += 1;
        } else {
            record.losses += 1;
        }
    }
    record
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
