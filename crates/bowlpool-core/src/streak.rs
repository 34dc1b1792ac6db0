// Win/loss streaks over games in kickoff order.

use serde::Serialize;

use crate::model::{Game, PickSet};
use crate::score::is_correct;

/// Streak summary for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streaks {
    /// Signed running streak after the last decided game: positive for
    /// consecutive correct picks, negative for consecutive misses.
    pub current: i32,
    pub max_win: u32,
    pub max_loss: u32,
}

impl Streaks {
    /// `W3`, `L2`, or `-` when no decided game has been played.
    pub fn display(&self) -> String {
        match self.current {
            0 => "-".to_string(),
            n if n > 0 => format!("W{n}"),
            n => format!("L{}", n.unsigned_abs()),
        }
    }
}

/// Games that have a resolvable kickoff, in ascending kickoff order.
///
/// Games sharing a kickoff keep their input order. Undated games are dropped
/// from this ordering only; they still count in win/loss totals elsewhere.
pub fn chronological(games: &[Game]) -> Vec<&Game> {
    let mut ordered: Vec<(&Game, chrono::NaiveDateTime)> = games
        .iter()
        .filter_map(|g| g.kickoff().map(|k| (g, k)))
        .collect();
    ordered.sort_by_key(|(_, kickoff)| *kickoff);
    ordered.into_iter().map(|(g, _)| g).collect()
}

/// Walk `ordered` (already chronological) and track the signed running
/// streak plus the longest win and loss runs. Undecided games are skipped.
pub fn compute_streaks(player: &PickSet, ordered: &[&Game]) -> Streaks {
    let mut streaks = Streaks::default();

    for game in ordered.iter().filter(|g| g.is_decided()) {
        if is_correct(player, game) {
            streaks.current = if streaks.current >= 0 { streaks.current + 1 } else { 1 };
            streaks.max_win = streaks.max_win.max(streaks.current.unsigned_abs());
        } else {
            streaks.current = if streaks.current <= 0 { streaks.current - 1 } else { -1 };
            streaks.max_loss = streaks.max_loss.max(streaks.current.unsigned_abs());
        }
    }

    streaks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TeamRef;
    use chrono::NaiveDate;

    fn team(label: &str) -> TeamRef {
        TeamRef::from_label(label).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    /// Decided game on December `d` won by "home".
    fn decided(id: &str, d: u32, minutes: Option<u32>) -> Game {
        Game::new(id, id, team("home"), team("away"))
            .scheduled(day(d), minutes)
            .won_by(team("home"))
    }

    fn picks(pattern: &[(&str, bool)]) -> PickSet {
        pattern.iter().fold(PickSet::new("P"), |set, (id, correct)| {
            set.with_pick(*id, team(if *correct { "home" } else { "away" }))
        })
    }

    #[test]
    fn chronological_sorts_and_drops_undated() {
        let games = vec![
            decided("late", 30, Some(20 * 60)),
            Game::new("undated", "undated", team("home"), team("away")).won_by(team("home")),
            decided("early", 20, None),
            decided("same_day_noon", 30, Some(12 * 60)),
        ];
        let ids: Vec<&str> = chronological(&games).iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "same_day_noon", "late"]);
    }

    #[test]
    fn chronological_ties_keep_input_order() {
        let games = vec![decided("b", 27, Some(600)), decided("a", 27, Some(600))];
        let ids: Vec<&str> = chronological(&games).iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn tracks_current_and_max_streaks() {
        let games: Vec<Game> = (1..=7).map(|d| decided(&format!("g{d}"), d + 19, None)).collect();
        let player = picks(&[
            ("g1", true),
            ("g2", true),
            ("g3", true),
            ("g4", false),
            ("g5", false),
            ("g6", true),
            ("g7", false),
        ]);

        let streaks = compute_streaks(&player, &chronological(&games));
        assert_eq!(streaks.current, -1);
        assert_eq!(streaks.max_win, 3);
        assert_eq!(streaks.max_loss, 2);
        assert_eq!(streaks.display(), "L1");
    }

    #[test]
    fn undecided_games_do_not_break_streaks() {
        let games = vec![
            decided("g1", 20, None),
            Game::new("pending", "pending", team("home"), team("away")).scheduled(day(21), None),
            decided("g2", 22, None),
        ];
        let player = picks(&[("g1", true), ("g2", true)]);
        let streaks = compute_streaks(&player, &chronological(&games));
        assert_eq!(streaks.current, 2);
        assert_eq!(streaks.display(), "W2");
    }

    #[test]
    fn missing_pick_extends_loss_streak() {
        let games = vec![decided("g1", 20, None), decided("g2", 21, None)];
        let player = PickSet::new("Blank");
        let streaks = compute_streaks(&player, &chronological(&games));
        assert_eq!(streaks.current, -2);
        assert_eq!(streaks.max_loss, 2);
        assert_eq!(streaks.max_win, 0);
    }

    #[test]
    fn no_decided_games_is_all_zero() {
        let streaks = compute_streaks(&PickSet::new("P"), &[]);
        assert_eq!(streaks, Streaks::default());
        assert_eq!(streaks.display(), "-");
    }
}
