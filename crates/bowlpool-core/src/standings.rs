// Standings assembly: record -> streaks -> rank -> elimination, with the
// simulator's win probabilities merged in afterwards.

use rand::Rng;
use serde::Serialize;

use crate::elimination::{analyze, Contender, Status, SwingGames};
use crate::model::{Game, PickSet};
use crate::rank::{rank_by_wins, Ranked};
use crate::score::{compute_record, Record};
use crate::simulation::{simulate, WinProbabilities};
use crate::streak::{chronological, compute_streaks, Streaks};

/// One player's row in the standings table. Recomputed on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStanding {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub percentage: f64,
    pub current_streak: i32,
    pub max_win_streak: u32,
    pub max_loss_streak: u32,
    pub rank: u32,
    pub status: Status,
    pub swing_games: SwingGames,
    pub win_deficit: u32,
    pub win_probability_pct: f64,
    pub tiebreaker_score: Option<f64>,
}

impl PlayerStanding {
    pub fn record(&self) -> Record {
        Record {
            wins: self.wins,
            losses: self.losses,
        }
    }

    pub fn streaks(&self) -> Streaks {
        Streaks {
            current: self.current_streak,
            max_win: self.max_win_streak,
            max_loss: self.max_loss_streak,
        }
    }
}

/// Intermediate row carrying the pick set through ranking.
struct Row<'a> {
    picks: &'a PickSet,
    record: Record,
    streaks: Streaks,
    rank: u32,
}

impl Ranked for Row<'_> {
    fn wins(&self) -> u32 {
        self.record.wins
    }

    fn set_rank(&mut self, rank: u32) {
        self.rank = rank;
    }
}

/// Build the deterministic part of the standings, ordered by rank. Tied
/// players keep their input order. `win_probability_pct` is left at 0.0.
pub fn build_standings(games: &[Game], players: &[PickSet]) -> Vec<PlayerStanding> {
    let ordered = chronological(games);

    let mut rows: Vec<Row<'_>> = players
        .iter()
        .map(|picks| Row {
            picks,
            record: compute_record(picks, games),
            streaks: compute_streaks(picks, &ordered),
            rank: 0,
        })
        .collect();
    rank_by_wins(&mut rows);

    let contenders: Vec<Contender<'_>> = rows
        .iter()
        .map(|r| Contender {
            picks: r.picks,
            wins: r.record.wins,
            rank: r.rank,
        })
        .collect();
    let eliminations = analyze(&contenders, games);

    rows.iter()
        .zip(eliminations)
        .map(|(row, elim)| PlayerStanding {
            name: row.picks.player_name.clone(),
            wins: row.record.wins,
            losses: row.record.losses,
            percentage: row.record.percentage(),
            current_streak: row.streaks.current,
            max_win_streak: row.streaks.max_win,
            max_loss_streak: row.streaks.max_loss,
            rank: row.rank,
            status: elim.status,
            swing_games: elim.swing_games,
            win_deficit: elim.win_deficit,
            win_probability_pct: 0.0,
            tiebreaker_score: row.picks.tiebreaker_score,
        })
        .collect()
}

/// Merge simulator output into standings. Players missing from `probs`
/// keep 0.0.
pub fn apply_win_probabilities(standings: &mut [PlayerStanding], probs: &WinProbabilities) {
    for standing in standings.iter_mut() {
        standing.win_probability_pct = probs.get(&standing.name).copied().unwrap_or(0.0);
    }
}

/// Full standings including a one-pass simulation of `iterations` trials.
pub fn compute_standings<R: Rng + ?Sized>(
    games: &[Game],
    players: &[PickSet],
    iterations: u32,
    rng: &mut R,
) -> Vec<PlayerStanding> {
    let mut standings = build_standings(games, players);
    let probs = simulate(games, players, iterations, rng);
    apply_win_probabilities(&mut standings, &probs);
    standings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TeamRef;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn team(label: &str) -> TeamRef {
        TeamRef::from_label(label).unwrap()
    }

    fn game(id: &str, day: u32) -> Game {
        Game::new(id, id, team("a"), team("b"))
            .scheduled(NaiveDate::from_ymd_opt(2025, 12, day).unwrap(), None)
    }

    fn picks(name: &str, list: &[(&str, &str)]) -> PickSet {
        list.iter()
            .fold(PickSet::new(name), |set, (g, side)| set.with_pick(*g, team(side)))
    }

    #[test]
    fn three_players_two_decided_games() {
        let games = vec![
            game("g1", 20).won_by(team("a")),
            game("g2", 21).won_by(team("b")),
        ];
        let players = vec![
            picks("P3", &[("g1", "b"), ("g2", "a")]),
            picks("P1", &[("g1", "a"), ("g2", "b")]),
            picks("P2", &[("g1", "a"), ("g2", "a")]),
        ];

        let standings = build_standings(&games, &players);
        let names: Vec<&str> = standings.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["P1", "P2", "P3"]);
        assert_eq!(standings.iter().map(|s| s.wins).collect::<Vec<_>>(), vec![2, 1, 0]);
        assert_eq!(standings.iter().map(|s| s.rank).collect::<Vec<_>>(), vec![1, 2, 3]);

        assert_eq!(standings[0].status, Status::Leading);
        assert_eq!(standings[0].swing_games, SwingGames::NotApplicable);

        let p2 = &standings[1];
        assert_eq!(p2.swing_games, SwingGames::Count(0));
        assert_eq!(p2.win_deficit, 1);
        assert_eq!(p2.status, Status::Eliminated);
        assert_eq!(p2.current_streak, -1);
        assert_eq!(p2.max_win_streak, 1);

        assert_eq!(standings[2].status, Status::Eliminated);
        assert_eq!(standings[2].win_deficit, 2);
    }

    #[test]
    fn tied_leaders_both_lead_despite_pending_disagreement() {
        let games = vec![game("g1", 20).won_by(team("a")), game("g2", 22)];
        let players = vec![
            picks("Leader", &[("g1", "a"), ("g2", "a")]),
            picks("Chaser", &[("g1", "a"), ("g2", "b")]),
        ];

        let standings = build_standings(&games, &players);
        for s in &standings {
            assert_eq!(s.rank, 1);
            assert_eq!(s.status, Status::Leading);
            assert_eq!(s.swing_games, SwingGames::NotApplicable);
        }
    }

    #[test]
    fn chaser_alive_with_enough_swing_games() {
        let games = vec![game("g1", 20).won_by(team("a")), game("g2", 22), game("g3", 23)];
        let players = vec![
            picks("Leader", &[("g1", "a"), ("g2", "a"), ("g3", "a")]),
            picks("Chaser", &[("g1", "b"), ("g2", "b"), ("g3", "a")]),
        ];
        let standings = build_standings(&games, &players);
        let chaser = &standings[1];
        assert_eq!(chaser.swing_games, SwingGames::Count(1));
        assert_eq!(chaser.win_deficit, 1);
        assert_eq!(chaser.status, Status::Alive);
    }

    #[test]
    fn zero_decided_games_defaults() {
        let games = vec![game("g1", 20)];
        let players = vec![picks("Solo", &[("g1", "a")])];
        let standings = build_standings(&games, &players);
        assert_eq!(standings[0].percentage, 0.0);
        assert_eq!(standings[0].record().percentage_display(), ".000");
        assert_eq!(standings[0].streaks().display(), "-");
        assert_eq!(standings[0].status, Status::Leading);
    }

    #[test]
    fn zero_players_is_empty() {
        let games = vec![game("g1", 20)];
        assert!(build_standings(&games, &[]).is_empty());
        let mut rng = StdRng::seed_from_u64(0);
        assert!(compute_standings(&games, &[], 100, &mut rng).is_empty());
    }

    #[test]
    fn compute_standings_merges_probabilities() {
        let games = vec![game("g1", 20).won_by(team("a")), game("g2", 21).won_by(team("a"))];
        let players = vec![
            picks("Best", &[("g1", "a"), ("g2", "a")]),
            picks("Worst", &[("g1", "b"), ("g2", "b")]),
        ];
        let mut rng = StdRng::seed_from_u64(11);
        let standings = compute_standings(&games, &players, 200, &mut rng);
        assert_eq!(standings[0].name, "Best");
        assert_eq!(standings[0].win_probability_pct, 100.0);
        assert_eq!(standings[1].win_probability_pct, 0.0);
    }

    #[test]
    fn leading_iff_rank_one() {
        let games = vec![
            game("g1", 20).won_by(team("a")),
            game("g2", 21).won_by(team("a")),
            game("g3", 22),
        ];
        let players = vec![
            picks("A", &[("g1", "a"), ("g2", "a"), ("g3", "a")]),
            picks("B", &[("g1", "a"), ("g2", "b"), ("g3", "b")]),
            picks("C", &[("g1", "a"), ("g2", "a"), ("g3", "b")]),
            picks("D", &[("g3", "b")]),
        ];
        for s in build_standings(&games, &players) {
            assert_eq!(s.status == Status::Leading, s.rank == 1, "{}", s.name);
            assert!(s.wins + s.losses <= 2);
        }
    }
}
