// Pick consensus: how the pool split on each game, and who went against it.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Game, GameId, PickSet, TeamRef};
use crate::score::is_correct;

/// How the pool split on one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickSplit {
    pub game: GameId,
    pub team_a: TeamRef,
    pub team_b: TeamRef,
    pub team_a_picks: u32,
    pub team_b_picks: u32,
    /// Players with no pick, or a pick naming neither team.
    pub no_pick: u32,
}

impl PickSplit {
    /// The side a strict majority of pickers chose. `None` on an even split
    /// or when nobody picked.
    pub fn majority(&self) -> Option<&TeamRef> {
        use std::cmp::Ordering;
        match self.team_a_picks.cmp(&self.team_b_picks) {
            Ordering::Greater => Some(&self.team_a),
            Ordering::Less => Some(&self.team_b),
            Ordering::Equal => None,
        }
    }

    /// Share of pickers (excluding blanks) on `team_a`, in percent.
    pub fn team_a_share_pct(&self) -> f64 {
        let total = self.team_a_picks + self.team_b_picks;
        if total == 0 {
            return 0.0;
        }
        100.0 * f64::from(self.team_a_picks) / f64::from(total)
    }
}

/// Contrarian tally for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContrarianTally {
    /// Picks against the strict majority.
    pub contrarian_picks: u32,
    /// Contrarian picks on decided games that turned out correct.
    pub contrarian_wins: u32,
}

/// Pick split for every game, in input order.
pub fn pick_splits(games: &[Game], players: &[PickSet]) -> Vec<PickSplit> {
    games
        .iter()
        .map(|game| {
            let mut split = PickSplit {
                game: game.id.clone(),
                team_a: game.team_a.clone(),
                team_b: game.team_b.clone(),
                team_a_picks: 0,
                team_b_picks: 0,
                no_pick: 0,
            };
            for player in players {
                match player.pick_for(&game.id) {
                    Some(pick) if pick == &game.team_a => split.team_a_picks += 1,
                    Some(pick) if pick == &game.team_b => split.team_b_picks += 1,
                    _ => split.no_pick += 1,
                }
            }
            split
        })
        .collect()
}

/// Count each player's picks against the majority, and how many of those
/// came through. Games without a strict majority are ignored.
pub fn contrarian_counts(games: &[Game], players: &[PickSet]) -> HashMap<String, ContrarianTally> {
    let splits = pick_splits(games, players);
    let mut tallies: HashMap<String, ContrarianTally> = players
        .iter()
        .map(|p| (p.player_name.clone(), ContrarianTally::default()))
        .collect();

    for (game, split) in games.iter().zip(&splits) {
        let Some(majority) = split.majority() else {
            continue;
        };
        for player in players {
            let Some(pick) = player.pick_for(&game.id) else {
                continue;
            };
            if pick == majority || !game.involves(pick) {
                continue;
            }
            if let Some(tally) = tallies.get_mut(&player.player_name) {
                tally.contrarian_picks += 1;
                if is_correct(player, game) {
                    tally.contrarian_wins += 1;
                }
            }
        }
    }

    tallies
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn team(label: &str) -> TeamRef {
        TeamRef::from_label(label).unwrap()
    }

    fn game(id: &str) -> Game {
        Game::new(id, id, team("a"), team("b"))
    }

    fn picks(name: &str, list: &[(&str, &str)]) -> PickSet {
        list.iter()
            .fold(PickSet::new(name), |set, (g, side)| set.with_pick(*g, team(side)))
    }

    #[test]
    fn splits_count_each_side_and_blanks() {
        let games = vec![game("g1")];
        let players = vec![
            picks("A", &[("g1", "a")]),
            picks("B", &[("g1", "a")]),
            picks("C", &[("g1", "b")]),
            picks("D", &[("g1", "zzz")]),
            PickSet::new("E"),
        ];
        let split = &pick_splits(&games, &players)[0];
        assert_eq!(split.team_a_picks, 2);
        assert_eq!(split.team_b_picks, 1);
        assert_eq!(split.no_pick, 2);
        assert_eq!(split.majority(), Some(&team("a")));
        assert!((split.team_a_share_pct() - 66.666).abs() < 0.01);
    }

    #[test]
    fn even_split_has_no_majority() {
        let games = vec![game("g1")];
        let players = vec![picks("A", &[("g1", "a")]), picks("B", &[("g1", "b")])];
        let split = &pick_splits(&games, &players)[0];
        assert_eq!(split.majority(), None);
        assert_eq!(pick_splits(&games, &[])[0].team_a_share_pct(), 0.0);
    }

    #[test]
    fn contrarian_tallies_picks_and_hits() {
        let games = vec![game("g1").won_by(team("b")), game("g2"), game("g3").won_by(team("a"))];
        let players = vec![
            picks("Crowd1", &[("g1", "a"), ("g2", "a"), ("g3", "a")]),
            picks("Crowd2", &[("g1", "a"), ("g2", "a"), ("g3", "a")]),
            picks("Rebel", &[("g1", "b"), ("g2", "b"), ("g3", "b")]),
        ];

        let tallies = contrarian_counts(&games, &players);
        assert_eq!(
            tallies["Rebel"],
            ContrarianTally {
                contrarian_picks: 3,
                contrarian_wins: 1,
            }
        );
        assert_eq!(tallies["Crowd1"], ContrarianTally::default());
    }
}
