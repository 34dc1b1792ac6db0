// Elimination analysis: can a trailing player still catch the leader?
//
// The only games where a trailing player gains ground on the leader are the
// undecided ones where the two picked opposite sides ("swing games"). A
// player whose win deficit exceeds their swing games cannot catch up even if
// every swing game breaks their way.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::model::{Game, PickSet};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Three-state standing of a player relative to the leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Rank 1, alone or tied.
    Leading,
    /// Deficit can still be closed through swing games.
    Alive,
    /// Deficit exceeds the remaining swing games.
    Eliminated,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Leading => "leading",
            Status::Alive => "alive",
            Status::Eliminated => "eliminated",
        }
    }
}

/// Swing-game count. Leaders have none to report and show `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingGames {
    NotApplicable,
    Count(u32),
}

impl fmt::Display for SwingGames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwingGames::NotApplicable => f.write_str("-"),
            SwingGames::Count(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for SwingGames {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SwingGames::NotApplicable => serializer.serialize_str("-"),
            SwingGames::Count(n) => serializer.serialize_u32(*n),
        }
    }
}

/// A ranked player as seen by the analyzer.
#[derive(Debug, Clone, Copy)]
pub struct Contender<'a> {
    pub picks: &'a PickSet,
    pub wins: u32,
    pub rank: u32,
}

/// Result of analyzing one contender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Elimination {
    pub status: Status,
    pub swing_games: SwingGames,
    pub win_deficit: u32,
}

impl Elimination {
    fn leading() -> Self {
        Elimination {
            status: Status::Leading,
            swing_games: SwingGames::NotApplicable,
            win_deficit: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Count undecided games where `leader` and `player` both picked and
/// disagree. A blank pick on either side never counts: it cannot turn into
/// a future disagreement.
pub fn swing_games(leader: &PickSet, player: &PickSet, games: &[Game]) -> u32 {
    games
        .iter()
        .filter(|g| !g.is_decided())
        .filter(|g| match (leader.pick_for(&g.id), player.pick_for(&g.id)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        })
        .count() as u32
}

/// Assess `player` against `leader`. A player sharing the leader's rank is
/// leading.
pub fn assess(leader: &Contender<'_>, player: &Contender<'_>, games: &[Game]) -> Elimination {
    if player.rank <= leader.rank {
        return Elimination::leading();
    }

    let win_deficit = leader.wins.saturating_sub(player.wins);
    let swing = swing_games(leader.picks, player.picks, games);
    let status = if swing < win_deficit {
        Status::Eliminated
    } else {
        Status::Alive
    };

    Elimination {
        status,
        swing_games: SwingGames::Count(swing),
        win_deficit,
    }
}

/// Analyze every contender against the first best-ranked entry (rank 1 for
/// any list produced by the rank engine).
///
/// Tied leaders all share rank 1 and the deficit computation is symmetric,
/// so which of them serves as the reference does not matter. Returns one
/// entry per contender, in input order.
pub fn analyze(contenders: &[Contender<'_>], games: &[Game]) -> Vec<Elimination> {
    let Some(leader) = contenders.iter().min_by_key(|c| c.rank) else {
        return Vec::new();
    };

    contenders
        .iter()
        .map(|player| assess(leader, player, games))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TeamRef;

    fn team(label: &str) -> TeamRef {
        TeamRef::from_label(label).unwrap()
    }

    fn pending(id: &str) -> Game {
        Game::new(id, id, team("a"), team("b"))
    }

    fn picks(name: &str, list: &[(&str, &str)]) -> PickSet {
        list.iter()
            .fold(PickSet::new(name), |set, (game, side)| set.with_pick(*game, team(side)))
    }

    #[test]
    fn swing_games_count_only_disagreements() {
        let games = vec![pending("g1"), pending("g2"), pending("g3"), pending("g4")];
        let leader = picks("L", &[("g1", "a"), ("g2", "a"), ("g3", "a")]);
        let chaser = picks("C", &[("g1", "b"), ("g2", "a"), ("g4", "b")]);
        // g1 differs; g2 agrees; g3 chaser blank; g4 leader blank.
        assert_eq!(swing_games(&leader, &chaser, &games), 1);
    }

    #[test]
    fn decided_games_are_not_swing_games() {
        let games = vec![pending("g1").won_by(team("a")), pending("g2")];
        let leader = picks("L", &[("g1", "a"), ("g2", "a")]);
        let chaser = picks("C", &[("g1", "b"), ("g2", "b")]);
        assert_eq!(swing_games(&leader, &chaser, &games), 1);
    }

    #[test]
    fn eliminated_when_swing_below_deficit() {
        let games = vec![pending("g1")];
        let leader = picks("L", &[("g1", "a")]);
        let chaser = picks("C", &[("g1", "b")]);

        let l = Contender { picks: &leader, wins: 5, rank: 1 };
        let two_back = Contender { picks: &chaser, wins: 3, rank: 2 };
        let one_back = Contender { picks: &chaser, wins: 4, rank: 2 };

        let far = assess(&l, &two_back, &games);
        assert_eq!(far.status, Status::Eliminated);
        assert_eq!(far.swing_games, SwingGames::Count(1));
        assert_eq!(far.win_deficit, 2);

        let near = assess(&l, &one_back, &games);
        assert_eq!(near.status, Status::Alive);
        assert_eq!(near.win_deficit, 1);
    }

    #[test]
    fn rank_one_is_always_leading() {
        let games = vec![pending("g1")];
        let a = picks("A", &[("g1", "a")]);
        let b = picks("B", &[("g1", "b")]);
        let contenders = [
            Contender { picks: &a, wins: 4, rank: 1 },
            Contender { picks: &b, wins: 4, rank: 1 },
        ];

        let result = analyze(&contenders, &games);
        for e in &result {
            assert_eq!(e.status, Status::Leading);
            assert_eq!(e.swing_games, SwingGames::NotApplicable);
            assert_eq!(e.swing_games.to_string(), "-");
        }
    }

    #[test]
    fn disagreeing_with_leader_never_lowers_swing_count() {
        let games = vec![pending("g1"), pending("g2")];
        let leader = picks("L", &[("g1", "a"), ("g2", "a")]);
        let agreeing = picks("C", &[("g1", "a"), ("g2", "b")]);
        let before = swing_games(&leader, &agreeing, &games);

        let flipped = picks("C", &[("g1", "b"), ("g2", "b")]);
        let after = swing_games(&leader, &flipped, &games);
        assert!(after >= before);
        assert_eq!(after, before + 1);
    }

    #[test]
    fn empty_contenders_yield_empty_analysis() {
        assert!(analyze(&[], &[]).is_empty());
    }

    #[test]
    fn swing_games_serialize_as_dash_or_number() {
        assert_eq!(serde_json::to_string(&SwingGames::NotApplicable).unwrap(), "\"-\"");
        assert_eq!(serde_json::to_string(&SwingGames::Count(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Status::Eliminated).unwrap(), "\"eliminated\"");
    }
}
