// Tie-aware competition ranking by win count.
//
// Players with equal wins share a rank; the next lower win count jumps to
// its 1-based position, so `[10, 10, 8]` ranks as `[1, 1, 3]`. Equal-win
// players keep their input order. There is deliberately no secondary sort
// key: adding one (e.g. alphabetical) would change the displayed order of
// tied players.

/// Anything that can be ranked by a win count.
pub trait Ranked {
    fn wins(&self) -> u32;
    fn set_rank(&mut self, rank: u32);
}

/// Assign competition ranks to a win list that is already sorted descending.
pub fn competition_ranks(wins_sorted_desc: &[u32]) -> Vec<u32> {
    let mut ranks = Vec::with_capacity(wins_sorted_desc.len());
    let mut rank = 1;
    for (i, &wins) in wins_sorted_desc.iter().enumerate() {
        if i > 0 && wins < wins_sorted_desc[i - 1] {
            rank = i as u32 + 1;
        }
        ranks.push(rank);
    }
    ranks
}

/// Stable-sort `entries` by wins descending and assign their ranks in place.
pub fn rank_by_wins<T: Ranked>(entries: &mut [T]) {
    entries.sort_by(|a, b| b.wins().cmp(&a.wins()));
    let wins: Vec<u32> = entries.iter().map(Ranked::wins).collect();
    for (entry, rank) in entries.iter_mut().zip(competition_ranks(&wins)) {
        entry.set_rank(rank);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
