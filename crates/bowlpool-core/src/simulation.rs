// Monte Carlo estimate of each player's chance to finish with the most wins.
//
// Every undecided game is an independent fair coin flip per trial. A player
// whose trial total ties or beats everyone else's earns a full credit for
// that trial, so co-leaders each get a whole point and the percentages do
// not generally sum to 100.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::model::{Game, PickSet};
use crate::score::compute_record;
use crate::streak::chronological;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Trial count used when nothing else is configured.
pub const DEFAULT_ITERATIONS: u32 = 2000;

/// Trials run between cooperative yields in [`simulate_chunked`].
pub const DEFAULT_CHUNK_SIZE: u32 = 250;

/// Win probability in percent, keyed by player name.
pub type WinProbabilities = HashMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub iterations: u32,
    pub chunk_size: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            iterations: DEFAULT_ITERATIONS,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Shared flag for stopping a chunked run between chunks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Player indices bucketed by the side they picked in one undecided game.
/// Players with no pick, or a pick matching neither side, are in neither.
#[derive(Debug, Clone)]
struct PendingGame {
    team_a_pickers: Vec<usize>,
    team_b_pickers: Vec<usize>,
}

/// Incremental simulation over a fixed pool snapshot.
///
/// Decided wins are computed once up front and each undecided game carries
/// its pickers per side, so a trial costs one pass over the pending pickers
/// plus one pass over the players instead of a full rescore.
#[derive(Debug)]
pub struct Simulation<'a> {
    players: &'a [PickSet],
    base_wins: Vec<u32>,
    pending: Vec<PendingGame>,
    credits: Vec<u32>,
    scores: Vec<u32>,
    trials: u32,
}

impl<'a> Simulation<'a> {
    pub fn new(games: &[Game], players: &'a [PickSet]) -> Self {
        let base_wins = players
            .iter()
            .map(|p| compute_record(p, games).wins)
            .collect();

        let pending = games
            .iter()
            .filter(|g| !g.is_decided())
            .map(|game| {
                let mut bucket = PendingGame {
                    team_a_pickers: Vec::new(),
                    team_b_pickers: Vec::new(),
                };
                for (idx, player) in players.iter().enumerate() {
                    match player.pick_for(&game.id) {
                        Some(pick) if pick == &game.team_a => bucket.team_a_pickers.push(idx),
                        Some(pick) if pick == &game.team_b => bucket.team_b_pickers.push(idx),
                        _ => {}
                    }
                }
                bucket
            })
            .collect();

        Simulation {
            players,
            base_wins,
            pending,
            credits: vec![0; players.len()],
            scores: vec![0; players.len()],
            trials: 0,
        }
    }

    /// Number of undecided games being simulated.
    pub fn pending_games(&self) -> usize {
        self.pending.len()
    }

    /// Trials completed so far.
    pub fn trials(&self) -> u32 {
        self.trials
    }

    /// Run `count` more trials. Each undecided game draws one uniform
    /// `[0, 1)` value; below 0.5 the first-listed team wins.
    pub fn run_trials<R: Rng + ?Sized>(&mut self, count: u32, rng: &mut R) {
        for _ in 0..count {
            self.scores.copy_from_slice(&self.base_wins);

            for game in &self.pending {
                let draw: f64 = rng.gen();
                let winners = if draw < 0.5 {
                    &game.team_a_pickers
                } else {
                    &game.team_b_pickers
                };
                for &idx in winners {
                    self.scores[idx] += 1;
                }
            }

            if let Some(&best) = self.scores.iter().max() {
                for (credit, &score) in self.credits.iter_mut().zip(&self.scores) {
                    if score == best {
                        *credit += 1;
                    }
                }
            }

            self.trials += 1;
        }
    }

    /// Percent of completed trials each player finished tied-or-first.
    /// Every player reports 0.0 before any trial has run.
    pub fn probabilities(&self) -> WinProbabilities {
        self.players
            .iter()
            .zip(&self.credits)
            .map(|(player, &credit)| {
                let pct = if self.trials == 0 {
                    0.0
                } else {
                    100.0 * f64::from(credit) / f64::from(self.trials)
                };
                (player.player_name.clone(), pct)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run `iterations` trials in one uninterrupted pass.
pub fn simulate<R: Rng + ?Sized>(
    games: &[Game],
    players: &[PickSet],
    iterations: u32,
    rng: &mut R,
) -> WinProbabilities {
    let mut sim = Simulation::new(games, players);
    sim.run_trials(iterations, rng);
    debug!(
        "Simulated {} trials over {} pending games for {} players",
        sim.trials(),
        sim.pending_games(),
        players.len()
    );
    sim.probabilities()
}

/// Run the simulation in chunks, yielding to the async runtime between
/// chunks and honouring `cancel` at each chunk boundary.
///
/// For the same RNG state this consumes exactly the same draws as
/// [`simulate`], so both produce identical probabilities.
pub async fn simulate_chunked<R: Rng + ?Sized>(
    games: &[Game],
    players: &[PickSet],
    settings: &SimulationSettings,
    rng: &mut R,
    cancel: Option<&CancelToken>,
) -> Result<WinProbabilities, EngineError> {
    let mut sim = Simulation::new(games, players);
    let chunk = settings.chunk_size.max(1);

    while sim.trials() < settings.iterations {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            debug!("Simulation cancelled after {} trials", sim.trials());
            return Err(EngineError::Cancelled {
                completed: sim.trials(),
            });
        }
        let count = chunk.min(settings.iterations - sim.trials());
        sim.run_trials(count, rng);
        tokio::task::yield_now().await;
    }

    debug!(
        "Simulated {} trials over {} pending games in chunks of {}",
        sim.trials(),
        sim.pending_games(),
        chunk
    );
    Ok(sim.probabilities())
}

/// Undecided games with a resolvable kickoff, soonest first. This is the list
/// a what-if tool offers for pinning hypothetical winners.
pub fn upcoming(games: &[Game]) -> Vec<&Game> {
    chronological(games)
        .into_iter()
        .filter(|g| !g.is_decided())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
