// Report pipeline: pool data -> standings, odds, what-if table, consensus ->
// rendered text or JSON.

use std::collections::HashMap;

use anyhow::{bail, Context};
use bowlpool_core::consensus::{contrarian_counts, pick_splits, ContrarianTally, PickSplit};
use bowlpool_core::projection::{projected_standings, Overrides, ProjectedStanding};
use bowlpool_core::simulation::{simulate_chunked, upcoming, CancelToken};
use bowlpool_core::standings::apply_win_probabilities;
use bowlpool_core::{build_standings, Game, GameId, PlayerStanding, PoolData, TeamRef};
use bowlpool_data::{CsvPoolSource, PoolSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Config, OutputFormat};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub pool: String,
    pub season: Option<String>,
    pub games_total: usize,
    pub games_decided: usize,
    pub iterations: u32,
    pub standings: Vec<PlayerStanding>,
    /// Present only when what-if overrides are configured.
    pub projected: Option<Vec<ProjectedStanding>>,
    pub upcoming: Vec<UpcomingGame>,
    pub splits: Vec<PickSplit>,
    /// In standings order.
    pub contrarian: Vec<ContrarianRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingGame {
    pub game: GameId,
    pub name: String,
    pub team_a: TeamRef,
    pub team_b: TeamRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContrarianRow {
    pub name: String,
    #[serde(flatten)]
    pub tally: ContrarianTally,
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Seeded RNG when a seed is configured, entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Turn configured `game id -> team label` pairs into checked overrides.
/// Unknown games, blank labels, and teams outside their game are errors.
pub fn resolve_overrides(games: &[Game], raw: &HashMap<String, String>) -> anyhow::Result<Overrides> {
    let by_id: HashMap<&str, &Game> = games.iter().map(|g| (g.id.as_str(), g)).collect();
    let mut keys: Vec<&String> = raw.keys().collect();
    keys.sort();

    let mut overrides = Overrides::new();
    for key in keys {
        let Some(game) = by_id.get(key.trim()) else {
            bail!("what-if override names unknown game `{key}`");
        };
        let Some(team) = TeamRef::from_label(&raw[key]) else {
            bail!("what-if override for `{key}` has a blank team");
        };
        if game.is_decided() {
            debug!("override for decided game '{}' has no effect", key);
        }
        overrides
            .pin_checked(game, team)
            .with_context(|| format!("invalid what-if override for `{key}`"))?;
    }
    Ok(overrides)
}

/// Compute every section of the report for one snapshot of pool data.
pub async fn build_report<R: Rng + ?Sized>(
    config: &Config,
    data: &PoolData,
    rng: &mut R,
    cancel: Option<&CancelToken>,
) -> anyhow::Result<Report> {
    let mut standings = build_standings(&data.games, &data.players);
    info!("Standings built for {} players", standings.len());

    let settings = config.simulation.settings();
    let probs = simulate_chunked(&data.games, &data.players, &settings, rng, cancel)
        .await
        .context("win probability simulation failed")?;
    apply_win_probabilities(&mut standings, &probs);
    info!("Simulated {} outcomes", settings.iterations);

    let projected = if config.what_if.is_empty() {
        None
    } else {
        let overrides = resolve_overrides(&data.games, &config.what_if)?;
        info!("Projecting with {} what-if overrides", overrides.len());
        Some(projected_standings(&data.games, &data.players, &overrides))
    };

    let upcoming = upcoming(&data.games)
        .into_iter()
        .map(|g| UpcomingGame {
            game: g.id.clone(),
            name: g.name.clone(),
            team_a: g.team_a.clone(),
            team_b: g.team_b.clone(),
        })
        .collect();

    let mut tallies = contrarian_counts(&data.games, &data.players);
    let contrarian = standings
        .iter()
        .map(|s| ContrarianRow {
            name: s.name.clone(),
            tally: tallies.remove(&s.name).unwrap_or_default(),
        })
        .collect();

    Ok(Report {
        pool: config.pool.name.clone(),
        season: config.pool.season.clone(),
        games_total: data.games.len(),
        games_decided: data.decided_count(),
        iterations: settings.iterations,
        standings,
        projected,
        upcoming,
        splits: pick_splits(&data.games, &data.players),
        contrarian,
    })
}

/// Load pool data as configured, build the report, and render it.
pub async fn run(config: &Config, cancel: Option<&CancelToken>) -> anyhow::Result<String> {
    let source = CsvPoolSource::new(config.games_path(), config.picks_path())
        .strict_winners(config.data.strict_winners);
    let data = source
        .load()
        .await
        .with_context(|| format!("failed to load pool data ({})", source.source_name()))?;

    let mut rng = make_rng(config.simulation.seed);
    let report = build_report(config, &data, &mut rng, cancel).await?;
    render(&report, config.output.format)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("failed to serialize report")
        }
    }
}

pub fn render_table(report: &Report) -> String {
    let mut out = String::new();

    let season = report
        .season
        .as_deref()
        .map(|s| format!(" ({s})"))
        .unwrap_or_default();
    out.push_str(&format!(
        "{}{}: {} of {} games decided\n\n",
        report.pool, season, report.games_decided, report.games_total
    ));

    out.push_str(&format!(
        "{:>4}  {:<20} {:>7} {:>6} {:>5}  {:<10} {:>5} {:>6} {:>6}\n",
        "Rank", "Player", "W-L", "Pct", "Strk", "Status", "Swing", "Behind", "Win%"
    ));
    for s in &report.standings {
        let record = s.record();
        out.push_str(&format!(
            "{:>4}  {:<20} {:>7} {:>6} {:>5}  {:<10} {:>5} {:>6} {:>6.1}\n",
            s.rank,
            s.name,
            format!("{}-{}", record.wins, record.losses),
            record.percentage_display(),
            s.streaks().display(),
            s.status.label(),
            s.swing_games.to_string(),
            s.win_deficit,
            s.win_probability_pct,
        ));
    }

    if let Some(projected) = &report.projected {
        out.push_str("\nWhat-if projection\n");
        for p in projected {
            out.push_str(&format!("{:>4}  {:<20} {:>3}\n", p.rank, p.name, p.wins));
        }
    }

    if !report.upcoming.is_empty() {
        out.push_str("\nUpcoming\n");
        for g in &report.upcoming {
            out.push_str(&format!("  {:<20} {} vs {}\n", g.name, g.team_a, g.team_b));
        }
    }

    if !report.splits.is_empty() {
        out.push_str("\nPick splits\n");
        for split in &report.splits {
            out.push_str(&format!(
                "  {:<12} {} {} - {} {}",
                split.game.as_str(),
                split.team_a,
                split.team_a_picks,
                split.team_b_picks,
                split.team_b
            ));
            if split.no_pick > 0 {
                out.push_str(&format!(" ({} blank)", split.no_pick));
            }
            out.push('\n');
        }
    }

    let rebels: Vec<&ContrarianRow> = report
        .contrarian
        .iter()
        .filter(|row| row.tally.contrarian_picks > 0)
        .collect();
    if !rebels.is_empty() {
        out.push_str("\nAgainst the crowd\n");
        for row in rebels {
            out.push_str(&format!(
                "  {:<20} {} picks, {} hit\n",
                row.name, row.tally.contrarian_picks, row.tally.contrarian_wins
            ));
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
