// Pool data sources: where the engine's games and pick sets come from.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bowlpool_core::PoolData;
use tracing::{info, warn};

use crate::error::DataError;
use crate::games::parse_games;
use crate::picks::parse_picks;

/// Something that can produce a validated `PoolData`.
#[async_trait]
pub trait PoolSource: Send + Sync {
    /// Load games and pick sets.
    async fn load(&self) -> Result<PoolData, DataError>;

    /// Source name for logging.
    fn source_name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// CSV files on disk
// ---------------------------------------------------------------------------

/// Loads a games CSV and a wide picks CSV from disk.
#[derive(Debug, Clone)]
pub struct CsvPoolSource {
    pub games_path: PathBuf,
    pub picks_path: PathBuf,
    /// Reject winners that match neither team instead of warning about them.
    pub strict_winners: bool,
}

impl CsvPoolSource {
    pub fn new(games_path: impl Into<PathBuf>, picks_path: impl Into<PathBuf>) -> Self {
        CsvPoolSource {
            games_path: games_path.into(),
            picks_path: picks_path.into(),
            strict_winners: true,
        }
    }

    pub fn strict_winners(mut self, strict: bool) -> Self {
        self.strict_winners = strict;
        self
    }
}

async fn read_text(path: &Path) -> Result<String, DataError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DataError::Io {
            path: path.display().to_string(),
            source: e,
        })
}

#[async_trait]
impl PoolSource for CsvPoolSource {
    async fn load(&self) -> Result<PoolData, DataError> {
        let games_origin = self.games_path.display().to_string();
        let picks_origin = self.picks_path.display().to_string();

        let games_text = read_text(&self.games_path).await?;
        let games = parse_games(games_text.as_bytes(), &games_origin)?;
        if games.is_empty() {
            return Err(DataError::Validation {
                origin: games_origin,
                message: "no valid game rows".into(),
            });
        }

        let picks_text = read_text(&self.picks_path).await?;
        let players = parse_picks(picks_text.as_bytes(), &games, &picks_origin)?;
        if players.is_empty() {
            warn!("no pick sets in {}", picks_origin);
        }

        let data = PoolData::new(games, players);
        check_winners(&data, self.strict_winners)?;

        info!(
            "Loaded {} games ({} decided) and {} players",
            data.games.len(),
            data.decided_count(),
            data.players.len()
        );
        Ok(data)
    }

    fn source_name(&self) -> &str {
        "csv"
    }
}

/// Validate the loaded data. In lenient mode out-of-game winners are only
/// logged; they score as a miss for everyone.
fn check_winners(data: &PoolData, strict: bool) -> Result<(), DataError> {
    if strict {
        return data.validate().map_err(DataError::from);
    }
    for game in data.out_of_game_winners() {
        if let Some(winner) = &game.winner {
            warn!(
                "game '{}': winner '{}' is neither '{}' nor '{}'",
                game.id, winner, game.team_a, game.team_b
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Hands out a fixed `PoolData`. Used for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPoolSource {
    data: PoolData,
}

impl StaticPoolSource {
    pub fn new(data: PoolData) -> Self {
        StaticPoolSource { data }
    }
}

#[async_trait]
impl PoolSource for StaticPoolSource {
    async fn load(&self) -> Result<PoolData, DataError> {
        self.data.validate()?;
        Ok(self.data.clone())
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
