// Picks CSV loading (wide spreadsheet layout).
//
// One row per player: a `Player` column, an optional `Tiebreaker` column,
// and one column per game whose header is the game id. Each cell holds the
// picked team's label; a blank cell means no pick.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use bowlpool_core::{EngineError, Game, GameId, PickSet, TeamRef};
use tracing::warn;

use crate::error::DataError;
use crate::games::normalize_headers;

const PLAYER_HEADERS: &[&str] = &["player", "name", "player_name"];
const TIEBREAKER_HEADERS: &[&str] = &["tiebreaker", "tiebreak", "tb", "tiebreaker_score"];

/// Column layout resolved from the header row.
struct Layout {
    player: usize,
    tiebreaker: Option<usize>,
    /// Column index -> game for every header that names a known game.
    games: Vec<(usize, GameId)>,
}

fn resolve_layout(
    raw_headers: &csv::StringRecord,
    games: &[Game],
    origin: &str,
) -> Result<Layout, DataError> {
    let normalized = normalize_headers(raw_headers);
    let find = |names: &[&str]| normalized.iter().position(|h| names.contains(&h));

    let Some(player) = find(PLAYER_HEADERS) else {
        return Err(DataError::Validation {
            origin: origin.to_string(),
            message: "no Player column in header row".into(),
        });
    };
    let tiebreaker = find(TIEBREAKER_HEADERS);

    // Spreadsheet headers drift in case; game ids match case-insensitively.
    let known: HashMap<String, &GameId> = games
        .iter()
        .map(|g| (g.id.as_str().trim().to_lowercase(), &g.id))
        .collect();
    let mut columns = Vec::new();
    for (idx, header) in raw_headers.iter().enumerate() {
        if idx == player || Some(idx) == tiebreaker {
            continue;
        }
        let header = header.trim();
        if header.is_empty() {
            continue;
        }
        match known.get(&header.to_lowercase()) {
            Some(id) => columns.push((idx, (*id).clone())),
            None => warn!("ignoring picks column '{}' in {}: no such game", header, origin),
        }
    }

    Ok(Layout {
        player,
        tiebreaker,
        games: columns,
    })
}

/// Parse pick sets from CSV, resolving game columns against `games`.
///
/// Rows with a blank player name are skipped; a repeated player name is a
/// hard error. Picks naming neither team of their game are kept (they can
/// never match) and logged.
pub fn parse_picks<R: Read>(rdr: R, games: &[Game], origin: &str) -> Result<Vec<PickSet>, DataError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader
        .headers()
        .map_err(|e| DataError::Csv {
            origin: origin.to_string(),
            source: e,
        })?
        .clone();
    let layout = resolve_layout(&headers, games, origin)?;
    let by_id: HashMap<&GameId, &Game> = games.iter().map(|g| (&g.id, g)).collect();

    let mut players = Vec::new();
    let mut seen = HashSet::new();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping malformed picks row in {}: {}", origin, e);
                continue;
            }
        };

        let name = record.get(layout.player).unwrap_or("").trim();
        if name.is_empty() {
            warn!("skipping picks row with blank player name in {}", origin);
            continue;
        }
        if !seen.insert(name.to_string()) {
            return Err(EngineError::DuplicatePlayer(name.to_string()).into());
        }

        let mut set = PickSet::new(name);

        if let Some(col) = layout.tiebreaker {
            let raw = record.get(col).unwrap_or("").trim();
            if !raw.is_empty() {
                match raw.parse::<f64>() {
                    Ok(v) if v.is_finite() => set.tiebreaker_score = Some(v),
                    _ => warn!("player '{}': ignoring tiebreaker '{}'", name, raw),
                }
            }
        }

        for (col, game_id) in &layout.games {
            let Some(team) = record.get(*col).and_then(TeamRef::from_label) else {
                continue;
            };
            if let Some(game) = by_id.get(game_id) {
                if !game.involves(&team) {
                    warn!(
                        "player '{}': pick '{}' for game '{}' names neither team",
                        name, team, game_id
                    );
                }
            }
            set.picks.insert(game_id.clone(), team);
        }

        players.push(set);
    }

    Ok(players)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
