// Games CSV loading and normalization.
//
// Expected columns (case-insensitive, spaces treated as underscores):
// id, name, date, time, team_a, team_b, winner. Schedule fields are loosely
// typed in the published sheet, so unparseable dates and times become `None`
// instead of failing the row.

use std::collections::HashSet;
use std::io::Read;

use bowlpool_core::{EngineError, Game, GameId, TeamRef};
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Deserialize;
use tracing::warn;

use crate::error::DataError;

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawGame {
    #[serde(alias = "game_id")]
    id: String,
    #[serde(default, alias = "bowl", alias = "game")]
    name: String,
    #[serde(default)]
    date: String,
    #[serde(default, alias = "kickoff")]
    time: String,
    #[serde(alias = "away")]
    team_a: String,
    #[serde(alias = "home")]
    team_b: String,
    #[serde(default, alias = "result")]
    winner: String,
}

// ---------------------------------------------------------------------------
// Field parsing helpers
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];
const TIME_FORMATS: &[&str] = &["%H:%M", "%I:%M %p", "%I:%M%p"];
const TIMEZONE_SUFFIXES: &[&str] = &["ET", "EST", "EDT", "CT", "CST", "CDT", "MT", "PT", "PST"];

fn is_placeholder(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case("tbd") || s.eq_ignore_ascii_case("tba")
}

/// Parse a schedule date. Blank, `TBD`, or unrecognized values yield `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if is_placeholder(s) {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a kickoff time into minutes after midnight. Accepts 24-hour and
/// AM/PM forms, with an optional trailing US timezone abbreviation.
pub fn parse_kickoff(raw: &str) -> Option<u32> {
    let upper = raw.trim().to_uppercase();
    let s = strip_timezone(&upper);
    if is_placeholder(s) {
        return None;
    }
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .map(|t| t.hour() * 60 + t.minute())
}

fn strip_timezone(s: &str) -> &str {
    TIMEZONE_SUFFIXES
        .iter()
        .find_map(|suffix| s.strip_suffix(suffix))
        .map_or(s, str::trim_end)
}

/// True when the time cell carries no time at all (blank, `TBD`, `TBA`,
/// possibly with a timezone), as opposed to a time we failed to read.
fn kickoff_is_blank(raw: &str) -> bool {
    is_placeholder(strip_timezone(&raw.trim().to_uppercase()))
}

/// Lowercase, trim, and underscore header names so aliases stay simple.
pub(crate) fn normalize_headers(headers: &csv::StringRecord) -> csv::StringRecord {
    headers
        .iter()
        .map(|h| h.trim().to_lowercase().replace(' ', "_"))
        .collect()
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Parse games from CSV. Malformed rows and rows with a blank id or team are
/// skipped with a warning; a repeated id is a hard error. `origin` names the
/// input in messages.
pub fn parse_games<R: Read>(rdr: R, origin: &str) -> Result<Vec<Game>, DataError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader
        .headers()
        .map_err(|e| DataError::Csv {
            origin: origin.to_string(),
            source: e,
        })?
        .clone();
    reader.set_headers(normalize_headers(&headers));

    let mut games = Vec::new();
    let mut seen = HashSet::new();

    for result in reader.deserialize::<RawGame>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed game row in {}: {}", origin, e);
                continue;
            }
        };

        let id = raw.id.trim();
        if id.is_empty() {
            warn!("skipping game row with blank id in {}", origin);
            continue;
        }
        let (Some(team_a), Some(team_b)) =
            (TeamRef::from_label(&raw.team_a), TeamRef::from_label(&raw.team_b))
        else {
            warn!("skipping game '{}': missing team", id);
            continue;
        };

        if !seen.insert(id.to_string()) {
            return Err(EngineError::DuplicateGame(GameId::new(id)).into());
        }

        let date = parse_date(&raw.date);
        if date.is_none() && !is_placeholder(raw.date.trim()) {
            warn!("game '{}': unparseable date '{}'", id, raw.date.trim());
        }
        let kickoff_minutes = parse_kickoff(&raw.time);
        let kickoff_unresolved = kickoff_minutes.is_none() && !kickoff_is_blank(&raw.time);
        if kickoff_unresolved {
            warn!("game '{}': unparseable kickoff '{}'", id, raw.time.trim());
        }

        let name = match raw.name.trim() {
            "" => id.to_string(),
            n => n.to_string(),
        };

        games.push(Game {
            id: GameId::new(id),
            name,
            date,
            kickoff_minutes,
            kickoff_unresolved,
            team_a,
            team_b,
            winner: TeamRef::from_label(&raw.winner),
        });
    }

    Ok(games)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bowlpool_core::simulation::upcoming;
    use bowlpool_core::streak::chronological;

    fn team(label: &str) -> TeamRef {
        TeamRef::from_label(label).unwrap()
    }

    #[test]
    fn parses_full_rows() {
        let csv_data = "\
id,name,date,time,team_a,team_b,winner
rose,Rose Bowl,2026-01-01,4:00 PM ET,Ohio State,Oregon,Ohio State
sugar,Sugar Bowl,01/01/2026,20:45,Georgia,Notre Dame,";

        let games = parse_games(csv_data.as_bytes(), "test").unwrap();
        assert_eq!(games.len(), 2);

        assert_eq!(games[0].id, GameId::new("rose"));
        assert_eq!(games[0].name, "Rose Bowl");
        assert_eq!(games[0].date, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(games[0].kickoff_minutes, Some(16 * 60));
        assert_eq!(games[0].winner, Some(team("ohio state")));

        assert_eq!(games[1].kickoff_minutes, Some(20 * 60 + 45));
        assert!(games[1].winner.is_none());
    }

    #[test]
    fn header_aliases_and_case() {
        let csv_data = "\
Game ID,Bowl,Date,Kickoff,Away,Home,Result
peach,Peach Bowl,12/31/25,TBD,Texas,Arizona State,";

        let games = parse_games(csv_data.as_bytes(), "test").unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "Peach Bowl");
        assert_eq!(games[0].date, NaiveDate::from_ymd_opt(2025, 12, 31));
        assert_eq!(games[0].kickoff_minutes, None);
        assert_eq!(games[0].team_a, team("Texas"));
    }

    #[test]
    fn unparseable_schedule_fields_become_none() {
        let csv_data = "\
id,name,date,time,team_a,team_b,winner
x,X Bowl,sometime,late,A,B,A";

        let games = parse_games(csv_data.as_bytes(), "test").unwrap();
        assert!(games[0].date.is_none());
        assert!(games[0].kickoff_minutes.is_none());
        assert!(games[0].kickoff_unresolved);
        assert!(games[0].is_decided());
    }

    #[test]
    fn unreadable_kickoff_leaves_chronological_order() {
        let csv_data = "\
id,name,date,time,team_a,team_b,winner
noon,Noon Bowl,2025-12-31,12:00 PM,A,B,
night,Night Bowl,2025-12-31,8 PM,C,D,
early,Early Bowl,2025-12-31,TBD,E,F,";

        let games = parse_games(csv_data.as_bytes(), "test").unwrap();
        assert!(games[1].kickoff_unresolved);
        assert!(games[1].kickoff().is_none());
        assert!(!games[2].kickoff_unresolved);

        let ordered: Vec<&str> = chronological(&games).into_iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ordered, vec!["early", "noon"]);

        let pending: Vec<&str> = upcoming(&games).into_iter().map(|g| g.id.as_str()).collect();
        assert_eq!(pending, vec!["early", "noon"]);
    }

    #[test]
    fn rows_missing_id_or_team_skipped() {
        let csv_data = "\
id,name,date,time,team_a,team_b,winner
,Nameless,,,A,B,
g2,No Team,,,  ,B,
g3,Fine,,,A,B,";

        let games = parse_games(csv_data.as_bytes(), "test").unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, GameId::new("g3"));
    }

    #[test]
    fn blank_name_falls_back_to_id() {
        let csv_data = "\
id,team_a,team_b
g1,A,B";
        let games = parse_games(csv_data.as_bytes(), "test").unwrap();
        assert_eq!(games[0].name, "g1");
        assert!(games[0].date.is_none());
    }

    #[test]
    fn duplicate_id_is_an_error() {
        let csv_data = "\
id,team_a,team_b
g1,A,B
g1,C,D";
        let err = parse_games(csv_data.as_bytes(), "test").unwrap_err();
        match err {
            DataError::Engine(EngineError::DuplicateGame(id)) => assert_eq!(id.as_str(), "g1"),
            other => panic!("expected DuplicateGame, got: {other}"),
        }
    }

    #[test]
    fn kickoff_formats() {
        assert_eq!(parse_kickoff("19:30"), Some(19 * 60 + 30));
        assert_eq!(parse_kickoff("7:30 pm"), Some(19 * 60 + 30));
        assert_eq!(parse_kickoff("12:00 PM ET"), Some(12 * 60));
        assert_eq!(parse_kickoff("9:05 AM"), Some(9 * 60 + 5));
        assert_eq!(parse_kickoff("tbd"), None);
        assert_eq!(parse_kickoff("TBA ET"), None);
        assert!(kickoff_is_blank("TBA ET"));
        assert!(kickoff_is_blank("  "));
        assert!(!kickoff_is_blank("8 PM"));
        assert_eq!(parse_kickoff(""), None);
    }

    #[test]
    fn date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 12, 27);
        assert_eq!(parse_date("2025-12-27"), expected);
        assert_eq!(parse_date("12/27/2025"), expected);
        assert_eq!(parse_date("12/27/25"), expected);
        assert_eq!(parse_date("TBA"), None);
        assert_eq!(parse_date("Dec 27"), None);
    }
}
