// Projection feed loading and normalization.
//
// Fetches the published spreadsheet CSV, normalizes its headers through a
// synonym table, coerces the typed fields, scores each row, and drops rows
// that cannot be rostered (no salary, no projection).

use std::collections::HashMap;
use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::SourceConfig;
use crate::pool::heuristic::{compute_adjusted, safe_f64, ProjectionWeights};
use crate::pool::{parse_positions, PlayerPool, PlayerRow};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("failed to fetch projection feed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("malformed projection feed: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Source seam
// ---------------------------------------------------------------------------

/// Where the projection CSV text comes from. Production uses the remote
/// spreadsheet; tests substitute an in-memory source.
#[async_trait]
pub trait CsvSource: Send + Sync {
    async fn fetch(&self) -> Result<String, DataSourceError>;
}

/// Fetches the published spreadsheet over HTTP with a hard timeout.
pub struct RemoteCsvSource {
    http: reqwest::Client,
    url: String,
}

impl RemoteCsvSource {
    pub fn new(config: &SourceConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;
        Ok(RemoteCsvSource {
            http,
            url: config.csv_url.clone(),
        })
    }
}

#[async_trait]
impl CsvSource for RemoteCsvSource {
    async fn fetch(&self) -> Result<String, DataSourceError> {
        let response = self.http.get(&self.url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

// ---------------------------------------------------------------------------
// Header normalization
// ---------------------------------------------------------------------------

/// Canonical column names the rest of the pipeline reads. Absent columns
/// behave as empty strings.
const NAME: &str = "NAME";
const SALARY: &str = "SALARY";
const TEAM: &str = "TEAM";
const OPP: &str = "OPP";
const DVP: &str = "DVP";
const VALUE: &str = "VALUE";
const L5_AVG: &str = "L5 AVG";
const L10_AVG: &str = "L10 AVG";
const SZ_AVG: &str = "SZ AVG";
const OVER_UNDER: &str = "O/U";
const TM_PTS: &str = "TM PTS";
const OWN_PCT: &str = "OWN %";
const FINAL_PROJECTION: &str = "FINAL PROJECTION";
const POS: &str = "POS";
const GAME_TIME: &str = "GAME TIME";

/// Feed header spellings that map onto a canonical name.
const SYNONYMS: &[(&str, &str)] = &[
    ("PLAYER", NAME),
    ("PROJECTED POINTS", FINAL_PROJECTION),
    ("POSITION", POS),
];

/// Map canonical column names to indices in the CSV header row.
///
/// Headers are trimmed and uppercased before the synonym table applies.
/// When two headers collapse onto the same canonical name, the first
/// occurrence wins.
fn resolve_columns(headers: &csv::StringRecord) -> HashMap<String, usize> {
    let mut columns = HashMap::new();
    for (idx, raw) in headers.iter().enumerate() {
        let normalized = raw.trim().to_uppercase();
        let canonical = SYNONYMS
            .iter()
            .find(|(from, _)| *from == normalized)
            .map(|(_, to)| (*to).to_string())
            .unwrap_or(normalized);
        columns.entry(canonical).or_insert(idx);
    }
    columns
}

fn field<'a>(
    record: &'a csv::StringRecord,
    columns: &HashMap<String, usize>,
    name: &str,
) -> &'a str {
    columns
        .get(name)
        .and_then(|&idx| record.get(idx))
        .unwrap_or("")
}

// ---------------------------------------------------------------------------
// Salary parsing
// ---------------------------------------------------------------------------

/// Parse a feed salary cell into whole dollars.
///
/// Tolerates a leading "$", thousands separators, and a "k" suffix; values
/// under 100 are read as thousands ("5.5k" -> 5500). Unparseable input
/// yields 0, which the salary > 0 invariant later drops.
pub fn parse_salary(raw: &str) -> u32 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|&c| !matches!(c, '$' | ',' | 'k'))
        .collect();
    let Ok(value) = cleaned.parse::<f64>() else {
        return 0;
    };
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    if value < 100.0 {
        (value * 1000.0) as u32
    } else {
        value as u32
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Fetch and parse the projection feed into the working table.
///
/// Fetch or CSV-structure failures propagate as [`DataSourceError`];
/// per-field problems are coerced to defaults and, where the defaults break
/// a table invariant (salary > 0, final projection > 0), the row is dropped.
pub async fn load_players(
    source: &dyn CsvSource,
    weights: &ProjectionWeights,
) -> Result<PlayerPool, DataSourceError> {
    let text = source.fetch().await?;
    parse_players(text.as_bytes(), weights)
}

/// Parse feed CSV text from any reader. Exposed so tests run on in-memory
/// strings.
pub fn parse_players<R: Read>(
    rdr: R,
    weights: &ProjectionWeights,
) -> Result<PlayerPool, DataSourceError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let columns = resolve_columns(reader.headers()?);

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (source_index, result) in reader.records().enumerate() {
        let record = result?;

        let name = field(&record, &columns, NAME).to_string();
        let salary = parse_salary(field(&record, &columns, SALARY));
        if salary == 0 {
            dropped += 1;
            continue;
        }

        let final_projection = safe_f64(field(&record, &columns, FINAL_PROJECTION));
        let dvp_raw = field(&record, &columns, DVP).to_string();
        let l5_raw = field(&record, &columns, L5_AVG).to_string();
        let sz_raw = field(&record, &columns, SZ_AVG).to_string();
        let adjusted_projection = compute_adjusted(
            final_projection,
            safe_f64(&dvp_raw),
            safe_f64(&l5_raw),
            safe_f64(&sz_raw),
            weights,
        );
        if final_projection <= 0.0 {
            dropped += 1;
            continue;
        }

        let positions = parse_positions(field(&record, &columns, POS));

        rows.push(PlayerRow {
            unique_id: format!("{name}_{source_index}"),
            name,
            team: field(&record, &columns, TEAM).to_string(),
            opponent: field(&record, &columns, OPP).to_string(),
            positions,
            salary,
            final_projection,
            adjusted_projection,
            dvp: dvp_raw,
            value: field(&record, &columns, VALUE).to_string(),
            l5_avg: l5_raw,
            l10_avg: field(&record, &columns, L10_AVG).to_string(),
            season_avg: sz_raw,
            over_under: field(&record, &columns, OVER_UNDER).to_string(),
            team_points: field(&record, &columns, TM_PTS).to_string(),
            ownership: field(&record, &columns, OWN_PCT).to_string(),
            game_time: field(&record, &columns, GAME_TIME).to_string(),
        });
    }

    if dropped > 0 {
        warn!("dropped {dropped} feed rows with no salary or no projection");
    }

    let mut teams: Vec<String> = rows
        .iter()
        .map(|r| r.team.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();
    teams.sort();
    teams.dedup();

    debug!("loaded {} players across {} teams", rows.len(), teams.len());

    Ok(PlayerPool { rows, teams })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
