// Player pool: loading, scoring, and filtering of the projection feed.

pub mod filter;
pub mod heuristic;
pub mod loader;

use std::fmt;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// NFL positions used for roster slot eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Defense,
}

impl Position {
    /// Parse a position token from the feed.
    ///
    /// Handles the common defense spellings ("DST", "DEF", "D/ST", "D").
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "DST" | "DEF" | "D/ST" | "D" => Some(Position::Defense),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Defense => "DST",
        }
    }

    /// Whether this position can catch a pass from its quarterback, for
    /// stacking purposes.
    pub fn is_pass_catcher(&self) -> bool {
        matches!(
            self,
            Position::RunningBack | Position::WideReceiver | Position::TightEnd
        )
    }

    /// Deterministic ordering index for display.
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Quarterback => 0,
            Position::RunningBack => 1,
            Position::WideReceiver => 2,
            Position::TightEnd => 3,
            Position::Defense => 4,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Parse a feed position cell ("RB/WR", "RB,WR", "QB") into a deduplicated,
/// deterministically ordered position list. Unknown tokens are dropped.
pub fn parse_positions(raw: &str) -> Vec<Position> {
    let mut positions: Vec<Position> = raw
        .replace('/', ",")
        .split(',')
        .filter_map(Position::from_str_pos)
        .collect();
    positions.sort_by_key(|p| p.sort_order());
    positions.dedup();
    positions
}

/// Render a position list the way the pool table shows it ("RB/WR").
pub fn display_positions(positions: &[Position]) -> String {
    positions
        .iter()
        .map(|p| p.display_str())
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// Player rows
// ---------------------------------------------------------------------------

/// One row of the working table, cleaned and scored.
///
/// The display metric fields are passed through as fetched; only the fields
/// the pipeline computes with are typed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRow {
    /// Derived as `{name}_{source_row_index}`. Unique within one load, but
    /// NOT stable across reloads: if the feed reorders rows, a previously
    /// stored id can point at a different player or at nothing.
    pub unique_id: String,
    pub name: String,
    pub team: String,
    pub opponent: String,
    pub positions: Vec<Position>,
    pub salary: u32,
    pub final_projection: f64,
    pub adjusted_projection: f64,
    pub dvp: String,
    pub value: String,
    pub l5_avg: String,
    pub l10_avg: String,
    pub season_avg: String,
    pub over_under: String,
    pub team_points: String,
    pub ownership: String,
    pub game_time: String,
}

/// The loaded working table plus the distinct team codes present in it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPool {
    pub rows: Vec<PlayerRow>,
    pub teams: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_parsing_handles_defense_spellings() {
        assert_eq!(Position::from_str_pos("DST"), Some(Position::Defense));
        assert_eq!(Position::from_str_pos("def"), Some(Position::Defense));
        assert_eq!(Position::from_str_pos("D/ST"), Some(Position::Defense));
        assert_eq!(Position::from_str_pos("D"), Some(Position::Defense));
    }

    #[test]
    fn position_parsing_rejects_unknown() {
        assert_eq!(Position::from_str_pos("FB"), None);
        assert_eq!(Position::from_str_pos(""), None);
    }

    #[test]
    fn parse_positions_splits_both_separators() {
        assert_eq!(
            parse_positions("RB/WR"),
            vec![Position::RunningBack, Position::WideReceiver]
        );
        assert_eq!(
            parse_positions("WR,RB"),
            vec![Position::RunningBack, Position::WideReceiver]
        );
    }

    #[test]
    fn parse_positions_dedups_and_drops_unknown() {
        assert_eq!(
            parse_positions("RB/rb/FB"),
            vec![Position::RunningBack]
        );
        assert!(parse_positions("XX").is_empty());
    }

    #[test]
    fn display_positions_joins_with_slash() {
        assert_eq!(
            display_positions(&[Position::RunningBack, Position::WideReceiver]),
            "RB/WR"
        );
        assert_eq!(display_positions(&[Position::Quarterback]), "QB");
        assert_eq!(display_positions(&[]), "");
    }

    #[test]
    fn pass_catchers_are_rb_wr_te() {
        assert!(Position::RunningBack.is_pass_catcher());
        assert!(Position::WideReceiver.is_pass_catcher());
        assert!(Position::TightEnd.is_pass_catcher());
        assert!(!Position::Quarterback.is_pass_catcher());
        assert!(!Position::Defense.is_pass_catcher());
    }
}
