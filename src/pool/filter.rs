// Game-time window filtering.

use crate::pool::PlayerRow;

// ---------------------------------------------------------------------------
// Time filter
// ---------------------------------------------------------------------------

/// Which slate window to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    /// Every row with a parseable game time.
    #[default]
    All,
    /// The early-afternoon window, 12:30 through 13:30 inclusive.
    OnePm,
    /// Late games, 16:00 onward.
    Late,
}

impl TimeFilter {
    /// Parse the form/session value. Unrecognized names behave as `All`,
    /// matching the filter's own fallback branch.
    pub fn parse(s: &str) -> Self {
        match s {
            "1pm" => TimeFilter::OnePm,
            "late" => TimeFilter::Late,
            _ => TimeFilter::All,
        }
    }

    /// The form/session value for this filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::All => "all",
            TimeFilter::OnePm => "1pm",
            TimeFilter::Late => "late",
        }
    }
}

const ONE_PM_START: u32 = 12 * 60 + 30;
const ONE_PM_END: u32 = 13 * 60 + 30;
const LATE_START: u32 = 16 * 60;

/// Parse a feed game-time string ("1:05pm", case-insensitive) into minutes
/// since midnight. Returns `None` for anything that does not parse.
///
/// The meridiem is read from the final two characters; a string without one
/// ("13:30") keeps its hour as written.
pub fn parse_game_time(raw: &str) -> Option<u32> {
    let s = raw.trim();
    let (hour_part, rest) = s.split_once(':')?;
    let mut hour: i32 = hour_part.trim().parse().ok()?;
    let minute: i32 = rest.get(..rest.len().min(2))?.parse().ok()?;

    let meridiem = s
        .get(s.len().saturating_sub(2)..)
        .map(str::to_uppercase)
        .unwrap_or_default();
    if meridiem == "PM" && hour != 12 {
        hour += 12;
    } else if meridiem == "AM" && hour == 12 {
        hour = 0;
    }

    if hour < 0 || minute < 0 {
        return None;
    }
    Some((hour * 60 + minute) as u32)
}

/// Keep the rows whose game time falls in the requested window.
///
/// Rows with an unparseable game time are dropped under every filter.
/// Exclusion-id filtering is the caller's job, applied after this.
pub fn filter_by_time(rows: &[PlayerRow], filter: TimeFilter) -> Vec<PlayerRow> {
    rows.iter()
        .filter(|row| {
            let Some(minutes) = parse_game_time(&row.game_time) else {
                return false;
            };
            match filter {
                TimeFilter::All => true,
                TimeFilter::OnePm => (ONE_PM_START..=ONE_PM_END).contains(&minutes),
                TimeFilter::Late => minutes >= LATE_START,
            }
        })
        .cloned()
        .collect()
}
