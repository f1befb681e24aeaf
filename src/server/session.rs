// Cookie-keyed, in-memory session state.
//
// Each browser session owns one FilterState, overwritten wholesale on every
// form submission. Concurrent submissions from the same client are
// last-write-wins; there is no durable store.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::pool::filter::TimeFilter;

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// The user's current selections, as carried between the pool view and the
/// lineups view.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub locked_ids: HashSet<String>,
    pub excluded_ids: HashSet<String>,
    pub num_lineups: usize,
    pub time_filter: TimeFilter,
    pub stack_team: Option<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            locked_ids: HashSet::new(),
            excluded_ids: HashSet::new(),
            num_lineups: 1,
            time_filter: TimeFilter::All,
            stack_team: None,
        }
    }
}

impl FilterState {
    /// Build a state from submitted form pairs, replacing whatever the
    /// session held before. Unparseable numbers and unknown filter names
    /// fall back to the defaults.
    pub fn from_form(pairs: &[(String, String)]) -> Self {
        let mut state = FilterState::default();
        for (key, value) in pairs {
            match key.as_str() {
                "lock_player" => {
                    state.locked_ids.insert(value.clone());
                }
                "exclude_player" => {
                    state.excluded_ids.insert(value.clone());
                }
                "num_lineups" => {
                    state.num_lineups = value.trim().parse().unwrap_or(1).max(1);
                }
                "time_filter" => {
                    state.time_filter = TimeFilter::parse(value);
                }
                "stack_team" => {
                    let trimmed = value.trim();
                    state.stack_team =
                        (!trimmed.is_empty()).then(|| trimmed.to_string());
                }
                _ => {}
            }
        }
        state
    }
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

/// In-memory session map. Lives for the process lifetime; sessions for
/// cookies the server has never seen read as the default state.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, FilterState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    /// The state for a session id, defaulting for unknown ids.
    pub fn get(&self, sid: &str) -> FilterState {
        self.inner.lock().get(sid).cloned().unwrap_or_default()
    }

    /// Overwrite the state for a session id.
    pub fn put(&self, sid: &str, state: FilterState) {
        self.inner.lock().insert(sid.to_string(), state);
    }
}

/// Mint a fresh session id for the `sid` cookie.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}
