// Adjusted projection heuristic.
//
// Dampens the raw projection and nudges it for matchup difficulty (DVP) and
// recent-form consistency. The constants live in config so they can be tuned
// without touching this logic.

use serde::Deserialize;

/// Tunable constants for the adjusted projection heuristic
/// (`[projection]` in settings.toml).
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionWeights {
    /// DVP ranks strictly below this mark a tough matchup.
    pub dvp_threshold: f64,
    /// Points subtracted for a tough matchup.
    pub dvp_penalty: f64,
    /// Max |L5 avg - season avg| still counted as consistent.
    pub consistency_window: f64,
    /// Minimum L5 average for the consistency bonus to apply.
    pub hot_floor: f64,
    /// Points added for a consistent, productive recent stretch.
    pub consistency_bonus: f64,
    /// Final multiplier applied to the adjusted value.
    pub dampening: f64,
}

impl Default for ProjectionWeights {
    fn default() -> Self {
        ProjectionWeights {
            dvp_threshold: 5.0,
            dvp_penalty: 1.5,
            consistency_window: 5.0,
            hot_floor: 14.0,
            consistency_bonus: 1.5,
            dampening: 0.75,
        }
    }
}

/// Parse a feed cell as f64, defaulting to 0.0 for anything unparseable.
pub fn safe_f64(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

/// Compute the adjusted projection, rounded to 2 decimals.
///
/// Inputs are the already-coerced feed values; callers pass 0.0 for missing
/// or non-numeric cells. Never fails.
pub fn compute_adjusted(
    final_projection: f64,
    dvp: f64,
    l5_avg: f64,
    season_avg: f64,
    weights: &ProjectionWeights,
) -> f64 {
    let mut adj = final_projection;
    if dvp < weights.dvp_threshold {
        adj -= weights.dvp_penalty;
    }
    if (l5_avg - season_avg).abs() <= weights.consistency_window && l5_avg > weights.hot_floor {
        adj += weights.consistency_bonus;
    }
    adj *= weights.dampening;
    (adj * 100.0).round() / 100.0
}
