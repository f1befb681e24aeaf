// Turns the filtered player table into optimizer records, applies the
// user's locks/excludes/stack, and collects deduplicated lineups.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::config::ContestConfig;
use crate::lineup::optimizer::{
    LineupConstraints, LineupOptimizer, OptimizerPlayer, TeamStack,
};
use crate::lineup::Lineup;
use crate::pool::PlayerRow;

/// Build up to `count` unique lineups from the given rows.
///
/// Optimizer failures (infeasible constraints included) degrade to an empty
/// result; they never propagate. Locked or excluded ids with no matching
/// row are ignored, which is how stale ids from a reloaded feed behave.
pub fn build_lineups(
    rows: &[PlayerRow],
    count: usize,
    locked_ids: &HashSet<String>,
    excluded_ids: &HashSet<String>,
    stack_team: Option<&str>,
    optimizer: &dyn LineupOptimizer,
    contest: &ContestConfig,
) -> Vec<Lineup> {
    let pool: Vec<&PlayerRow> = rows
        .iter()
        .filter(|row| !excluded_ids.contains(&row.unique_id))
        .filter(|row| {
            row.salary > 0 && row.adjusted_projection > 0.0 && !row.positions.is_empty()
        })
        .collect();

    let players: Vec<OptimizerPlayer> = pool
        .iter()
        .map(|row| OptimizerPlayer {
            id: row.unique_id.clone(),
            name: row.name.clone(),
            team: row.team.trim().to_uppercase(),
            positions: row.positions.clone(),
            salary: row.salary,
            score: row.adjusted_projection,
        })
        .collect();

    let stack = stack_team
        .filter(|t| !t.trim().is_empty())
        .map(|t| TeamStack {
            team: t.trim().to_uppercase(),
        })
        .and_then(|stack| match stack.validate(&players) {
            Ok(()) => Some(stack),
            Err(e) => {
                warn!("stacking skipped: {e}");
                None
            }
        });

    let locked: Vec<String> = locked_ids
        .iter()
        .filter(|id| players.iter().any(|p| &p.id == *id))
        .cloned()
        .collect();

    let constraints = LineupConstraints {
        salary_cap: contest.salary_cap,
        min_teams: contest.min_teams,
        max_teams: contest.max_teams,
        locked_ids: locked,
        stack,
    };

    let candidates = match optimizer.optimize(
        &players,
        &constraints,
        count * contest.candidate_multiplier,
    ) {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("optimizer error: {e}");
            return Vec::new();
        }
    };

    let by_id: HashMap<&str, &PlayerRow> =
        pool.iter().map(|row| (row.unique_id.as_str(), *row)).collect();

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut lineups = Vec::new();
    for candidate in candidates {
        if !seen.insert(candidate.id_key()) {
            continue;
        }
        let slots: Option<Vec<_>> = candidate
            .players
            .iter()
            .map(|(slot, id)| by_id.get(id.as_str()).map(|row| (*slot, (*row).clone())))
            .collect();
        match slots {
            Some(slots) => lineups.push(Lineup { slots }),
            None => {
                warn!("optimizer returned an unknown player id; candidate dropped");
                continue;
            }
        }
        if lineups.len() >= count {
            break;
        }
    }
    lineups
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::optimizer::{CandidateLineup, OptimizerError};
    use crate::lineup::SLOT_TEMPLATE;
    use crate::pool::Position;
    use std::sync::Mutex;

    fn row(id: &str, team: &str, positions: Vec<Position>, salary: u32, adj: f64) -> PlayerRow {
        PlayerRow {
            unique_id: id.to_string(),
            name: id.to_string(),
            team: team.to_string(),
            opponent: String::new(),
            positions,
            salary,
            final_projection: adj / 0.75,
            adjusted_projection: adj,
            dvp: String::new(),
            value: String::new(),
            l5_avg: String::new(),
            l10_avg: String::new(),
            season_avg: String::new(),
            over_under: String::new(),
            team_points: String::new(),
            ownership: String::new(),
            game_time: "1:00pm".to_string(),
        }
    }

    fn nine_rows() -> Vec<PlayerRow> {
        vec![
            row("qb_0", "AAA", vec![Position::Quarterback], 6000, 16.0),
            row("rb_1", "AAA", vec![Position::RunningBack], 5000, 12.0),
            row("rb_2", "BBB", vec![Position::RunningBack], 5000, 11.0),
            row("wr_3", "BBB", vec![Position::WideReceiver], 5000, 10.0),
            row("wr_4", "CCC", vec![Position::WideReceiver], 5000, 9.0),
            row("wr_5", "CCC", vec![Position::WideReceiver], 5000, 8.0),
            row("te_6", "DDD", vec![Position::TightEnd], 4000, 7.0),
            row("fx_7", "DDD", vec![Position::RunningBack], 4000, 6.0),
            row("dst_8", "DDD", vec![Position::Defense], 3000, 4.0),
        ]
    }

    /// Records what the builder asked for and replays canned candidates.
    struct ScriptedOptimizer {
        requests: Mutex<Vec<(usize, LineupConstraints, Vec<String>)>>,
        response: Result<Vec<CandidateLineup>, OptimizerError>,
    }

    impl ScriptedOptimizer {
        fn returning(response: Result<Vec<CandidateLineup>, OptimizerError>) -> Self {
            ScriptedOptimizer {
                requests: Mutex::new(Vec::new()),
                response,
            }
        }
    }

    impl LineupOptimizer for ScriptedOptimizer {
        fn optimize(
            &self,
            players: &[OptimizerPlayer],
            constraints: &LineupConstraints,
            n: usize,
        ) -> Result<Vec<CandidateLineup>, OptimizerError> {
            self.requests.lock().unwrap().push((
                n,
                constraints.clone(),
                players.iter().map(|p| p.id.clone()).collect(),
            ));
            match &self.response {
                Ok(candidates) => Ok(candidates.clone()),
                Err(OptimizerError::Infeasible) => Err(OptimizerError::Infeasible),
                Err(OptimizerError::Stack(s)) => Err(OptimizerError::Stack(s.clone())),
                Err(OptimizerError::Solver(s)) => Err(OptimizerError::Solver(s.clone())),
            }
        }
    }

    fn candidate(ids: [&str; 9]) -> CandidateLineup {
        CandidateLineup {
            players: SLOT_TEMPLATE
                .iter()
                .zip(ids)
                .map(|(slot, id)| (*slot, id.to_string()))
                .collect(),
        }
    }

    fn full_candidate() -> CandidateLineup {
        candidate([
            "qb_0", "rb_1", "rb_2", "wr_3", "wr_4", "wr_5", "te_6", "fx_7", "dst_8",
        ])
    }

    #[test]
    fn requests_three_candidates_per_lineup() {
        let optimizer = ScriptedOptimizer::returning(Ok(vec![full_candidate()]));
        build_lineups(
            &nine_rows(),
            2,
            &HashSet::new(),
            &HashSet::new(),
            None,
            &optimizer,
            &ContestConfig::default(),
        );
        let requests = optimizer.requests.lock().unwrap();
        assert_eq!(requests[0].0, 6);
    }

    #[test]
    fn excluded_rows_never_reach_the_optimizer() {
        let optimizer = ScriptedOptimizer::returning(Err(OptimizerError::Infeasible));
        let excluded: HashSet<String> = ["rb_1".to_string()].into();
        build_lineups(
            &nine_rows(),
            1,
            &HashSet::new(),
            &excluded,
            None,
            &optimizer,
            &ContestConfig::default(),
        );
        let requests = optimizer.requests.lock().unwrap();
        assert!(!requests[0].2.contains(&"rb_1".to_string()));
        assert_eq!(requests[0].2.len(), 8);
    }

    #[test]
    fn unrosterable_rows_are_skipped() {
        let mut rows = nine_rows();
        rows.push(row("no_pos", "AAA", vec![], 5000, 9.0));
        rows.push(row("no_proj", "AAA", vec![Position::RunningBack], 5000, 0.0));
        rows.push(row("no_sal", "AAA", vec![Position::RunningBack], 0, 9.0));

        let optimizer = ScriptedOptimizer::returning(Err(OptimizerError::Infeasible));
        build_lineups(
            &rows,
            1,
            &HashSet::new(),
            &HashSet::new(),
            None,
            &optimizer,
            &ContestConfig::default(),
        );
        let requests = optimizer.requests.lock().unwrap();
        assert_eq!(requests[0].2.len(), 9);
    }

    #[test]
    fn optimizer_error_degrades_to_empty() {
        let optimizer =
            ScriptedOptimizer::returning(Err(OptimizerError::Solver("boom".to_string())));
        let lineups = build_lineups(
            &nine_rows(),
            1,
            &HashSet::new(),
            &HashSet::new(),
            None,
            &optimizer,
            &ContestConfig::default(),
        );
        assert!(lineups.is_empty());
    }

    #[test]
    fn duplicate_id_sets_collapse_to_one_lineup() {
        // Same nine players in two different slot arrangements: one survives.
        let reordered = candidate([
            "qb_0", "rb_2", "rb_1", "wr_4", "wr_3", "wr_5", "te_6", "fx_7", "dst_8",
        ]);
        let optimizer =
            ScriptedOptimizer::returning(Ok(vec![full_candidate(), reordered]));
        let lineups = build_lineups(
            &nine_rows(),
            5,
            &HashSet::new(),
            &HashSet::new(),
            None,
            &optimizer,
            &ContestConfig::default(),
        );
        assert_eq!(lineups.len(), 1);
        // The first arrangement wins.
        assert_eq!(lineups[0].slots[1].1.unique_id, "rb_1");
    }

    #[test]
    fn returns_at_most_count_lineups() {
        let mut rows = nine_rows();
        rows.push(row("rb_alt", "BBB", vec![Position::RunningBack], 5000, 5.0));
        let second = candidate([
            "qb_0", "rb_alt", "rb_2", "wr_3", "wr_4", "wr_5", "te_6", "fx_7", "dst_8",
        ]);
        let third = candidate([
            "qb_0", "rb_1", "rb_alt", "wr_3", "wr_4", "wr_5", "te_6", "fx_7", "dst_8",
        ]);
        let optimizer = ScriptedOptimizer::returning(Ok(vec![
            full_candidate(),
            second,
            third,
        ]));
        let lineups = build_lineups(
            &rows,
            2,
            &HashSet::new(),
            &HashSet::new(),
            None,
            &optimizer,
            &ContestConfig::default(),
        );
        assert_eq!(lineups.len(), 2);
    }

    #[test]
    fn stale_locked_ids_silently_ignored() {
        // Ids are positional, so a feed reorder can leave a session locking
        // an id that no longer exists. The builder drops it quietly.
        let optimizer = ScriptedOptimizer::returning(Ok(vec![full_candidate()]));
        let locked: HashSet<String> = ["ghost_99".to_string()].into();
        let lineups = build_lineups(
            &nine_rows(),
            1,
            &locked,
            &HashSet::new(),
            None,
            &optimizer,
            &ContestConfig::default(),
        );
        assert_eq!(lineups.len(), 1);
        let requests = optimizer.requests.lock().unwrap();
        assert!(requests[0].1.locked_ids.is_empty());
    }

    #[test]
    fn matching_locked_ids_forwarded() {
        let optimizer = ScriptedOptimizer::returning(Ok(vec![full_candidate()]));
        let locked: HashSet<String> = ["qb_0".to_string()].into();
        build_lineups(
            &nine_rows(),
            1,
            &locked,
            &HashSet::new(),
            None,
            &optimizer,
            &ContestConfig::default(),
        );
        let requests = optimizer.requests.lock().unwrap();
        assert_eq!(requests[0].1.locked_ids, vec!["qb_0".to_string()]);
    }

    #[test]
    fn unsatisfiable_stack_dropped_and_build_proceeds() {
        // No NE players in the pool: the stack request is logged away and
        // the optimizer runs unconstrained.
        let optimizer = ScriptedOptimizer::returning(Ok(vec![full_candidate()]));
        let lineups = build_lineups(
            &nine_rows(),
            1,
            &HashSet::new(),
            &HashSet::new(),
            Some("NE"),
            &optimizer,
            &ContestConfig::default(),
        );
        assert_eq!(lineups.len(), 1);
        let requests = optimizer.requests.lock().unwrap();
        assert!(requests[0].1.stack.is_none());
    }

    #[test]
    fn satisfiable_stack_forwarded_uppercased() {
        let mut rows = nine_rows();
        rows.push(row("qb_ne", "ne", vec![Position::Quarterback], 6000, 10.0));
        rows.push(row("wr_ne", "ne", vec![Position::WideReceiver], 5000, 8.0));
        rows.push(row("te_ne", "ne", vec![Position::TightEnd], 4000, 7.0));
        let optimizer = ScriptedOptimizer::returning(Ok(vec![full_candidate()]));
        build_lineups(
            &rows,
            1,
            &HashSet::new(),
            &HashSet::new(),
            Some("ne"),
            &optimizer,
            &ContestConfig::default(),
        );
        let requests = optimizer.requests.lock().unwrap();
        let stack = requests[0].1.stack.as_ref().expect("stack should be kept");
        assert_eq!(stack.team, "NE");
    }

    #[test]
    fn blank_stack_team_means_no_stack() {
        let optimizer = ScriptedOptimizer::returning(Ok(vec![full_candidate()]));
        build_lineups(
            &nine_rows(),
            1,
            &HashSet::new(),
            &HashSet::new(),
            Some("  "),
            &optimizer,
            &ContestConfig::default(),
        );
        let requests = optimizer.requests.lock().unwrap();
        assert!(requests[0].1.stack.is_none());
    }

    #[test]
    fn contest_settings_forwarded() {
        let optimizer = ScriptedOptimizer::returning(Ok(vec![full_candidate()]));
        let contest = ContestConfig {
            salary_cap: 60_000,
            min_teams: 3,
            max_teams: 5,
            candidate_multiplier: 4,
        };
        build_lineups(
            &nine_rows(),
            2,
            &HashSet::new(),
            &HashSet::new(),
            None,
            &optimizer,
            &contest,
        );
        let requests = optimizer.requests.lock().unwrap();
        assert_eq!(requests[0].0, 8);
        assert_eq!(requests[0].1.salary_cap, 60_000);
        assert_eq!(requests[0].1.min_teams, 3);
        assert_eq!(requests[0].1.max_teams, 5);
    }
}
