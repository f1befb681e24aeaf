// ILP-backed lineup optimizer.
//
// Formulates lineup construction as a binary assignment problem over
// (player, slot) pairs and hands it to the solver behind `good_lp`.
// Successive lineups are enumerated by re-solving with a no-good cut per
// lineup already found, so candidates come back in descending objective
// order.

use std::collections::HashMap;

use good_lp::{
    constraint, default_solver, variable, variables, Expression, ResolutionError, Solution,
    SolverModel, Variable,
};
use tracing::debug;

use crate::lineup::optimizer::{
    CandidateLineup, LineupConstraints, LineupOptimizer, OptimizerError, OptimizerPlayer,
};
use crate::lineup::{RosterSlot, SLOT_TEMPLATE};

/// The production [`LineupOptimizer`].
#[derive(Debug, Default)]
pub struct IlpOptimizer;

impl IlpOptimizer {
    pub fn new() -> Self {
        IlpOptimizer
    }
}

impl LineupOptimizer for IlpOptimizer {
    fn optimize(
        &self,
        players: &[OptimizerPlayer],
        constraints: &LineupConstraints,
        n: usize,
    ) -> Result<Vec<CandidateLineup>, OptimizerError> {
        if players.is_empty() {
            return Err(OptimizerError::Infeasible);
        }

        // Player indices eligible for each template slot.
        let eligible: Vec<Vec<usize>> = SLOT_TEMPLATE
            .iter()
            .map(|slot| {
                players
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.positions.iter().any(|&pos| slot.accepts(pos)))
                    .map(|(pi, _)| pi)
                    .collect()
            })
            .collect();
        if eligible.iter().any(Vec::is_empty) {
            return Err(OptimizerError::Infeasible);
        }

        let locked: Vec<usize> = constraints
            .locked_ids
            .iter()
            .filter_map(|id| players.iter().position(|p| &p.id == id))
            .collect();

        let mut teams: Vec<String> = players.iter().map(|p| p.team.clone()).collect();
        teams.sort();
        teams.dedup();

        let mut cuts: Vec<Vec<usize>> = Vec::new();
        let mut results = Vec::new();
        for round in 0..n {
            match solve_once(players, constraints, &eligible, &locked, &teams, &cuts) {
                Ok(chosen) => {
                    cuts.push(chosen.iter().map(|&(_, pi)| pi).collect());
                    results.push(CandidateLineup {
                        players: chosen
                            .into_iter()
                            .map(|(si, pi)| (SLOT_TEMPLATE[si], players[pi].id.clone()))
                            .collect(),
                    });
                }
                Err(OptimizerError::Infeasible) if !results.is_empty() => {
                    debug!("pool exhausted after {round} lineups");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(results)
    }
}

/// Solve the assignment once under the accumulated no-good cuts, returning
/// the chosen (slot index, player index) pairs in template order.
fn solve_once(
    players: &[OptimizerPlayer],
    constraints: &LineupConstraints,
    eligible: &[Vec<usize>],
    locked: &[usize],
    teams: &[String],
    cuts: &[Vec<usize>],
) -> Result<Vec<(usize, usize)>, OptimizerError> {
    let mut pb = variables!();

    let mut x: HashMap<(usize, usize), Variable> = HashMap::new();
    for (si, slot_players) in eligible.iter().enumerate() {
        for &pi in slot_players {
            x.insert((pi, si), pb.add(variable().binary()));
        }
    }
    let y: Vec<Variable> = teams.iter().map(|_| pb.add(variable().binary())).collect();

    // Whether each player is rostered, in any slot.
    let used: Vec<Expression> = (0..players.len())
        .map(|pi| {
            (0..SLOT_TEMPLATE.len())
                .filter_map(|si| x.get(&(pi, si)))
                .map(|&v| Expression::from(v))
                .sum()
        })
        .collect();

    let objective: Expression = x
        .iter()
        .map(|(&(pi, _), &v)| players[pi].score * v)
        .sum();
    let mut model = pb.maximise(objective).using(default_solver);

    // Fill every slot exactly once.
    for (si, slot_players) in eligible.iter().enumerate() {
        let filled: Expression = slot_players
            .iter()
            .map(|&pi| Expression::from(x[&(pi, si)]))
            .sum();
        model = model.with(constraint!(filled == 1));
    }

    // No player in more than one slot.
    for (pi, player_used) in used.iter().enumerate() {
        if eligible.iter().any(|slot_players| slot_players.contains(&pi)) {
            model = model.with(constraint!(player_used.clone() <= 1));
        }
    }

    // Salary cap.
    let salary: Expression = x
        .iter()
        .map(|(&(pi, _), &v)| players[pi].salary as f64 * v)
        .sum();
    model = model.with(constraint!(salary <= constraints.salary_cap as f64));

    // Distinct-team bounds, via per-team indicator variables.
    for (ti, team) in teams.iter().enumerate() {
        let team_used: Expression = players
            .iter()
            .enumerate()
            .filter(|(_, p)| &p.team == team)
            .map(|(pi, _)| used[pi].clone())
            .sum();
        model = model.with(constraint!(team_used.clone() - 9.0 * y[ti] <= 0));
        model = model.with(constraint!(Expression::from(y[ti]) - team_used <= 0));
    }
    let total_teams: Expression = y.iter().map(|&v| Expression::from(v)).sum();
    model = model.with(constraint!(total_teams.clone() >= constraints.min_teams as f64));
    model = model.with(constraint!(total_teams <= constraints.max_teams as f64));

    // Locked players appear in every lineup.
    for &pi in locked {
        model = model.with(constraint!(used[pi].clone() == 1));
    }

    // Stack: a quarterback from the team plus at least two of his
    // pass-catchers.
    if let Some(stack) = &constraints.stack {
        stack.validate(players)?;
        let qb_slots: Vec<usize> = SLOT_TEMPLATE
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == RosterSlot::Qb)
            .map(|(si, _)| si)
            .collect();
        let stacked_qb: Expression = x
            .iter()
            .filter(|(&(pi, si), _)| {
                qb_slots.contains(&si) && players[pi].team.eq_ignore_ascii_case(&stack.team)
            })
            .map(|(_, &v)| Expression::from(v))
            .sum();
        // Pass-catchers are counted by the slot they occupy; only RB/WR/TE
        // and FLEX slots can hold one.
        let stacked_catchers: Expression = x
            .iter()
            .filter(|(&(pi, si), _)| {
                !qb_slots.contains(&si)
                    && SLOT_TEMPLATE[si] != RosterSlot::Dst
                    && players[pi].team.eq_ignore_ascii_case(&stack.team)
            })
            .map(|(_, &v)| Expression::from(v))
            .sum();
        model = model.with(constraint!(stacked_qb == 1));
        model = model.with(constraint!(stacked_catchers >= 2.0));
    }

    // No-good cuts: each previously returned lineup must differ by at least
    // one player.
    let max_overlap = (SLOT_TEMPLATE.len() - 1) as f64;
    for cut in cuts {
        let overlap: Expression = cut.iter().map(|&pi| used[pi].clone()).sum();
        model = model.with(constraint!(overlap <= max_overlap));
    }

    let solution = model.solve().map_err(|e| match e {
        ResolutionError::Infeasible => OptimizerError::Infeasible,
        other => OptimizerError::Solver(other.to_string()),
    })?;

    let mut chosen = Vec::with_capacity(SLOT_TEMPLATE.len());
    for (si, slot_players) in eligible.iter().enumerate() {
        let pi = slot_players
            .iter()
            .copied()
            .find(|&pi| solution.value(x[&(pi, si)]) > 0.5)
            .ok_or_else(|| OptimizerError::Solver("slot left unfilled by solver".into()))?;
        chosen.push((si, pi));
    }
    Ok(chosen)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
