// Optimizer capability interface.
//
// The builder talks to the lineup optimizer only through this contract, so
// the solver backing it can be swapped without touching the rest of the
// pipeline.

use crate::lineup::RosterSlot;
use crate::pool::Position;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error("no feasible lineup under the given constraints")]
    Infeasible,

    #[error("stack constraint cannot be applied: {0}")]
    Stack(String),

    #[error("solver failure: {0}")]
    Solver(String),
}

// ---------------------------------------------------------------------------
// Player records and constraints
// ---------------------------------------------------------------------------

/// A rosterable player as the optimizer sees it.
#[derive(Debug, Clone)]
pub struct OptimizerPlayer {
    pub id: String,
    pub name: String,
    /// Uppercased team code; used for stacking and team-count constraints.
    pub team: String,
    pub positions: Vec<Position>,
    pub salary: u32,
    pub score: f64,
}

/// A request to roster a quarterback together with at least two of his
/// pass-catchers.
#[derive(Debug, Clone)]
pub struct TeamStack {
    pub team: String,
}

impl TeamStack {
    /// Check that the pool can satisfy this stack: at least one quarterback
    /// and two pass-catchers from the team must be present.
    pub fn validate(&self, players: &[OptimizerPlayer]) -> Result<(), OptimizerError> {
        let from_team = |p: &&OptimizerPlayer| p.team.eq_ignore_ascii_case(&self.team);
        let quarterbacks = players
            .iter()
            .filter(from_team)
            .filter(|p| p.positions.contains(&Position::Quarterback))
            .count();
        if quarterbacks == 0 {
            return Err(OptimizerError::Stack(format!(
                "no quarterback from {} in the pool",
                self.team
            )));
        }
        let catchers = players
            .iter()
            .filter(from_team)
            .filter(|p| p.positions.iter().any(Position::is_pass_catcher))
            .count();
        if catchers < 2 {
            return Err(OptimizerError::Stack(format!(
                "only {} pass-catchers from {} in the pool",
                catchers, self.team
            )));
        }
        Ok(())
    }
}

/// Everything the optimizer must honor besides the roster template.
#[derive(Debug, Clone)]
pub struct LineupConstraints {
    pub salary_cap: u32,
    /// Inclusive bounds on distinct teams represented in a lineup.
    pub min_teams: usize,
    pub max_teams: usize,
    /// Player ids forced into every lineup. Must reference players present
    /// in the pool handed to `optimize`.
    pub locked_ids: Vec<String>,
    pub stack: Option<TeamStack>,
}

/// A solved lineup, slot by slot in template order, referencing players by
/// id.
#[derive(Debug, Clone)]
pub struct CandidateLineup {
    pub players: Vec<(RosterSlot, String)>,
}

impl CandidateLineup {
    /// The sorted player-id set, used for deduplication.
    pub fn id_key(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.players.iter().map(|(_, id)| id.clone()).collect();
        ids.sort();
        ids
    }
}

// ---------------------------------------------------------------------------
// The capability interface
// ---------------------------------------------------------------------------

/// The external lineup optimizer, seen only through its contract: given a
/// pool and constraints, produce up to `n` feasible lineups in descending
/// quality order, or fail.
pub trait LineupOptimizer: Send + Sync {
    fn optimize(
        &self,
        players: &[OptimizerPlayer],
        constraints: &LineupConstraints,
        n: usize,
    ) -> Result<Vec<CandidateLineup>, OptimizerError>;
}
