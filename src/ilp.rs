use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use good_lp::{
    default_solver, variable, variables, Constraint, Expression, ResolutionError, Solution,
    SolverModel, Variable, WithTimeLimit,
};
use log::*;

use crate::algorithm::ByesAlgorithm;
use crate::error::SolveError;
use crate::precedence::PrecedenceArray;
use crate::schedule::{Assignment, Schedule, SolveState};
use crate::{RoundId, TeamId};

/// Default wall-clock budget of one fixed-round solve.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(600);

/// Objective of the integer program. Both share the feasibility constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formulation {
    /// Minimise the total number of byes.
    Standard,
    /// Maximise the number of rounds in which a bye is not followed by another bye.
    MinimizeConsecutiveByes,
}

impl Default for Formulation {
    fn default() -> Self {
        Formulation::Standard
    }
}

impl FromStr for Formulation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Formulation::Standard),
            "consecutive" => Ok(Formulation::MinimizeConsecutiveByes),
            _ => Err(format!("unknown formulation {:?}, expected standard or consecutive", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IlpConfig {
    pub formulation: Formulation,
    /// A solve without a solution after this long counts as infeasible. A limit too large to
    /// add to the current time means no limit.
    pub time_limit: Duration,
}

impl Default for IlpConfig {
    fn default() -> Self {
        IlpConfig {
            formulation: Formulation::Standard,
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }
}

impl IlpConfig {
    /// The limit handed to the solver, in seconds, or `None` when it is unbounded.
    fn solver_time_limit(&self) -> Option<f64> {
        Instant::now()
            .checked_add(self.time_limit)
            .map(|_| self.time_limit.as_secs_f64())
    }
}

/// The integer program for a fixed number of rounds.
///
/// Variables: `x[i,j,r]` team `i` plays `j` in round `r`, `y[i,r]` team `i` has a bye in
/// round `r`, and for [`Formulation::MinimizeConsecutiveByes`] also `m[i,r]` for `r >= 2`.
#[derive(Debug, Clone)]
pub struct FixedRoundsProblem {
    num_rounds: usize,
    precedence: Arc<PrecedenceArray>,
    config: IlpConfig,
    state: SolveState,
}

impl FixedRoundsProblem {
    pub fn new(num_rounds: usize, precedence: Arc<PrecedenceArray>, config: IlpConfig) -> Self {
        FixedRoundsProblem {
            num_rounds,
            precedence,
            config,
            state: SolveState::Loaded,
        }
    }

    pub fn num_teams(&self) -> usize {
        self.precedence.num_teams()
    }
}

impl ByesAlgorithm for FixedRoundsProblem {
    fn solve(&mut self) {
        if self.state != SolveState::Loaded {
            return;
        }
        self.state = match solve_model(self.num_rounds, &self.precedence, self.config) {
            Some(schedule) => SolveState::Optimal(schedule),
            None => SolveState::Infeasible,
        };
    }

    fn state(&self) -> &SolveState {
        &self.state
    }
}

/// A fixed-round solve running on its own thread. The solver stops at its own time limit, so
/// waiting is bounded by that limit.
pub(crate) struct PendingSolve {
    num_rounds: usize,
    handle: JoinHandle<Option<Schedule>>,
}

impl PendingSolve {
    /// Block until the worker has finished. `Ok(None)` when the program is infeasible or the
    /// time limit passed first.
    pub(crate) fn wait(self) -> Result<Option<Schedule>, SolveError> {
        let num_rounds = self.num_rounds;
        self.handle
            .join()
            .map_err(|_| SolveError::WorkerLost(num_rounds))
    }
}

/// Start solving the `num_rounds` program on a new thread. The worker holds a clone of
/// `alive` until it returns.
pub(crate) fn spawn_solve(
    num_rounds: usize,
    precedence: Arc<PrecedenceArray>,
    config: IlpConfig,
    alive: Arc<()>,
) -> Result<PendingSolve, SolveError> {
    let handle = thread::Builder::new()
        .name(format!("ilp-{}-rounds", num_rounds))
        .spawn(move || {
            let _alive = alive;
            solve_model(num_rounds, &precedence, config)
        })?;
    Ok(PendingSolve { num_rounds, handle })
}

fn sum(vars: impl IntoIterator<Item = Variable>) -> Expression {
    let mut expr = Expression::default();
    for v in vars {
        expr.add_mul(1.0, v);
    }
    expr
}

/// Build and solve the program for `num_rounds` rounds. `None` if it has no solution.
pub fn solve_model(
    num_rounds: usize,
    precedence: &PrecedenceArray,
    config: IlpConfig,
) -> Option<Schedule> {
    let formulation = config.formulation;
    let num_teams = precedence.num_teams();
    if num_rounds < num_teams - 1 {
        debug!("{} rounds cannot fit {} matches per team", num_rounds, num_teams - 1);
        return None;
    }

    let team_ids = || 1..=num_teams;
    let round_ids = || 1..=num_rounds;

    let mut vars = variables!();
    let mut x: HashMap<(TeamId, TeamId, RoundId), Variable> = HashMap::new();
    let mut y: HashMap<(TeamId, RoundId), Variable> = HashMap::new();
    let mut m: HashMap<(TeamId, RoundId), Variable> = HashMap::new();

    for i in team_ids() {
        for j in team_ids() {
            for r in round_ids() {
                x.insert((i, j, r), vars.add(variable().binary()));
            }
        }
    }
    for i in team_ids() {
        for r in round_ids() {
            y.insert((i, r), vars.add(variable().binary()));
        }
    }
    if formulation == Formulation::MinimizeConsecutiveByes {
        for i in team_ids() {
            for r in round_ids().skip(1) {
                m.insert((i, r), vars.add(variable().binary()));
            }
        }
    }

    let problem = match formulation {
        Formulation::Standard => vars.minimise(sum(y.values().copied())),
        Formulation::MinimizeConsecutiveByes => vars.maximise(sum(m.values().copied())),
    };

    let mut constraints: Vec<Constraint> = Vec::new();

    // No self-play, and a match is the same match from both sides.
    for r in round_ids() {
        for i in team_ids() {
            constraints.push(Expression::from(x[&(i, i, r)]).eq(0.0));
            for j in (i + 1)..=num_teams {
                constraints.push((x[&(i, j, r)] - x[&(j, i, r)]).eq(0.0));
            }
        }
    }

    // Every pair meets in exactly one round.
    for i in team_ids() {
        for j in team_ids() {
            if i != j {
                constraints.push(sum(round_ids().map(|r| x[&(i, j, r)])).eq(1.0));
            }
        }
    }

    // A team without an opponent has a bye, and plays at most once per round.
    for r in round_ids() {
        for i in team_ids() {
            let games = sum(team_ids().map(|j| x[&(i, j, r)]));
            constraints.push((games.clone() + y[&(i, r)]).eq(1.0));
            constraints.push(games.leq(1.0));
        }
    }

    // Team k can only meet j in round r after every opponent it wants before j.
    for k in team_ids() {
        for i in team_ids() {
            for j in team_ids() {
                if !precedence.get(k, i, j) {
                    continue;
                }
                for r in round_ids().skip(1) {
                    let mut earlier = sum((1..r).map(|rr| x[&(k, i, rr)]));
                    earlier.add_mul(-1.0, x[&(k, j, r)]);
                    constraints.push(earlier.geq(0.0));
                }
            }
        }
    }

    // Round one only holds opponents that come first in the team's sequence:
    // N * (1 - x[k,j,1]) >= #predecessors(k, j).
    for k in team_ids() {
        for j in team_ids() {
            let before = precedence.predecessors(k, j);
            if before > 0 {
                let mut lhs = Expression::default();
                lhs.add_mul(num_teams as f64, x[&(k, j, 1)]);
                constraints.push(lhs.leq((num_teams - before) as f64));
            }
        }
    }

    // A bye in round r-1 is either followed by a match in r or counted as consecutive.
    for ((i, r), m_var) in m.iter() {
        let mut expr = Expression::from(y[&(*i, *r - 1)]);
        expr.add_mul(-1.0, *m_var);
        expr.add_mul(-1.0, y[&(*i, *r)]);
        constraints.push(expr.leq(0.0));
    }

    debug!(
        "{:?} model with {} rounds: {} variables, {} constraints",
        formulation,
        num_rounds,
        x.len() + y.len() + m.len(),
        constraints.len()
    );

    let mut problem = problem.using(default_solver);
    if let Some(seconds) = config.solver_time_limit() {
        problem = problem.with_time_limit(seconds);
    }
    for c in constraints {
        problem = problem.with(c);
    }

    let solution = match problem.solve() {
        Ok(solution) => solution,
        Err(ResolutionError::Infeasible) => {
            debug!("Infeasible with {} rounds.", num_rounds);
            return None;
        }
        Err(e) => {
            // Also reached when the time limit passes before any solution is found.
            warn!("No solution with {} rounds: {}", num_rounds, e);
            return None;
        }
    };

    let mut schedule = Schedule::new(num_teams, num_rounds);
    for i in team_ids() {
        for r in round_ids() {
            if solution.value(y[&(i, r)]) > 0.5 {
                continue;
            }
            let opponent = team_ids().find(|j| solution.value(x[&(i, *j, r)]) > 0.5);
            let assignment = opponent.map_or(Assignment::Bye, Assignment::Opponent);
            schedule.set(i, r, assignment);
        }
    }
    Some(schedule)
}
