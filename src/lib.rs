//! Round-robin scheduling under per-team opponent priorities.
//!
//! Every team states the order in which it wants to face its opponents. The crate finds the
//! smallest number of rounds in which all `N(N-1)/2` matches can be played while every team
//! meets its opponents in that order, inserting byes where a team cannot play.
//!
//! Two algorithms are provided:
//!  - [`TopologicalSortSolver`] peels the precedence graph layer by layer. Fast, and a cycle in
//!    the graph proves the instance infeasible.
//!  - [`IterateRoundsSolver`] solves a binary integer program for `R = N-1, N, ...` and adopts
//!    the first feasible `R`, minimising byes for that `R`.

pub mod algorithm;
pub mod error;
#[cfg(test)]
mod fixtures;
pub mod graph;
pub mod ilp;
pub mod instance;
pub mod layering;
pub mod precedence;
pub mod priority;
pub mod schedule;
pub mod search;

pub type TeamId = usize;
pub type RoundId = usize;

pub use algorithm::ByesAlgorithm;
pub use error::{InstanceError, PriorityError, ScheduleError, SolveError};
pub use graph::{canonical_pair, Pair, PrecedenceGraph};
pub use ilp::{FixedRoundsProblem, Formulation, IlpConfig};
pub use layering::TopologicalSortSolver;
pub use precedence::PrecedenceArray;
pub use priority::{generate_team_priorities, random_team_priority, TeamPriority};
pub use schedule::{Assignment, Schedule, SolveState, Status};
pub use search::{IterateRoundsSolver, RoundBound, SearchConfig};
