use std::str::FromStr;
use std::sync::Arc;

use log::*;

use crate::algorithm::ByesAlgorithm;
use crate::graph::PrecedenceGraph;
use crate::ilp::{spawn_solve, IlpConfig};
use crate::precedence::PrecedenceArray;
use crate::priority::TeamPriority;
use crate::schedule::{SolveState, Status};
use crate::RoundId;

/// Largest number of rounds the search tries before declaring the instance infeasible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundBound {
    /// `N(N-1)/2`, one match per round. Any acyclic instance fits.
    Pairs,
    /// `2N-1`.
    TwiceTeams,
}

impl RoundBound {
    pub fn max_rounds(self, num_teams: usize) -> usize {
        match self {
            RoundBound::Pairs => num_teams * (num_teams - 1) / 2,
            RoundBound::TwiceTeams => 2 * num_teams - 1,
        }
    }
}

impl Default for RoundBound {
    fn default() -> Self {
        RoundBound::Pairs
    }
}

impl FromStr for RoundBound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pairs" => Ok(RoundBound::Pairs),
            "twice-teams" => Ok(RoundBound::TwiceTeams),
            _ => Err(format!("unknown round bound {:?}, expected pairs or twice-teams", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub ilp: IlpConfig,
    pub round_bound: RoundBound,
    /// Reject instances with a cyclic precedence graph before building any program.
    pub cycle_precheck: bool,
    /// Number of consecutive round counts solved at the same time.
    pub window: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            ilp: IlpConfig::default(),
            round_bound: RoundBound::default(),
            cycle_precheck: true,
            window: 1,
        }
    }
}

/// Solves the integer program for `R = N-1, N, ...` and keeps the first feasible `R`.
///
/// The schedule found has the fewest possible rounds, and the fewest byes among schedules with
/// that many rounds. An attempt that runs out of time counts as infeasible, so a hard but
/// feasible instance can be reported infeasible. `solve()` returns only after every solver
/// thread it started has finished.
#[derive(Debug)]
pub struct IterateRoundsSolver {
    precedence: Arc<PrecedenceArray>,
    graph: PrecedenceGraph,
    config: SearchConfig,
    attempts: Vec<(RoundId, Status)>,
    alive: Arc<()>,
    state: SolveState,
}

impl IterateRoundsSolver {
    pub fn from_team_priority(team_priority: &TeamPriority, config: SearchConfig) -> Self {
        IterateRoundsSolver {
            precedence: Arc::new(PrecedenceArray::from_team_priority(team_priority)),
            graph: PrecedenceGraph::from_team_priority(team_priority),
            config,
            attempts: Vec::new(),
            alive: Arc::new(()),
            state: SolveState::Loaded,
        }
    }

    pub fn num_teams(&self) -> usize {
        self.precedence.num_teams()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Every round count tried so far with its outcome, in increasing order.
    pub fn attempts(&self) -> &[(RoundId, Status)] {
        &self.attempts
    }

    /// Solver threads started by this search that have not returned yet.
    pub fn running_workers(&self) -> usize {
        Arc::strong_count(&self.alive) - 1
    }
}

impl ByesAlgorithm for IterateRoundsSolver {
    fn solve(&mut self) {
        if self.state != SolveState::Loaded {
            return;
        }

        let num_teams = self.num_teams();
        let max_rounds = self.config.round_bound.max_rounds(num_teams);
        let window = self.config.window.max(1);

        if self.config.cycle_precheck && self.graph.has_cycle() {
            info!("Precedence graph has a cycle, instance is infeasible.");
            self.state = SolveState::Infeasible;
            return;
        }

        let mut num_rounds = num_teams - 1;
        while num_rounds <= max_rounds {
            let last = num_rounds.saturating_add(window - 1).min(max_rounds);
            if last == num_rounds {
                info!("num_rounds = {}", num_rounds);
            } else {
                info!("num_rounds = {}..={}", num_rounds, last);
            }

            let pending = (num_rounds..=last)
                .map(|r| {
                    spawn_solve(r, self.precedence.clone(), self.config.ilp, self.alive.clone())
                })
                .collect::<Vec<_>>();

            // Wait in increasing order so the first success is the smallest feasible count.
            // Every worker is joined, including those after the first success.
            let mut found = None;
            for (r, pending) in (num_rounds..=last).zip(pending) {
                let result = pending.and_then(|p| p.wait());
                if found.is_some() {
                    continue;
                }
                match result {
                    Ok(Some(schedule)) => {
                        info!(
                            "Feasible with {} rounds and {} byes.",
                            r,
                            schedule.num_byes()
                        );
                        self.attempts.push((r, Status::Optimal));
                        found = Some(schedule);
                    }
                    Ok(None) => {
                        debug!("Infeasible with {} rounds.", r);
                        self.attempts.push((r, Status::Infeasible));
                    }
                    Err(e) => {
                        warn!("{}", e);
                        self.attempts.push((r, Status::Infeasible));
                    }
                }
            }

            if let Some(schedule) = found {
                self.state = SolveState::Optimal(schedule);
                return;
            }
            if last == max_rounds {
                break;
            }
            num_rounds = last + 1;
        }

        info!("No feasible schedule with at most {} rounds.", max_rounds);
        self.state = SolveState::Infeasible;
    }

    fn state(&self) -> &SolveState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScheduleError;
    use crate::fixtures;
    use crate::ilp::Formulation;
    use crate::layering::TopologicalSortSolver;
    use crate::priority::{generate_team_priorities, random_team_priority};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn solved(tp: &TeamPriority, config: SearchConfig) -> IterateRoundsSolver {
        let mut solver = IterateRoundsSolver::from_team_priority(tp, config);
        solver.solve();
        solver
    }

    #[test]
    fn reads_before_solve_fail() {
        let solver =
            IterateRoundsSolver::from_team_priority(&fixtures::cyclic(), SearchConfig::default());
        assert_eq!(solver.status(), Status::Loaded);
        assert_eq!(solver.schedule(), Err(ScheduleError::NotSolved));
        assert_eq!(solver.num_byes(), Err(ScheduleError::NotSolved));
    }

    #[test]
    fn finds_minimum_rounds() {
        let solver = solved(&fixtures::five_rounds(), SearchConfig::default());
        assert_eq!(solver.status(), Status::Optimal);
        assert_eq!(solver.num_rounds(), Ok(5));
        assert_eq!(solver.num_byes(), Ok(8));
        assert_eq!(
            solver.attempts(),
            &[(3, Status::Infeasible), (4, Status::Infeasible), (5, Status::Optimal)]
        );

        let solver = solved(&fixtures::six_rounds(), SearchConfig::default());
        assert_eq!(solver.num_rounds(), Ok(6));
        assert_eq!(solver.num_byes(), Ok(12));

        let solver = solved(&fixtures::three_rounds(), SearchConfig::default());
        assert_eq!(solver.num_rounds(), Ok(3));
        assert_eq!(solver.num_byes(), Ok(0));
        assert_eq!(solver.attempts(), &[(3, Status::Optimal)]);
    }

    #[test]
    fn cycle_is_rejected_up_front() {
        let solver = solved(&fixtures::cyclic(), SearchConfig::default());
        assert_eq!(solver.status(), Status::Infeasible);
        assert_eq!(solver.schedule(), Err(ScheduleError::Infeasible));
        assert!(solver.attempts().is_empty());
    }

    #[test]
    fn cycle_without_precheck_exhausts_the_bound() {
        let config = SearchConfig {
            cycle_precheck: false,
            window: 4,
            ..SearchConfig::default()
        };
        let solver = solved(&fixtures::cyclic(), config);
        assert_eq!(solver.status(), Status::Infeasible);
        let tried = solver.attempts().iter().map(|(r, _)| *r).collect::<Vec<_>>();
        assert_eq!(tried, vec![3, 4, 5, 6]);
    }

    #[test]
    fn window_keeps_the_smallest_feasible_count() {
        let config = SearchConfig {
            window: 3,
            ..SearchConfig::default()
        };
        let solver = solved(&fixtures::six_rounds(), config);
        assert_eq!(solver.num_rounds(), Ok(6));
        assert_eq!(solver.num_byes(), Ok(12));
    }

    #[test]
    fn huge_window_covers_the_whole_bound() {
        let config = SearchConfig {
            window: usize::MAX,
            ..SearchConfig::default()
        };
        let solver = solved(&fixtures::three_rounds(), config);
        assert_eq!(solver.num_rounds(), Ok(3));
        assert_eq!(solver.attempts(), &[(3, Status::Optimal)]);

        let config = SearchConfig {
            window: usize::MAX,
            cycle_precheck: false,
            ..SearchConfig::default()
        };
        let solver = solved(&fixtures::cyclic(), config);
        assert_eq!(solver.status(), Status::Infeasible);
        assert_eq!(solver.attempts().len(), 4);
    }

    #[test]
    fn larger_counts_are_joined_after_success() {
        let config = SearchConfig {
            window: 4,
            ..SearchConfig::default()
        };
        let solver = solved(&fixtures::five_rounds(), config);
        assert_eq!(solver.num_rounds(), Ok(5));
        assert_eq!(solver.running_workers(), 0);

        let solver = solved(&fixtures::three_rounds(), config);
        assert_eq!(solver.attempts(), &[(3, Status::Optimal)]);
        assert_eq!(solver.running_workers(), 0);
    }

    #[test]
    fn unbounded_time_limit() {
        let config = SearchConfig {
            ilp: IlpConfig {
                time_limit: Duration::MAX,
                ..IlpConfig::default()
            },
            ..SearchConfig::default()
        };
        let solver = solved(&fixtures::five_rounds(), config);
        assert_eq!(solver.num_rounds(), Ok(5));
        assert_eq!(solver.num_byes(), Ok(8));
    }

    #[test]
    fn twice_teams_bound() {
        assert_eq!(RoundBound::TwiceTeams.max_rounds(4), 7);
        assert_eq!(RoundBound::Pairs.max_rounds(4), 6);
        assert_eq!("twice-teams".parse(), Ok(RoundBound::TwiceTeams));

        let config = SearchConfig {
            round_bound: RoundBound::TwiceTeams,
            ..SearchConfig::default()
        };
        assert_eq!(solved(&fixtures::five_rounds(), config).num_rounds(), Ok(5));

        let exhaustive = SearchConfig {
            round_bound: RoundBound::TwiceTeams,
            cycle_precheck: false,
            ..SearchConfig::default()
        };
        // The cycle (1,2) -> (1,3) -> (2,3) -> (1,2) fits in no number of rounds.
        let three_teams = fixtures::priority(&[&[2, 3], &[3, 1], &[1, 2]]);
        let solver = solved(&three_teams, exhaustive);
        assert_eq!(solver.status(), Status::Infeasible);
        assert_eq!(solver.attempts().len(), 4);
    }

    #[test]
    fn consecutive_byes_search() {
        let config = SearchConfig {
            ilp: IlpConfig {
                formulation: Formulation::MinimizeConsecutiveByes,
                ..IlpConfig::default()
            },
            ..SearchConfig::default()
        };
        let tp = fixtures::five_rounds();
        let solver = solved(&tp, config);
        assert_eq!(solver.num_rounds(), Ok(5));
        assert!(solver.schedule().unwrap().respects(&tp));
    }

    fn check_consistency(tp: &TeamPriority, config: SearchConfig) {
        let mut layering = TopologicalSortSolver::from_team_priority(tp);
        layering.solve();
        let search = solved(tp, config);

        match layering.num_rounds() {
            Ok(layered_rounds) => {
                let rounds = search.num_rounds().unwrap();
                assert!(rounds <= layered_rounds);
                let schedule = search.schedule().unwrap();
                assert!(schedule.verify());
                assert!(schedule.respects(tp));
                assert_eq!(schedule.num_byes(), tp.num_teams() * (rounds + 1 - tp.num_teams()));
            }
            Err(_) => assert_eq!(search.status(), Status::Infeasible),
        }
        if search.status() == Status::Infeasible {
            assert!(PrecedenceGraph::from_team_priority(tp).has_cycle());
        }
    }

    #[test]
    fn agrees_with_layering_on_three_teams() {
        let config = SearchConfig {
            cycle_precheck: false,
            ..SearchConfig::default()
        };
        for tp in generate_team_priorities(3, 0).unwrap() {
            check_consistency(&tp, config);
        }
    }

    #[test]
    fn agrees_with_layering_on_random_four_teams() {
        let mut rng = StdRng::seed_from_u64(2021);
        for _ in 0..6 {
            let tp = random_team_priority(4, &mut rng).unwrap();
            check_consistency(&tp, SearchConfig::default());
        }
    }
}
