use log::*;

use crate::algorithm::ByesAlgorithm;
use crate::graph::PrecedenceGraph;
use crate::priority::TeamPriority;
use crate::schedule::{Schedule, SolveState};

/// Greedy schedule from the precedence graph.
///
/// A cycle makes the instance infeasible. Otherwise every round plays all matches whose
/// predecessors are done, and teams left without a match get a bye. The result is a feasible
/// schedule, not necessarily one with the fewest byes.
#[derive(Debug, Clone)]
pub struct TopologicalSortSolver {
    graph: PrecedenceGraph,
    state: SolveState,
}

impl TopologicalSortSolver {
    pub fn from_team_priority(team_priority: &TeamPriority) -> Self {
        Self::from_graph(PrecedenceGraph::from_team_priority(team_priority))
    }

    pub fn from_graph(graph: PrecedenceGraph) -> Self {
        TopologicalSortSolver {
            graph,
            state: SolveState::Loaded,
        }
    }
}

impl ByesAlgorithm for TopologicalSortSolver {
    fn solve(&mut self) {
        if self.state != SolveState::Loaded {
            return;
        }
        if self.graph.has_cycle() {
            info!("Precedence graph has a cycle, instance is infeasible.");
            self.state = SolveState::Infeasible;
            return;
        }

        let mut graph = self.graph.clone();
        let mut schedule = Schedule::new(graph.num_teams(), 0);
        while !graph.is_empty() {
            let round = schedule.push_round();
            let layer = graph.pop_layer();
            debug!("round {}: {:?}", round, layer);
            for (team_i, team_j) in layer {
                schedule.set_match(round, team_i, team_j);
            }
        }

        info!(
            "Layered schedule with {} rounds and {} byes.",
            schedule.num_rounds(),
            schedule.num_byes()
        );
        self.state = SolveState::Optimal(schedule);
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
    use crate::priority::generate_team_priorities;
    use crate::schedule::Status;

    fn solved(tp: &TeamPriority) -> TopologicalSortSolver {
        let mut solver = TopologicalSortSolver::from_team_priority(tp);
        solver.solve();
        solver
    }

    #[test]
    fn reads_before_solve_fail() {
        let solver = TopologicalSortSolver::from_team_priority(&fixtures::five_rounds());
        assert_eq!(solver.status(), Status::Loaded);
        assert_eq!(solver.schedule(), Err(ScheduleError::NotSolved));
        assert_eq!(solver.num_rounds(), Err(ScheduleError::NotSolved));
    }

    #[test]
    fn known_instances() {
        let solver = solved(&fixtures::five_rounds());
        assert_eq!(solver.status(), Status::Optimal);
        assert_eq!(solver.num_rounds(), Ok(5));
        assert_eq!(solver.num_byes(), Ok(8));

        let solver = solved(&fixtures::six_rounds());
        assert_eq!(solver.num_rounds(), Ok(6));
        assert_eq!(solver.num_byes(), Ok(12));

        let solver = solved(&fixtures::three_rounds());
        assert_eq!(solver.num_rounds(), Ok(3));
        assert_eq!(solver.num_byes(), Ok(0));
        assert_eq!(solver.byes_per_team(), Ok(vec![(1, 0), (2, 0), (3, 0), (4, 0)]));
    }

    #[test]
    fn cycle_is_infeasible() {
        let solver = solved(&fixtures::cyclic());
        assert_eq!(solver.status(), Status::Infeasible);
        assert_eq!(solver.schedule(), Err(ScheduleError::Infeasible));
        assert_eq!(solver.num_byes(), Err(ScheduleError::Infeasible));
    }

    #[test]
    fn feasible_schedules_are_valid() {
        for tp in generate_team_priorities(4, 2).unwrap() {
            let solver = solved(&tp);
            let cyclic = PrecedenceGraph::from_team_priority(&tp).has_cycle();
            match solver.schedule() {
                Ok(schedule) => {
                    assert!(!cyclic);
                    assert!(schedule.verify());
                    assert!(schedule.respects(&tp));
                    assert!(schedule.num_rounds() >= 3 && schedule.num_rounds() <= 6);
                }
                Err(e) => {
                    assert!(cyclic);
                    assert_eq!(e, ScheduleError::Infeasible);
                }
            }
        }
    }

    #[test]
    fn solves_a_graph_built_from_edges() {
        let tp = fixtures::five_rounds();
        let graph = PrecedenceGraph::from_edges(tp.num_teams(), tp.edges()).unwrap();
        let mut solver = TopologicalSortSolver::from_graph(graph);
        solver.solve();
        assert_eq!(solver.num_rounds(), Ok(5));
        assert!(solver.schedule().unwrap().respects(&tp));
    }

    #[test]
    fn solve_runs_once() {
        let mut solver = TopologicalSortSolver::from_team_priority(&fixtures::five_rounds());
        solver.solve();
        let first = solver.schedule().unwrap().clone();
        solver.solve();
        assert_eq!(solver.schedule(), Ok(&first));
    }
}
