use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::error::PriorityError;
use crate::priority::TeamPriority;
use crate::TeamId;

/// An unordered match between two teams, stored as `(min, max)`.
pub type Pair = (TeamId, TeamId);

pub fn canonical_pair(a: TeamId, b: TeamId) -> Pair {
    (a.min(b), a.max(b))
}

/// Directed graph over all matches. An edge `p -> q` means some team wants to play `p` before
/// `q`. The graph is acyclic iff the priorities can be honoured with enough rounds.
#[derive(Debug, Clone)]
pub struct PrecedenceGraph {
    num_teams: usize,
    graph: DiGraphMap<Pair, ()>,
}

impl PrecedenceGraph {
    pub fn from_team_priority(team_priority: &TeamPriority) -> Self {
        Self::build(team_priority.num_teams(), team_priority.edges())
    }

    /// Edge endpoints may be given in either orientation. Every endpoint must be two distinct
    /// teams in `1..=num_teams`.
    pub fn from_edges(
        num_teams: usize,
        edges: impl IntoIterator<Item = (Pair, Pair)>,
    ) -> Result<Self, PriorityError> {
        if num_teams < 2 {
            return Err(PriorityError::TooFewTeams(num_teams));
        }
        let edges = edges.into_iter().collect::<Vec<_>>();
        let team_ids = 1..=num_teams;
        let valid = |(a, b): Pair| a != b && team_ids.contains(&a) && team_ids.contains(&b);
        for (p, q) in edges.iter().copied() {
            if let Some((a, b)) = [p, q].iter().copied().find(|pair| !valid(*pair)) {
                return Err(PriorityError::InvalidMatch(a, b));
            }
        }
        Ok(Self::build(num_teams, edges))
    }

    fn build(num_teams: usize, edges: impl IntoIterator<Item = (Pair, Pair)>) -> Self {
        let mut graph = DiGraphMap::new();
        // Every match is a node, including those no edge touches.
        for team_i in 1..num_teams {
            for team_j in (team_i + 1)..=num_teams {
                graph.add_node((team_i, team_j));
            }
        }
        for ((a, b), (c, d)) in edges {
            graph.add_edge(canonical_pair(a, b), canonical_pair(c, d), ());
        }
        PrecedenceGraph { num_teams, graph }
    }

    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_edge(&self, from: Pair, to: Pair) -> bool {
        self.graph.contains_edge(from, to)
    }

    pub fn in_degree(&self, pair: Pair) -> usize {
        self.graph.neighbors_directed(pair, Direction::Incoming).count()
    }

    /// A topological order of the matches, or `None` when the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<Pair>> {
        toposort(&self.graph, None).ok()
    }

    pub fn has_cycle(&self) -> bool {
        self.topological_order().is_none()
    }

    /// Remove and return every match that currently has no predecessor.
    ///
    /// In-degrees are read before anything is removed, so a match freed by this call waits for
    /// the next one. Each team has at most one match in a layer because a team's matches form a
    /// chain in the graph.
    pub fn pop_layer(&mut self) -> Vec<Pair> {
        let layer = self
            .graph
            .nodes()
            .filter(|pair| self.in_degree(*pair) == 0)
            .collect::<Vec<_>>();
        for pair in layer.iter() {
            self.graph.remove_node(*pair);
        }
        layer
    }
}
