use std::collections::BTreeMap;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::PriorityError;
use crate::graph::{canonical_pair, Pair};
use crate::TeamId;

/// The order in which every team wants to meet its opponents.
///
/// Teams are numbered `1..=N` and the sequence of team `t` is a permutation of all other team
/// ids. Construction validates this, so every other part of the crate can index freely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamPriority {
    sequences: Vec<Vec<TeamId>>,
}

impl TeamPriority {
    /// Build from a map `team -> opponents in preferred order`.
    pub fn new(priorities: BTreeMap<TeamId, Vec<TeamId>>) -> Result<Self, PriorityError> {
        let num_teams = priorities.len();
        if let Some(team) = priorities.keys().copied().find(|t| *t < 1 || *t > num_teams) {
            return Err(PriorityError::TeamOutOfRange { team, num_teams });
        }
        // Keys are unique and inside 1..=N, so the map's order is the team order.
        Self::from_sequences(priorities.into_iter().map(|(_, seq)| seq).collect())
    }

    /// Build from sequences where `sequences[t - 1]` belongs to team `t`.
    pub fn from_sequences(sequences: Vec<Vec<TeamId>>) -> Result<Self, PriorityError> {
        let num_teams = sequences.len();
        if num_teams < 2 {
            return Err(PriorityError::TooFewTeams(num_teams));
        }

        for (idx, seq) in sequences.iter().enumerate() {
            let team = idx + 1;
            let mut seen = vec![false; num_teams + 1];
            for opponent in seq.iter().copied() {
                if opponent == team {
                    return Err(PriorityError::SelfOpponent(team));
                }
                if opponent < 1 || opponent > num_teams {
                    return Err(PriorityError::UnknownOpponent { team, opponent });
                }
                if seen[opponent] {
                    return Err(PriorityError::RepeatedOpponent { team, opponent });
                }
                seen[opponent] = true;
            }
            if seq.len() != num_teams - 1 {
                return Err(PriorityError::WrongLength {
                    team,
                    found: seq.len(),
                    expected: num_teams - 1,
                });
            }
        }

        Ok(TeamPriority { sequences })
    }

    pub fn num_teams(&self) -> usize {
        self.sequences.len()
    }

    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> {
        1..=self.sequences.len()
    }

    /// Opponents of `team` in preferred order.
    pub fn sequence(&self, team: TeamId) -> &[TeamId] {
        &self.sequences[team - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TeamId, &[TeamId])> + '_ {
        self.sequences
            .iter()
            .enumerate()
            .map(|(idx, seq)| (idx + 1, seq.as_slice()))
    }

    /// Precedence edges between matches: for every team, each match points to the team's next
    /// match in its sequence.
    ///
    /// For `{1: (2, 3), 2: (1, 3), 3: (1, 2)}` this is
    /// `[((1,2),(1,3)), ((1,2),(2,3)), ((1,3),(2,3))]`.
    pub fn edges(&self) -> Vec<(Pair, Pair)> {
        self.iter()
            .flat_map(|(team, seq)| {
                seq.iter()
                    .tuple_windows()
                    .map(move |(pred, succ)| (canonical_pair(team, *pred), canonical_pair(team, *succ)))
            })
            .collect()
    }
}

/// Every team priority for `num_teams` teams where teams `1..=num_fixed` keep the ascending
/// order of their opponents and the remaining teams range over all permutations.
///
/// `generate_team_priorities(3, 0)` yields the 8 instances with three teams.
pub fn generate_team_priorities(
    num_teams: usize,
    num_fixed: usize,
) -> Result<Vec<TeamPriority>, PriorityError> {
    if num_fixed > num_teams {
        return Err(PriorityError::TooManyFixed {
            num_fixed,
            num_teams,
        });
    }
    if num_teams < 2 {
        return Err(PriorityError::TooFewTeams(num_teams));
    }

    let opponents = |team: TeamId| (1..=num_teams).filter(move |t| *t != team);
    let fixed = (1..=num_fixed)
        .map(|team| opponents(team).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    if num_fixed == num_teams {
        return Ok(vec![TeamPriority::from_sequences(fixed)?]);
    }

    let free = ((num_fixed + 1)..=num_teams)
        .map(|team| opponents(team).permutations(num_teams - 1).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    free.into_iter()
        .multi_cartesian_product()
        .map(|choice| {
            let sequences = fixed.iter().cloned().chain(choice).collect();
            TeamPriority::from_sequences(sequences)
        })
        .collect()
}

/// A uniformly random team priority.
pub fn random_team_priority<R: Rng + ?Sized>(
    num_teams: usize,
    rng: &mut R,
) -> Result<TeamPriority, PriorityError> {
    let sequences = (1..=num_teams)
        .map(|team| {
            let mut seq = (1..=num_teams).filter(|t| *t != team).collect::<Vec<_>>();
            seq.shuffle(rng);
            seq
        })
        .collect();
    TeamPriority::from_sequences(sequences)
}
