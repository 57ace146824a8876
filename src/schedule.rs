use std::fmt;

use log::*;

use crate::error::ScheduleError;
use crate::priority::TeamPriority;
use crate::{RoundId, TeamId};

/// What a team does in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assignment {
    Opponent(TeamId),
    Bye,
}

impl Assignment {
    pub fn opponent(self) -> Option<TeamId> {
        match self {
            Assignment::Opponent(t) => Some(t),
            Assignment::Bye => None,
        }
    }

    pub fn is_bye(self) -> bool {
        self == Assignment::Bye
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignment::Opponent(t) => write!(f, "{}", t),
            Assignment::Bye => write!(f, "b"),
        }
    }
}

/// Per team, per round: the opponent or a bye. Teams are `1..=N`, rounds `1..=R`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    teams: Vec<Vec<Assignment>>,
}

impl Schedule {
    /// A schedule of `num_rounds` rounds where every team has a bye everywhere.
    pub fn new(num_teams: usize, num_rounds: usize) -> Self {
        Schedule {
            teams: vec![vec![Assignment::Bye; num_rounds]; num_teams],
        }
    }

    pub fn num_teams(&self) -> usize {
        self.teams.len()
    }

    pub fn num_rounds(&self) -> usize {
        self.teams.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Append a round in which every team has a bye and return its number.
    pub fn push_round(&mut self) -> RoundId {
        for rounds in self.teams.iter_mut() {
            rounds.push(Assignment::Bye);
        }
        self.num_rounds()
    }

    pub fn get(&self, team: TeamId, round: RoundId) -> Assignment {
        self.teams[team - 1][round - 1]
    }

    pub fn set(&mut self, team: TeamId, round: RoundId, assignment: Assignment) {
        self.teams[team - 1][round - 1] = assignment;
    }

    /// Record that `a` and `b` meet in `round`.
    pub fn set_match(&mut self, round: RoundId, a: TeamId, b: TeamId) {
        self.set(a, round, Assignment::Opponent(b));
        self.set(b, round, Assignment::Opponent(a));
    }

    /// Rounds of `team`, index `r - 1` is round `r`.
    pub fn team(&self, team: TeamId) -> &[Assignment] {
        &self.teams[team - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TeamId, &[Assignment])> + '_ {
        self.teams
            .iter()
            .enumerate()
            .map(|(idx, rounds)| (idx + 1, rounds.as_slice()))
    }

    pub fn byes_per_team(&self) -> Vec<(TeamId, usize)> {
        self.iter()
            .map(|(team, rounds)| (team, rounds.iter().filter(|a| a.is_bye()).count()))
            .collect()
    }

    pub fn num_byes(&self) -> usize {
        self.byes_per_team().iter().map(|(_, n)| n).sum()
    }

    /// Opponents of `team` in the order they are played.
    pub fn opponents(&self, team: TeamId) -> Vec<TeamId> {
        self.team(team).iter().filter_map(|a| a.opponent()).collect()
    }

    /// Checks that every round is symmetric and every pair of teams meets exactly once.
    pub fn verify(&self) -> bool {
        let num_teams = self.num_teams();
        for (team, rounds) in self.iter() {
            for (idx, assignment) in rounds.iter().enumerate() {
                let round = idx + 1;
                if let Assignment::Opponent(other) = *assignment {
                    if other == team || other < 1 || other > num_teams {
                        debug!("in round r{}, t{} plays invalid team {}", round, team, other);
                        return false;
                    }
                    if self.get(other, round) != Assignment::Opponent(team) {
                        debug!("in round r{}, t{} plays t{} but not the other way", round, team, other);
                        return false;
                    }
                }
            }

            for other in 1..=num_teams {
                if other == team {
                    continue;
                }
                let meetings = rounds
                    .iter()
                    .filter(|a| **a == Assignment::Opponent(other))
                    .count();
                if meetings != 1 {
                    debug!("t{} meets t{} {} times", team, other, meetings);
                    return false;
                }
            }
        }
        true
    }

    /// Checks that every team meets its opponents in the order of its priority.
    pub fn respects(&self, team_priority: &TeamPriority) -> bool {
        team_priority.num_teams() == self.num_teams()
            && team_priority
                .iter()
                .all(|(team, seq)| self.opponents(team) == seq)
    }
}

/// Lifecycle of a solver: nothing to read until `solve()` has reached a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Loaded,
    Optimal,
    Infeasible,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Loaded => "LOADED",
            Status::Optimal => "OPTIMAL",
            Status::Infeasible => "INFEASIBLE",
        };
        write!(f, "{}", s)
    }
}

/// The result held by a solver. Only `Optimal` carries a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveState {
    Loaded,
    Optimal(Schedule),
    Infeasible,
}

impl Default for SolveState {
    fn default() -> Self {
        SolveState::Loaded
    }
}

impl SolveState {
    pub fn status(&self) -> Status {
        match self {
            SolveState::Loaded => Status::Loaded,
            SolveState::Optimal(_) => Status::Optimal,
            SolveState::Infeasible => Status::Infeasible,
        }
    }

    pub fn schedule(&self) -> Result<&Schedule, ScheduleError> {
        match self {
            SolveState::Loaded => Err(ScheduleError::NotSolved),
            SolveState::Optimal(schedule) => Ok(schedule),
            SolveState::Infeasible => Err(ScheduleError::Infeasible),
        }
    }
}

/// Team-by-round table followed by the bye count.
pub fn format_schedule(schedule: &Schedule) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    write!(&mut out, "{:>5} ", "").unwrap();
    for round in 1..=schedule.num_rounds() {
        write!(&mut out, " {:^5} ", format!("r{}", round)).unwrap();
    }
    writeln!(&mut out).unwrap();
    for (team, rounds) in schedule.iter() {
        write!(&mut out, "{:>5} ", format!("t{}", team)).unwrap();
        for assignment in rounds.iter() {
            write!(&mut out, " {:^5} ", assignment.to_string()).unwrap();
        }
        writeln!(&mut out).unwrap();
    }
    writeln!(&mut out, "byes: {}", schedule.num_byes()).unwrap();
    out
}

pub fn format_schedule_xml(instance_name: &str, schedule: &Schedule) -> Result<String, fmt::Error> {
    use std::fmt::Write;
    let mut out = String::new();

    writeln!(&mut out, "<Solution>")?;
    writeln!(&mut out, "  <MetaData>")?;
    writeln!(&mut out, "    <InstanceName>{}</InstanceName>", instance_name)?;
    writeln!(
        &mut out,
        "    <ObjectiveValue rounds=\"{}\" byes=\"{}\" />",
        schedule.num_rounds(),
        schedule.num_byes()
    )?;
    writeln!(&mut out, "  </MetaData>")?;
    writeln!(&mut out, "  <Games>")?;

    for round in 1..=schedule.num_rounds() {
        for team in 1..=schedule.num_teams() {
            match schedule.get(team, round) {
                Assignment::Opponent(other) if team < other => {
                    writeln!(
                        &mut out,
                        "    <ScheduledMatch team1=\"{}\" team2=\"{}\" round=\"{}\" />",
                        team, other, round
                    )?;
                }
                Assignment::Opponent(_) => {}
                Assignment::Bye => {
                    writeln!(&mut out, "    <Bye team=\"{}\" round=\"{}\" />", team, round)?;
                }
            }
        }
    }

    writeln!(&mut out, "  </Games>")?;
    writeln!(&mut out, "</Solution>")?;

    Ok(out)
}
