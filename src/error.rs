use thiserror::Error;

use crate::TeamId;

/// Reading a result from a solver that has no schedule to give.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("solve() has not been run yet")]
    NotSolved,
    #[error("infeasible instance")]
    Infeasible,
}

/// A team priority that is not a permutation of the team's opponents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriorityError {
    #[error("at least two teams are required (found {0})")]
    TooFewTeams(usize),
    #[error("team ids must be 1..={num_teams}, found team {team}")]
    TeamOutOfRange { team: TeamId, num_teams: usize },
    #[error("team {team} lists {found} opponents, expected {expected}")]
    WrongLength {
        team: TeamId,
        found: usize,
        expected: usize,
    },
    #[error("team {0} lists itself as an opponent")]
    SelfOpponent(TeamId),
    #[error("team {team} lists unknown opponent {opponent}")]
    UnknownOpponent { team: TeamId, opponent: TeamId },
    #[error("team {team} lists opponent {opponent} more than once")]
    RepeatedOpponent { team: TeamId, opponent: TeamId },
    #[error("({0}, {1}) is not a match between two distinct teams")]
    InvalidMatch(TeamId, TeamId),
    #[error("cannot fix {num_fixed} of {num_teams} teams")]
    TooManyFixed { num_fixed: usize, num_teams: usize },
}

/// The integer-program collaborator could not be run at all.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("could not spawn solver thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("solver thread for {0} rounds terminated without a result")]
    WorkerLost(usize),
}

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("could not read instance: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse instance xml: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("missing element <{0}>")]
    MissingElement(&'static str),
    #[error("element <{element}> is missing attribute \"{attribute}\"")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("invalid team id {0:?}")]
    InvalidTeamId(String),
    #[error("team {0} is defined more than once")]
    DuplicateTeam(TeamId),
    #[error(transparent)]
    Priority(#[from] PriorityError),
}
