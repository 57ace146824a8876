use crate::error::ScheduleError;
use crate::schedule::{Schedule, SolveState, Status};
use crate::TeamId;

/// Common surface of the scheduling algorithms.
///
/// Implementors only provide `solve` and access to their [`SolveState`]; the readers are shared.
pub trait ByesAlgorithm {
    /// Run the algorithm. Leaves the state `Optimal` or `Infeasible`.
    fn solve(&mut self);

    fn state(&self) -> &SolveState;

    fn status(&self) -> Status {
        self.state().status()
    }

    fn schedule(&self) -> Result<&Schedule, ScheduleError> {
        self.state().schedule()
    }

    fn num_rounds(&self) -> Result<usize, ScheduleError> {
        Ok(self.schedule()?.num_rounds())
    }

    fn num_byes(&self) -> Result<usize, ScheduleError> {
        Ok(self.schedule()?.num_byes())
    }

    fn byes_per_team(&self) -> Result<Vec<(TeamId, usize)>, ScheduleError> {
        Ok(self.schedule()?.byes_per_team())
    }
}
