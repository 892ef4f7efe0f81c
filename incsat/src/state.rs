//! Miscellaneous solver state.
use crate::solver::SolveResult;

/// Satisfiability state of the current formula.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    Unknown,
    Sat,
    Unsat,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}

/// Miscellaneous solver state.
///
/// Anything larger or any larger group of related state variables should be moved into a separate
/// part of [`Context`](crate::context::Context).
#[derive(Default)]
pub struct SolverState {
    pub sat_state: SatState,
    /// Set when the search stopped because a decision or conflict budget ran out.
    pub interrupted: bool,
    /// Outcome of the most recent solve call, `None` before the first one.
    pub last_result: Option<SolveResult>,
}
