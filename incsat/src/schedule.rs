//! Scheduling of restarts, clause database reductions and search budgets.
use log::{debug, trace};

use partial_ref::{partial, PartialRef};

use crate::cdcl::conflict_step;
use crate::clause::{reduce_locals, reduce_mids};
use crate::context::{parts::*, Context};
use crate::prop::restart;
use crate::state::SatState;

mod luby;

use luby::LubySequence;

/// Scheduling of restarts, clause database reductions and search budgets.
///
/// The conflict and decision counters are kept across solve calls, the budgets apply to a single
/// call.
#[derive(Default)]
pub struct Schedule {
    conflicts: u64,
    decisions: u64,
    restarts: u64,
    next_restart: u64,
    luby: LubySequence,
    conflict_limit: Option<u64>,
    decision_limit: Option<u64>,
    search_conflicts: u64,
    search_decisions: u64,
}

impl Schedule {
    /// Total number of conflicts.
    pub fn conflicts(&self) -> u64 {
        self.conflicts
    }

    /// Total number of decisions.
    pub fn decisions(&self) -> u64 {
        self.decisions
    }

    /// Total number of restarts.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Limit the number of conflicts per solve call.
    pub fn set_conflict_limit(&mut self, limit: Option<u64>) {
        self.conflict_limit = limit;
    }

    /// Limit the number of decisions per solve call.
    pub fn set_decision_limit(&mut self, limit: Option<u64>) {
        self.decision_limit = limit;
    }

    /// Reset the budgets for a new solve call.
    pub fn start_search(&mut self) {
        self.search_conflicts = 0;
        self.search_decisions = 0;
    }

    /// Count a decision against the budget.
    pub fn count_decision(&mut self) {
        self.decisions += 1;
        self.search_decisions += 1;
    }

    /// Count a conflict against the budget.
    pub fn count_conflict(&mut self) {
        self.conflicts += 1;
        self.search_conflicts += 1;
    }

    /// Whether another decision would exceed the decision budget.
    pub fn decision_budget_exhausted(&self) -> bool {
        self.decision_limit
            .map_or(false, |limit| self.search_decisions >= limit)
    }

    /// Whether another conflict would exceed the conflict budget.
    pub fn conflict_budget_exhausted(&self) -> bool {
        self.conflict_limit
            .map_or(false, |limit| self.search_conflicts >= limit)
    }
}

/// Perform one step of the schedule.
///
/// Returns `false` when the search is finished or interrupted.
pub fn schedule_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut ScheduleP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
        VariablesP,
    ),
) -> bool {
    let state = ctx.part(SolverStateP);
    if state.sat_state != SatState::Unknown || state.interrupted {
        return false;
    }

    if ctx.part(ScheduleP).conflict_budget_exhausted() {
        debug!("conflict budget exhausted");
        ctx.part_mut(SolverStateP).interrupted = true;
        return false;
    }

    let (config, mut ctx) = ctx.split_part(SolverConfigP);

    let schedule = ctx.part_mut(ScheduleP);
    let conflicts = schedule.conflicts;

    if schedule.next_restart == conflicts {
        // The sequence is infinite
        let interval = schedule.luby.next().unwrap_or(1);
        schedule.next_restart += config.luby_restart_interval_scale * interval;
        if conflicts > 0 {
            schedule.restarts += 1;
            trace!("restart {} after {} conflicts", schedule.restarts, conflicts);
        }
        restart(ctx.borrow());
    }

    if conflicts > 0 && conflicts % config.reduce_locals_interval == 0 {
        reduce_locals(ctx.borrow());
    }
    if conflicts > 0 && conflicts % config.reduce_mids_interval == 0 {
        reduce_mids(ctx.borrow());
    }

    conflict_step(ctx.borrow());

    true
}
