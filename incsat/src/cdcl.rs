//! Conflict driven clause learning.
//!
//! A search step propagates and decides until propagation fails, analyzes the conflict, stores
//! the learned clause and backtracks to the level where that clause asserts its first literal.
use log::trace;

use partial_ref::{partial, PartialRef};

use crate::analyze_conflict::analyze_conflict;
use crate::clause::{
    assess_learned_clause, bump_clause, collect_garbage, db, decay_clause_activities,
};
use crate::context::{parts::*, Context};
use crate::decision::make_decision;
use crate::prop::{backtrack, enable_watchlists, enqueue_assignment, propagate, Conflict, Reason};
use crate::simplify::simplify;
use crate::state::SatState;

/// Result of a conflict free search.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SearchOutcome {
    /// All decision variables are assigned without conflict.
    Sat,
    /// The decision budget is exhausted.
    Interrupted,
}

/// Search until the next conflict and learn from it.
///
/// Sets the satisfiability state when the search ends with a model or the empty clause, and the
/// interrupted flag when the decision budget runs out first.
pub fn conflict_step(
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
        VariablesP,
    ),
) {
    match find_conflict(ctx.borrow()) {
        Ok(SearchOutcome::Sat) => ctx.part_mut(SolverStateP).sat_state = SatState::Sat,
        Ok(SearchOutcome::Interrupted) => ctx.part_mut(SolverStateP).interrupted = true,
        Err(conflict) => {
            ctx.part_mut(ScheduleP).count_conflict();
            learn_from(ctx.borrow(), conflict);
        }
    }
}

/// Analyze a conflict, backtrack and assert the learned clause.
fn learn_from(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
    ),
    conflict: Conflict,
) {
    let conflict_level = ctx.part(TrailP).current_level();
    let backtrack_to = analyze_conflict(ctx.borrow(), conflict);

    let (analyze, mut ctx) = ctx.split_part(AnalyzeConflictP);
    let learned = analyze.clause();

    trace!(
        "conflict on level {}: learned {:?}, backtracking to {}",
        conflict_level,
        learned,
        backtrack_to
    );

    analyze
        .involved()
        .iter()
        .for_each(|&cref| bump_clause(ctx.borrow(), cref));
    decay_clause_activities(ctx.borrow());
    ctx.part_mut(VsidsP).decay();

    backtrack(ctx.borrow(), backtrack_to);

    let (&asserted, rest) = match learned.split_first() {
        Some(split) => split,
        None => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
            return;
        }
    };

    let reason = if rest.is_empty() {
        Reason::Unit
    } else {
        let header = assess_learned_clause(ctx.borrow(), learned);
        Reason::Clause(db::add_clause(ctx.borrow(), header, learned))
    };

    enqueue_assignment(ctx.borrow(), asserted, reason);
}

/// Propagate and decide until a conflict is found.
///
/// Returns `Err` with the conflict, or `Ok` when all decision variables are assigned or the
/// decision budget ran out.
pub fn find_conflict(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut ScheduleP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        VariablesP,
    ),
) -> Result<SearchOutcome, Conflict> {
    loop {
        propagate(ctx.borrow())?;

        if ctx.part(TrailP).current_level() == 0 {
            level_0_maintenance(ctx.borrow());
        }

        if ctx.part(ScheduleP).decision_budget_exhausted() {
            return Ok(SearchOutcome::Interrupted);
        }

        if !make_decision(ctx.borrow()) {
            return Ok(SearchOutcome::Sat);
        }

        ctx.part_mut(ScheduleP).count_decision();
    }
}

/// Turn new level 0 assignments into facts and reclaim clause storage.
///
/// Requires a fully propagated trail without decisions. Leaves the watchlists enabled.
fn level_0_maintenance(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchlistsP,
        AssignmentP,
    ),
) {
    if !ctx.part(TrailP).trail().is_empty() {
        simplify(ctx.borrow());
    }
    collect_garbage(ctx.borrow());
    enable_watchlists(ctx.borrow());
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use partial_ref::IntoPartialRefMut;

    use incsat_formula::{
        cnf_formula, gen::pigeon_hole, lit, lits,
        test::{sat_formula, sgen_unsat_formula},
        CnfFormula,
    };

    use crate::load::load_clause;
    use crate::variables::ensure_var_count;

    fn load_formula(
        mut ctx: partial!(
            Context,
            mut AnalyzeConflictP,
            mut AssignmentP,
            mut ClauseAllocP,
            mut ClauseDbP,
            mut ImplGraphP,
            mut SolverStateP,
            mut TmpDataP,
            mut TrailP,
            mut VariablesP,
            mut VsidsP,
            mut WatchlistsP,
        ),
        formula: &CnfFormula,
    ) {
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    #[test]
    fn learned_unit_becomes_a_fact() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        load_formula(ctx.borrow(), &cnf_formula![1, 2; 1, -2;]);

        // Deciding -1 propagates both 2 and -2
        conflict_step(ctx.borrow());

        assert_eq!(ctx.part(ScheduleP).conflicts(), 1);
        assert_eq!(ctx.part(TrailP).current_level(), 0);
        assert_eq!(ctx.part(TrailP).trail(), &lits![1]);
        assert_eq!(ctx.part(ImplGraphP).reason(lit!(1).var()), &Reason::Unit);

        conflict_step(ctx.borrow());

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Sat);
        assert_eq!(ctx.part(ScheduleP).conflicts(), 1);
        // Both clauses were satisfied by the fact and their storage was reclaimed
        assert_eq!(ctx.part(ClauseDbP).count(), 0);
        assert_eq!(ctx.part(ClauseAllocP).buffer_size(), 0);
        assert!(ctx.part(WatchlistsP).enabled());
    }

    #[test]
    fn conflict_at_level_0_is_unsat() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        load_formula(
            ctx.borrow(),
            &cnf_formula![
                -1, 2;
                -2, 3;
                -1, -3;
                1, 4;
                1, -4;
            ],
        );

        while ctx.part(SolverStateP).sat_state == SatState::Unknown {
            conflict_step(ctx.borrow());
        }

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
        assert!(!ctx.part(SolverStateP).interrupted);
    }

    #[test]
    fn decision_budget_ends_search() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        load_formula(ctx.borrow(), &pigeon_hole(4));

        ctx.part_mut(ScheduleP).set_decision_limit(Some(2));
        ctx.part_mut(ScheduleP).start_search();

        // Two negative decisions cannot falsify any clause
        assert_eq!(find_conflict(ctx.borrow()), Ok(SearchOutcome::Interrupted));
        assert_eq!(ctx.part(TrailP).current_level(), 2);
        assert_eq!(ctx.part(ScheduleP).decisions(), 2);

        conflict_step(ctx.borrow());

        assert!(ctx.part(SolverStateP).interrupted);
        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);
        assert_eq!(ctx.part(ScheduleP).decisions(), 2);
    }

    proptest! {
        #[test]
        fn unsat_needs_conflicts(formula in sgen_unsat_formula(1..7usize)) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            load_formula(ctx.borrow(), &formula);

            while ctx.part(SolverStateP).sat_state == SatState::Unknown {
                conflict_step(ctx.borrow());
            }

            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
            prop_assert!(ctx.part(ScheduleP).conflicts() > 0);
        }

        #[test]
        fn search_ends_with_a_model(
            formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0),
        ) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            load_formula(ctx.borrow(), &formula);

            while ctx.part(SolverStateP).sat_state == SatState::Unknown {
                conflict_step(ctx.borrow());
            }

            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Sat);

            let assignment = ctx.part(AssignmentP);
            prop_assert!(formula.is_satisfied_by(|lit| assignment.lit_is_true(lit)));
        }
    }
}
