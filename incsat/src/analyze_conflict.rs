//! Learns a new clause by analyzing a conflict.
use std::mem::swap;

use partial_ref::{partial, PartialRef};

use incsat_formula::{Lit, Var};

use crate::clause::{ClauseAlloc, ClauseRef};
use crate::context::{parts::*, Context};
use crate::prop::{Conflict, Reason};

/// Temporaries for conflict analysis
#[derive(Default)]
pub struct AnalyzeConflict {
    /// This is the learned clause after analysis finishes.
    clause: Vec<Lit>,
    /// Number of literals in the current clause at the current level.
    current_level_count: usize,
    /// Variables in the current clause.
    var_flags: Vec<bool>,
    /// Entries to clean in `var_flags`.
    to_clean: Vec<Var>,
    /// Clauses that were resolved during analysis.
    involved: Vec<ClauseRef>,
}

impl AnalyzeConflict {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_flags.resize(count, false);
    }

    /// The learned clause.
    pub fn clause(&self) -> &[Lit] {
        &self.clause
    }

    /// Clauses that took part in deriving the learned clause.
    pub fn involved(&self) -> &[ClauseRef] {
        &self.involved
    }
}

/// Learns a new clause by analyzing a conflict.
///
/// The learned clause is the first unique implication point clause with the asserted literal in
/// position 0. Literals implied by other literals of the clause are removed. Every variable seen
/// during analysis is bumped.
///
/// Returns the lowest decision level that makes the learned clause asserting. A conflict on level
/// 0 produces the empty clause.
pub fn analyze_conflict(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut VsidsP,
        ClauseAllocP,
        ImplGraphP,
        TrailP,
    ),
    conflict: Conflict,
) -> usize {
    let (alloc, mut ctx) = ctx.split_part(ClauseAllocP);

    {
        let analyze = ctx.part_mut(AnalyzeConflictP);

        analyze.clause.clear();
        analyze.involved.clear();
        analyze.current_level_count = 0;
    }

    let current_level = ctx.part(TrailP).current_level();

    if current_level == 0 {
        return 0;
    }

    ctx.part_mut(AnalyzeConflictP).involved.push(conflict.0);

    for &lit in conflict.lits(alloc) {
        add_literal(ctx.borrow(), lit, current_level);
    }

    // Resolving with the reasons in reverse chronological order removes all but one literal of
    // the current level.
    let (trail, mut ctx) = ctx.split_part(TrailP);

    for &lit in trail.trail().iter().rev() {
        let analyze = ctx.part_mut(AnalyzeConflictP);
        let lit_present = &mut analyze.var_flags[lit.index()];
        if *lit_present {
            *lit_present = false;
            analyze.current_level_count -= 1;
            if analyze.current_level_count == 0 {
                // The last literal of the current level, the clause asserts its negation.
                analyze.clause.push(!lit);
                let end = analyze.clause.len() - 1;
                analyze.clause.swap(0, end);

                break;
            } else {
                let reason = *ctx.part(ImplGraphP).reason(lit.var());

                if let Reason::Clause(cref) = reason {
                    ctx.part_mut(AnalyzeConflictP).involved.push(cref);
                }

                for &lit in reason.lits(alloc) {
                    add_literal(ctx.borrow(), lit, current_level);
                }
            }
        }
    }

    minimize_clause(ctx.borrow(), alloc);

    let (analyze, ctx) = ctx.split_part_mut(AnalyzeConflictP);

    for var in analyze.to_clean.drain(..) {
        analyze.var_flags[var.index()] = false;
    }

    // The highest level literal besides the asserted literal goes into position 1, which keeps the
    // watchlist invariant after backtracking.
    let mut backtrack_to = 0;

    if analyze.clause.len() > 1 {
        let impl_graph = ctx.part(ImplGraphP);
        let (prefix, rest) = analyze.clause.split_at_mut(2);
        let lit_1 = &mut prefix[1];
        backtrack_to = impl_graph.level(lit_1.var());
        for lit in rest.iter_mut() {
            let lit_level = impl_graph.level(lit.var());
            if lit_level > backtrack_to {
                backtrack_to = lit_level;
                swap(lit_1, lit);
            }
        }
    }

    backtrack_to
}

/// Add a literal to the current clause.
fn add_literal(
    mut ctx: partial!(Context, mut AnalyzeConflictP, mut VsidsP, ImplGraphP),
    lit: Lit,
    current_level: usize,
) {
    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let lit_level = ctx.part(ImplGraphP).level(lit.var());
    // Literals set on level 0 or already present are skipped
    if lit_level > 0 && !analyze.var_flags[lit.index()] {
        ctx.part_mut(VsidsP).bump(lit.var());
        analyze.var_flags[lit.index()] = true;
        if lit_level == current_level {
            analyze.current_level_count += 1;
        } else {
            analyze.clause.push(lit);
            analyze.to_clean.push(lit.var());
        }
    }
}

/// Remove literals whose reason only contains other literals of the clause.
///
/// Needs `var_flags` set for all literals of the clause except the asserted one.
fn minimize_clause(
    mut ctx: partial!(Context, mut AnalyzeConflictP, ImplGraphP),
    alloc: &ClauseAlloc,
) {
    let (analyze, ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let impl_graph = ctx.part(ImplGraphP);

    let var_flags = &analyze.var_flags;
    let clause = &mut analyze.clause;

    let mut kept = 1;

    for index in 1..clause.len() {
        let lit = clause[index];
        let redundant = match impl_graph.reason(lit.var()) {
            Reason::Unit => false,
            reason => reason.lits(alloc).iter().all(|reason_lit| {
                var_flags[reason_lit.index()] || impl_graph.level(reason_lit.var()) == 0
            }),
        };
        if !redundant {
            clause[kept] = lit;
            kept += 1;
        }
    }

    clause.truncate(kept);
}
