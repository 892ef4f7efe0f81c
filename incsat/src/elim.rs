//! Subsumption and bounded variable elimination.
//!
//! Both work on occurrence lists of the irredundant clauses, which are only built for the duration
//! of a simplification pass. Eliminating a variable replaces all clauses containing it by their
//! pairwise resolvents. The clauses of the smaller side are kept as a witness, which is used to
//! extend models of the remaining formula to the eliminated variables.
use log::info;

use partial_ref::{partial, PartialRef};

use incsat_formula::{Lit, Var};

use crate::clause::{collect_garbage, db, ClauseHeader, ClauseRef, Tier};
use crate::context::{parts::*, Context};
use crate::prop::{enqueue_assignment, propagate, Reason};
use crate::simplify::simplify;
use crate::state::SatState;

mod subsume;

/// Clauses removed by eliminating a variable.
struct Witness {
    /// The eliminated variable's literal present in each of the clauses.
    lit: Lit,
    /// Clauses with `lit` in position 0.
    clauses: Vec<Vec<Lit>>,
}

/// Occurrence lists and the elimination witnesses.
#[derive(Default)]
pub struct Eliminator {
    /// Irredundant clauses containing a literal, indexed by literal code.
    ///
    /// May contain deleted clauses.
    occurrences: Vec<Vec<ClauseRef>>,
    witnesses: Vec<Witness>,
    turned_off: bool,
}

impl Eliminator {
    /// Whether variable elimination was turned off.
    pub fn turned_off(&self) -> bool {
        self.turned_off
    }

    /// Disable all future variable elimination.
    pub fn turn_off(&mut self) {
        self.turned_off = true;
    }

    /// Number of eliminated variables.
    pub fn eliminated_count(&self) -> usize {
        self.witnesses.len()
    }

    /// Extend a model of the current formula to the eliminated variables.
    ///
    /// Witnesses are replayed in reverse order of elimination. Each eliminated variable is set so
    /// that its literal in the witness clauses is false, unless one of those clauses would be
    /// unsatisfied.
    pub fn extend_model(&self, model: &mut [Option<bool>]) {
        let lit_is_true = |model: &[Option<bool>], lit: Lit| {
            model[lit.index()] == Some(lit.is_positive())
        };

        for witness in self.witnesses.iter().rev() {
            let var = witness.lit.var();
            model[var.index()] = Some(witness.lit.is_negative());

            let unsatisfied = witness
                .clauses
                .iter()
                .any(|clause| !clause[1..].iter().any(|&lit| lit_is_true(model, lit)));

            if unsatisfied {
                model[var.index()] = Some(witness.lit.is_positive());
            }
        }
    }

    fn occurrences(&self, lit: Lit) -> &[ClauseRef] {
        &self.occurrences[lit.code()]
    }

    fn add_occurrences(&mut self, cref: ClauseRef, lits: &[Lit]) {
        for &lit in lits {
            self.occurrences[lit.code()].push(cref);
        }
    }

    fn clear_occurrences(&mut self) {
        self.occurrences.clear();
    }
}

/// Subsumption, strengthening and, if requested and not turned off, variable elimination.
///
/// Must be called on decision level 0.
pub fn simplify_formula(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ElimP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VariablesP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
    eliminate: bool,
) {
    if !level_0_cleanup(ctx.borrow()) {
        return;
    }

    build_occurrences(ctx.borrow());
    let (subsumed, strengthened) = subsume::subsume_clauses(ctx.borrow());

    info!(
        "subsumption: removed {} clauses, strengthened {} clauses",
        subsumed, strengthened
    );

    if level_0_cleanup(ctx.borrow()) && eliminate && !ctx.part(ElimP).turned_off() {
        build_occurrences(ctx.borrow());

        let eliminated = eliminate_vars(ctx.borrow());
        remove_learned_with_eliminated(ctx.borrow());

        info!(
            "elimination: eliminated {} variables, {} in total",
            eliminated,
            ctx.part(ElimP).eliminated_count()
        );

        level_0_cleanup(ctx.borrow());
    }

    ctx.part_mut(ElimP).clear_occurrences();
}

/// Propagate, then remove satisfied clauses and false literals.
///
/// Returns `false` if the formula is unsatisfiable.
fn level_0_cleanup(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> bool {
    if ctx.part(SolverStateP).sat_state == SatState::Unsat {
        return false;
    }

    debug_assert_eq!(ctx.part(TrailP).current_level(), 0);

    if propagate(ctx.borrow()).is_err() {
        ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
        return false;
    }

    if !ctx.part(TrailP).trail().is_empty() {
        simplify(ctx.borrow());
    }
    collect_garbage(ctx.borrow());

    true
}

/// Build occurrence lists for all irredundant clauses.
///
/// Clauses are modified while the occurrence lists are in use, so watchlists are disabled.
fn build_occurrences(
    mut ctx: partial!(
        Context,
        mut ElimP,
        mut WatchlistsP,
        ClauseAllocP,
        ClauseDbP,
        VariablesP,
    ),
) {
    ctx.part_mut(WatchlistsP).disable();

    let (elim, mut ctx) = ctx.split_part_mut(ElimP);

    elim.occurrences.clear();
    elim.occurrences
        .resize(ctx.part(VariablesP).var_count() * 2, vec![]);

    let (alloc, mut ctx) = ctx.split_part(ClauseAllocP);

    for cref in db::clauses_iter(&ctx.borrow()) {
        let clause = alloc.clause(cref);
        if clause.header().tier() == Tier::Irred {
            elim.add_occurrences(cref, clause.lits());
        }
    }
}

/// Add a clause derived during simplification.
///
/// Satisfied clauses are dropped, false literals are removed and unit clauses are enqueued.
fn add_derived_clause(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ElimP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lits: &mut Vec<Lit>,
) {
    let assignment = ctx.part(AssignmentP);
    if lits.iter().any(|&lit| assignment.lit_is_true(lit)) {
        return;
    }
    lits.retain(|&lit| !assignment.lit_is_false(lit));

    match lits[..] {
        [] => ctx.part_mut(SolverStateP).sat_state = SatState::Unsat,
        [lit] => enqueue_assignment(ctx.borrow(), lit, Reason::Unit),
        _ => {
            let mut header = ClauseHeader::new();
            header.set_tier(Tier::Irred);
            let cref = db::add_clause(ctx.borrow(), header, lits);
            ctx.part_mut(ElimP).add_occurrences(cref, lits);
        }
    }
}

/// Compute the resolvent of two clauses on a variable.
///
/// Returns `false` for tautological resolvents. Uses `flags`, indexed by literal code, which are
/// left cleared.
fn resolve(flags: &mut [bool], resolvent: &mut Vec<Lit>, a: &[Lit], b: &[Lit], var: Var) -> bool {
    resolvent.clear();
    for &lit in a {
        if lit.var() != var {
            flags[lit.code()] = true;
            resolvent.push(lit);
        }
    }

    let mut tautology = false;

    for &lit in b {
        if lit.var() == var || flags[lit.code()] {
            continue;
        }
        if flags[(!lit).code()] {
            tautology = true;
            break;
        }
        resolvent.push(lit);
    }

    for &lit in a {
        flags[lit.code()] = false;
    }

    !tautology
}

/// Try to eliminate all candidate variables.
///
/// Returns the number of eliminated variables.
fn eliminate_vars(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ElimP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VariablesP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
) -> usize {
    let mut candidates: Vec<Var> = {
        let variables = ctx.part(VariablesP);
        let assignment = ctx.part(AssignmentP);
        (0..variables.var_count())
            .map(Var::from_index)
            .filter(|&var| {
                let data = variables.var_data(var);
                !data.frozen && !data.eliminated && assignment.var_value(var).is_none()
            })
            .collect()
    };

    {
        let elim = ctx.part(ElimP);
        candidates.sort_by_key(|&var| {
            elim.occurrences(var.positive()).len() + elim.occurrences(var.negative()).len()
        });
    }

    let mut eliminated = 0;

    for var in candidates {
        if ctx.part(SolverStateP).sat_state == SatState::Unsat {
            break;
        }
        if ctx.part(AssignmentP).var_value(var).is_some() {
            continue;
        }
        if try_eliminate_var(ctx.borrow(), var) {
            eliminated += 1;
        }
    }

    eliminated
}

/// Eliminate a variable unless this would grow the formula too much.
fn try_eliminate_var(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ElimP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VariablesP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
    var: Var,
) -> bool {
    let (config, mut ctx) = ctx.split_part(SolverConfigP);

    let (pos, neg) = {
        let (elim, ctx) = ctx.split_part_mut(ElimP);
        let alloc = ctx.part(ClauseAllocP);
        for &lit in [var.positive(), var.negative()].iter() {
            elim.occurrences[lit.code()].retain(|&cref| !alloc.header(cref).deleted());
        }
        (
            elim.occurrences(var.positive()).to_vec(),
            elim.occurrences(var.negative()).to_vec(),
        )
    };

    let occurrence_count = pos.len() + neg.len();

    if occurrence_count == 0 || occurrence_count > config.elim_occurrence_limit {
        return false;
    }

    let resolvent_limit = occurrence_count + config.elim_grow_limit;

    let mut resolvents: Vec<Vec<Lit>> = vec![];

    {
        let (tmp, ctx) = ctx.split_part_mut(TmpDataP);
        let alloc = ctx.part(ClauseAllocP);

        for &pos_cref in pos.iter() {
            for &neg_cref in neg.iter() {
                let pos_lits = alloc.clause(pos_cref).lits();
                let neg_lits = alloc.clause(neg_cref).lits();
                if resolve(&mut tmp.flags, &mut tmp.lits, pos_lits, neg_lits, var) {
                    if tmp.lits.len() > config.elim_resolvent_limit
                        || resolvents.len() == resolvent_limit
                    {
                        return false;
                    }
                    resolvents.push(tmp.lits.clone());
                }
            }
        }
    }

    let (kept, kept_lit) = if pos.len() <= neg.len() {
        (&pos, var.positive())
    } else {
        (&neg, var.negative())
    };

    let witness_clauses = kept
        .iter()
        .map(|&cref| {
            let mut clause = vec![kept_lit];
            let lits = ctx.part(ClauseAllocP).clause(cref).lits();
            clause.extend(lits.iter().cloned().filter(|&lit| lit != kept_lit));
            clause
        })
        .collect();

    ctx.part_mut(ElimP).witnesses.push(Witness {
        lit: kept_lit,
        clauses: witness_clauses,
    });

    for cref in pos.iter().chain(neg.iter()) {
        db::delete_clause(ctx.borrow(), *cref);
    }

    for mut resolvent in resolvents {
        add_derived_clause(ctx.borrow(), &mut resolvent);
    }

    ctx.part_mut(VariablesP).var_data_mut(var).eliminated = true;
    ctx.part_mut(VsidsP).set_enabled(var, false);

    true
}

/// Delete learned clauses that contain eliminated variables.
fn remove_learned_with_eliminated(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, VariablesP),
) {
    let to_delete: Vec<ClauseRef> = {
        let (alloc, mut ctx) = ctx.split_part(ClauseAllocP);
        let (variables, mut ctx) = ctx.split_part(VariablesP);
        db::clauses_iter(&ctx.borrow())
            .filter(|&cref| {
                let clause = alloc.clause(cref);
                clause.header().learned()
                    && clause
                        .lits()
                        .iter()
                        .any(|lit| variables.var_data(lit.var()).eliminated)
            })
            .collect()
    };

    for cref in to_delete {
        db::delete_clause(ctx.borrow(), cref);
    }
}
