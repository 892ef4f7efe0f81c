//! Loading clauses into the solver.
use partial_ref::{partial, PartialRef};

use incsat_formula::Lit;

use crate::clause::{db, ClauseHeader, Tier};
use crate::context::{parts::*, Context};
use crate::prop::{enqueue_assignment, full_restart, Reason};
use crate::state::SatState;

/// Adds a clause to the current formula.
///
/// Removes duplicated and false literals, ignores tautological and satisfied clauses and handles
/// empty and unit clauses. The clause is not propagated.
pub fn load_clause(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
    ),
    lits: &[Lit],
) {
    if ctx.part(SolverStateP).sat_state == SatState::Unsat {
        return;
    }

    // Any new clause can invalidate the current assignment
    full_restart(ctx.borrow());

    let (tmp_data, mut ctx) = ctx.split_part_mut(TmpDataP);

    let clause = &mut tmp_data.lits;
    clause.clear();
    clause.extend_from_slice(lits);

    clause.sort_unstable();
    clause.dedup();

    // Complementary literals are adjacent after sorting
    if clause.windows(2).any(|pair| pair[0] == !pair[1]) {
        return;
    }

    let assignment = ctx.part(AssignmentP);

    if clause.iter().any(|&lit| assignment.lit_is_true(lit)) {
        return;
    }

    clause.retain(|&lit| !assignment.lit_is_false(lit));

    match clause[..] {
        [] => ctx.part_mut(SolverStateP).sat_state = SatState::Unsat,
        [lit] => enqueue_assignment(ctx.borrow(), lit, Reason::Unit),
        _ => {
            let mut header = ClauseHeader::new();
            header.set_tier(Tier::Irred);

            db::add_clause(ctx.borrow(), header, clause);
        }
    }
}
