//! Clause assessment.
use partial_ref::{partial, PartialRef};

use incsat_formula::Lit;

use crate::context::{parts::*, Context};
use crate::glue::compute_glue;

use super::{bump_clause_activity, db, ClauseHeader, ClauseRef, Tier};

/// Assess the newly learned clause and generate a clause header.
pub fn assess_learned_clause(
    mut ctx: partial!(Context, mut TmpDataP, ImplGraphP),
    lits: &[Lit],
) -> ClauseHeader {
    // Called while the clause is still in conflict, so the glue level is one higher than it will
    // be once the clause is asserting.
    let glue = compute_glue(ctx.borrow(), lits).saturating_sub(1);

    let mut header = ClauseHeader::new();

    header.set_glue(glue);
    header.set_tier(select_tier(glue));

    header
}

/// Compute the tier for a learned clause with a given glue level.
fn select_tier(glue: usize) -> Tier {
    if glue <= 2 {
        Tier::Core
    } else if glue <= 6 {
        Tier::Mid
    } else {
        Tier::Local
    }
}

/// Update activity, glue and tier of a clause involved in a conflict.
pub fn bump_clause(
    mut ctx: partial!(
        Context,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut TmpDataP,
        ImplGraphP,
    ),
    cref: ClauseRef,
) {
    bump_clause_activity(ctx.borrow(), cref);

    let (alloc, mut ctx_2) = ctx.split_part_mut(ClauseAllocP);

    let clause = alloc.clause_mut(cref);

    if !clause.header().learned() {
        return;
    }

    let glue = compute_glue(ctx_2.borrow(), clause.lits());

    clause.header_mut().set_active(true);

    if glue < clause.header().glue() {
        clause.header_mut().set_glue(glue);

        db::set_clause_tier(ctx.borrow(), cref, select_tier(glue));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_by_glue() {
        assert_eq!(select_tier(0), Tier::Core);
        assert_eq!(select_tier(2), Tier::Core);
        assert_eq!(select_tier(3), Tier::Mid);
        assert_eq!(select_tier(6), Tier::Mid);
        assert_eq!(select_tier(7), Tier::Local);
    }
}
