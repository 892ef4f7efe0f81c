//! Simplification using unit clauses.

use partial_ref::{partial, PartialRef};

use crate::clause::db::filter_clauses;
use crate::context::{parts::*, Context};
use crate::prop::Reason;

/// Remove satisfied clauses and false literals.
///
/// Must be called on level 0 after full propagation. Afterwards all level 0 assignments are facts
/// without a reason clause and the trail is empty.
pub fn simplify(
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
    assert_eq!(ctx.part(TrailP).current_level(), 0);
    assert!(ctx.part(TrailP).fully_propagated());

    let (impl_graph, mut ctx) = ctx.split_part_mut(ImplGraphP);
    for &lit in ctx.part(TrailP).trail().iter() {
        impl_graph.update_reason(lit.var(), Reason::Unit)
    }

    ctx.part_mut(TrailP).clear();

    let (assignment, mut ctx) = ctx.split_part(AssignmentP);

    let mut new_lits = vec![];

    filter_clauses(ctx.borrow(), |alloc, cref| {
        let clause = alloc.clause_mut(cref);
        new_lits.clear();
        for &lit in clause.lits() {
            match assignment.lit_value(lit) {
                None => new_lits.push(lit),
                Some(true) => return false,
                Some(false) => (),
            }
        }
        // After full propagation an empty clause would have been a conflict and a unit clause
        // would be satisfied.
        debug_assert!(new_lits.len() >= 2);
        clause.lits_mut()[..new_lits.len()].copy_from_slice(&new_lits);
        clause.header_mut().set_len(new_lits.len());
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use incsat_formula::{cnf_formula, lit, lits};

    use crate::clause::{db, ClauseHeader};
    use crate::context::set_var_count;
    use crate::prop::{enqueue_assignment, propagate};

    #[test]
    fn removes_satisfied_clauses_and_false_lits() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let clauses = cnf_formula![
            1, 2, 3;
            -1, 4, 5, 6;
            -4, 7;
        ];

        set_var_count(ctx.borrow(), clauses.var_count());

        for clause in clauses.iter() {
            db::add_clause(ctx.borrow(), ClauseHeader::new(), clause);
        }

        enqueue_assignment(ctx.borrow(), lit!(1), Reason::Unit);
        enqueue_assignment(ctx.borrow(), lit!(-5), Reason::Unit);
        assert_eq!(propagate(ctx.borrow()), Ok(()));

        simplify(ctx.borrow());

        assert!(ctx.part(TrailP).trail().is_empty());
        assert_eq!(ctx.part(ClauseDbP).count(), 2);

        let crefs: Vec<_> = db::clauses_iter(&ctx.borrow()).collect();
        let mut remaining: Vec<Vec<_>> = crefs
            .iter()
            .map(|&cref| {
                let mut lits = ctx.part(ClauseAllocP).clause(cref).lits().to_vec();
                lits.sort();
                lits
            })
            .collect();
        remaining.sort();

        assert_eq!(remaining, vec![lits![4, 6].to_vec(), lits![-4, 7].to_vec()]);

        // Watches are rebuilt on the next propagation
        assert!(!ctx.part(WatchlistsP).enabled());
        assert_eq!(propagate(ctx.borrow()), Ok(()));
        assert!(ctx.part(WatchlistsP).enabled());
    }
}
