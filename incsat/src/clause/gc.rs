//! Reclaiming the storage of deleted clauses.
use log::debug;

use partial_ref::{partial, PartialRef};

use crate::context::{parts::*, Context};

/// Compact the clause storage once at least half of it belongs to deleted or shortened clauses.
///
/// Only called on level 0 right after [`simplify`](crate::simplify::simplify). At that point every
/// assignment is a fact without a reason clause, so the clause database holds the only references
/// that need updating. Watchlists are disabled and rebuilt on the next propagation. Occurrence
/// lists built before this call are invalid afterwards.
pub fn collect_garbage(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut WatchlistsP,
        TrailP,
    ),
) {
    let trail = ctx.part(TrailP);
    debug_assert!(trail.current_level() == 0 && trail.trail().is_empty());

    let (db, mut ctx) = ctx.split_part_mut(ClauseDbP);
    let alloc = ctx.part_mut(ClauseAllocP);

    if db.garbage_size * 2 <= alloc.buffer_size() {
        return;
    }

    let freed = alloc.compact(&mut db.clauses);

    debug!(
        "garbage collection: {} of {} words freed",
        freed,
        freed + alloc.buffer_size()
    );

    for tier_list in db.by_tier.iter_mut() {
        tier_list.clear();
    }
    for &cref in db.clauses.iter() {
        db.by_tier[alloc.header(cref).tier() as usize].push(cref);
    }
    db.garbage_size = 0;

    ctx.part_mut(WatchlistsP).disable();
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;
    use proptest::*;

    use incsat_formula::{cnf::strategy::*, cnf_formula, Lit};

    use crate::clause::{db, ClauseHeader, Tier};
    use crate::context::set_var_count;

    #[test]
    fn little_garbage_is_kept() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let formula = cnf_formula![
            1, 2, 3;
            -1, 2, 4;
            1, -3, -4;
        ];

        set_var_count(ctx.borrow(), formula.var_count());

        let crefs: Vec<_> = formula
            .iter()
            .map(|lits| db::add_clause(ctx.borrow(), ClauseHeader::new(), lits))
            .collect();

        db::delete_clause(ctx.borrow(), crefs[1]);
        let size = ctx.part(ClauseAllocP).buffer_size();

        collect_garbage(ctx.borrow());

        assert_eq!(ctx.part(ClauseAllocP).buffer_size(), size);
        assert!(ctx.part(WatchlistsP).enabled());
        assert_eq!(ctx.part(ClauseDbP).count(), 2);
    }

    proptest! {
        #[test]
        fn deleted_clauses_are_reclaimed(
            kept in cnf_formula(2..100usize, 10..300, 2..10),
            deleted in cnf_formula(2..100usize, 300..600, 10..30),
        ) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), kept.var_count().max(deleted.var_count()));

            let mut to_delete = vec![];

            // Interleaved so kept clauses have to move
            for (index, lits) in deleted.iter().enumerate() {
                let mut header = ClauseHeader::new();
                header.set_tier(Tier::Local);
                to_delete.push(db::add_clause(ctx.borrow(), header, lits));

                if let Some(lits) = kept.iter().nth(index) {
                    let mut header = ClauseHeader::new();
                    header.set_tier(Tier::Irred);
                    db::add_clause(ctx.borrow(), header, lits);
                }
            }

            for cref in to_delete {
                db::delete_clause(ctx.borrow(), cref);
            }

            let old_size = ctx.part(ClauseAllocP).buffer_size();

            collect_garbage(ctx.borrow());

            prop_assert!(ctx.part(ClauseAllocP).buffer_size() < old_size);
            prop_assert_eq!(ctx.part(ClauseDbP).garbage_size, 0);
            prop_assert!(!ctx.part(WatchlistsP).enabled());
            prop_assert_eq!(ctx.part(ClauseDbP).count_by_tier(Tier::Local), 0);

            let db = ctx.part(ClauseDbP);
            prop_assert_eq!(&db.by_tier[Tier::Irred as usize], &db.clauses);
            prop_assert!(db.by_tier[Tier::Local as usize].is_empty());

            let remaining: Vec<Vec<Lit>> = db
                .clauses
                .iter()
                .map(|&cref| ctx.part(ClauseAllocP).clause(cref).lits().to_vec())
                .collect();
            let expected: Vec<Vec<Lit>> = kept
                .iter()
                .take(deleted.len())
                .map(|lits| lits.to_vec())
                .collect();

            prop_assert_eq!(remaining, expected);
        }
    }
}
