//! Database for clauses.
use std::mem::replace;

use partial_ref::{partial, PartialRef};

use incsat_formula::Lit;

use crate::context::{parts::*, Context};
use crate::prop::Reason;

use super::{header::HEADER_LEN, ClauseAlloc, ClauseHeader, ClauseRef};

/// Partitions of the clause database.
///
/// Learned clauses are partitioned into 3 tiers by their glue level, irredundant clauses form
/// their own tier. This follows Chanseok Oh, ["Between SAT and UNSAT: The Fundamental Difference
/// in CDCL SAT"](https://doi.org/10.1007/978-3-319-24318-4_23), section 4.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Tier {
    Irred = 0,
    Core = 1,
    Mid = 2,
    Local = 3,
}

impl Tier {
    /// Total number of tiers.
    pub const fn count() -> usize {
        4
    }

    /// Cast an index into the corresponding tier.
    pub fn from_index(index: usize) -> Tier {
        match index {
            0 => Tier::Irred,
            1 => Tier::Core,
            2 => Tier::Mid,
            _ => Tier::Local,
        }
    }
}

/// Database for clauses.
///
/// Removal of clauses from the `clauses` and the `by_tier` fields can be delayed. The clause
/// header's deleted and tier fields need to be checked when iterating over these. `by_tier` may
/// also contain duplicate entries.
#[derive(Default)]
pub struct ClauseDb {
    /// May contain deleted clauses, see above
    pub(super) clauses: Vec<ClauseRef>,
    /// May contain deleted and moved clauses, see above
    pub(super) by_tier: [Vec<ClauseRef>; Tier::count()],
    /// These counts should always be up to date
    pub(super) count_by_tier: [usize; Tier::count()],
    /// Size of deleted but not collected clauses
    pub(super) garbage_size: usize,
}

impl ClauseDb {
    /// The number of clauses of a given tier.
    pub fn count_by_tier(&self, tier: Tier) -> usize {
        self.count_by_tier[tier as usize]
    }

    /// The number of non-deleted clauses.
    pub fn count(&self) -> usize {
        self.count_by_tier.iter().sum()
    }

    /// References to all clauses, including deleted ones.
    pub fn clause_refs(&self) -> &[ClauseRef] {
        &self.clauses
    }
}

/// Add a clause to the database and watch it.
///
/// The first two literals are watched, so they need to be suitable for the current assignment.
pub fn add_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, mut WatchlistsP),
    header: ClauseHeader,
    lits: &[Lit],
) -> ClauseRef {
    let tier = header.tier();

    let cref = ctx.part_mut(ClauseAllocP).add_clause(header, lits);

    ctx.part_mut(WatchlistsP).watch_clause(cref, [lits[0], lits[1]]);

    let db = ctx.part_mut(ClauseDbP);

    db.clauses.push(cref);
    db.by_tier[tier as usize].push(cref);
    db.count_by_tier[tier as usize] += 1;

    cref
}

/// Change the tier of a clause.
///
/// This is a noop for a clause already of the specified tier.
pub fn set_clause_tier(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP),
    cref: ClauseRef,
    tier: Tier,
) {
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);
    let db = ctx.part_mut(ClauseDbP);

    let old_tier = alloc.header(cref).tier();
    if old_tier != tier {
        db.count_by_tier[old_tier as usize] -= 1;
        db.count_by_tier[tier as usize] += 1;

        alloc.header_mut(cref).set_tier(tier);
        db.by_tier[tier as usize].push(cref);
    }
}

/// Delete a clause from the database.
///
/// The clause must not be the reason of an assignment.
pub fn delete_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP),
    cref: ClauseRef,
) {
    // Watches of deleted clauses are removed when propagating or rebuilding watchlists.

    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);
    let db = ctx.part_mut(ClauseDbP);

    let header = alloc.header_mut(cref);

    debug_assert!(
        !header.deleted(),
        "delete_clause for already deleted clause"
    );

    header.set_deleted(true);

    db.count_by_tier[header.tier() as usize] -= 1;

    db.garbage_size += header.len() + HEADER_LEN;
}

/// Whether a clause is the reason of a current assignment.
pub fn is_locked(
    ctx: partial!(Context, AssignmentP, ClauseAllocP, ImplGraphP),
    cref: ClauseRef,
) -> bool {
    let lit = ctx.part(ClauseAllocP).clause(cref).lits()[0];
    ctx.part(AssignmentP).lit_is_true(lit)
        && *ctx.part(ImplGraphP).reason(lit.var()) == Reason::Clause(cref)
}

/// Delete a clause unless it is locked.
///
/// Returns whether the clause was deleted.
pub fn try_delete_clause(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        AssignmentP,
        ImplGraphP,
    ),
    cref: ClauseRef,
) -> bool {
    if is_locked(ctx.borrow(), cref) {
        return false;
    }

    delete_clause(ctx.borrow(), cref);
    true
}

/// Iterator over all non-deleted clauses.
pub fn clauses_iter<'a>(
    ctx: &'a partial!('a Context, ClauseAllocP, ClauseDbP),
) -> impl Iterator<Item = ClauseRef> + 'a {
    let alloc = ctx.part(ClauseAllocP);
    ctx.part(ClauseDbP)
        .clauses
        .iter()
        .cloned()
        .filter(move |&cref| !alloc.header(cref).deleted())
}

/// Keep or delete each clause according to a predicate.
///
/// The predicate may modify the clause it is called for, which is why watchlists are disabled
/// and rebuilt on the next propagation. Clauses must keep at least two literals. A clause for
/// which the predicate returns `false` is deleted, so it must not be locked.
pub fn filter_clauses<F>(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, mut WatchlistsP),
    mut filter: F,
) where
    F: FnMut(&mut ClauseAlloc, ClauseRef) -> bool,
{
    ctx.part_mut(WatchlistsP).disable();

    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);
    let db = ctx.part_mut(ClauseDbP);

    let mut deleted = false;

    let mut clauses = replace(&mut db.clauses, vec![]);

    clauses.retain(|&cref| {
        if alloc.header(cref).deleted() {
            return false;
        }

        let old_len = alloc.header(cref).len();

        if filter(alloc, cref) {
            let header = alloc.header(cref);
            debug_assert!(header.len() >= 2);
            db.garbage_size += old_len - header.len();
            true
        } else {
            let header = alloc.header_mut(cref);
            header.set_deleted(true);
            db.count_by_tier[header.tier() as usize] -= 1;
            db.garbage_size += old_len + HEADER_LEN;
            deleted = true;
            false
        }
    });

    db.clauses = clauses;

    if deleted {
        for by_tier in db.by_tier.iter_mut() {
            by_tier.retain(|&cref| !alloc.header(cref).deleted());
        }
    }
}
