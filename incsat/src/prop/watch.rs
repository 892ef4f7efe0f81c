//! Watchlists to detect clauses that became unit.
//!
//! Each clause has two watches pointing to it. They are kept in the watchlists of two different
//! literals of the clause, and whenever a watch moves the literals of the clause are permuted so
//! that the watched literals are in position 0 and 1.
//!
//! While a clause is not unit under the current assignment, both watched literals are non-false.
//! When a clause propagates, the true literal is watched and in position 0 while the other watched
//! literal is a false literal of the highest decision level in the clause. A clause that became
//! satisfied before becoming unit keeps its watches.
//!
//! Assigning a literal false can invalidate this, which is detected by scanning the watches of
//! that literal. Processing the assignment moves the watches to restore the invariant, unless the
//! clause has no non-false literals left, which is a conflict. Clauses where no second non-false
//! literal can be found are exactly those that became unit. Backtracking never invalidates the
//! invariant, so watchlists are left alone then.
//!
//! Each watch also stores a blocking literal. This is another literal of the clause; when it is
//! true the clause is satisfied and the clause itself doesn't need to be accessed.
//!
//! Bulk modifications of the clause database disable the watchlists. They are rebuilt on the next
//! propagation.

use partial_ref::{partial, PartialRef};

use incsat_formula::Lit;

use crate::clause::ClauseRef;
use crate::context::{parts::*, Context};

use super::Assignment;

/// A watch on a clause.
#[derive(Copy, Clone)]
pub struct Watch {
    /// Clause which has the referring lit in position 0 or 1.
    pub cref: ClauseRef,
    /// A lit of the clause, different from the referring lit.
    pub blocking: Lit,
}

/// Watchlists to detect clauses that became unit.
pub struct Watchlists {
    /// Watches indexed by the code of the literal whose assignment triggers them.
    watches: Vec<Vec<Watch>>,
    /// Whether watchlists are present.
    enabled: bool,
}

impl Default for Watchlists {
    fn default() -> Watchlists {
        Watchlists {
            watches: vec![],
            enabled: true,
        }
    }
}

impl Watchlists {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Start watching a clause.
    ///
    /// `lits` have to be the first two literals of the given clause.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        if !self.enabled {
            return;
        }

        for i in 0..2 {
            let watch = Watch {
                cref,
                blocking: lits[i ^ 1],
            };
            self.add_watch(!lits[i], watch);
        }
    }

    /// Return watches for a given literal.
    pub fn watched_by_mut(&mut self, lit: Lit) -> &mut Vec<Watch> {
        &mut self.watches[lit.code()]
    }

    /// Make a literal watch a clause.
    pub fn add_watch(&mut self, lit: Lit, watch: Watch) {
        self.watches[lit.code()].push(watch)
    }

    /// Are watchlists enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Clear and disable watchlists.
    ///
    /// Actual clearing of the watchlists is done on re-enabling of the watchlists.
    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

/// Preference for watching a literal, lower is better.
fn watch_rank(assignment: &Assignment, lit: Lit) -> u8 {
    match assignment.lit_value(lit) {
        Some(true) => 0,
        None => 1,
        Some(false) => 2,
    }
}

/// Move the two literals best suited for watching into position 0 and 1.
///
/// Ties keep the current order, so clauses that already satisfy the watch invariant, including
/// reason clauses, are left as they are.
fn select_watched(assignment: &Assignment, lits: &mut [Lit]) {
    for pos in 0..2 {
        let mut best = pos;
        let mut best_rank = watch_rank(assignment, lits[pos]);
        for (index, &lit) in lits.iter().enumerate().skip(pos + 1) {
            if best_rank == 0 {
                break;
            }
            let rank = watch_rank(assignment, lit);
            if rank < best_rank {
                best = index;
                best_rank = rank;
            }
        }
        lits.swap(pos, best);
    }
}

/// Enable and rebuild watchlists.
///
/// False literals are only selected for watching when a clause has fewer than two non-false
/// literals. This is correct as long as the assignment of such a literal is still queued for
/// propagation, which holds for all callers that disable the watchlists.
pub fn enable_watchlists(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut WatchlistsP,
        AssignmentP,
        ClauseDbP,
    ),
) {
    let (watchlists, mut ctx) = ctx.split_part_mut(WatchlistsP);
    if watchlists.enabled {
        return;
    }

    for watchlist in watchlists.watches.iter_mut() {
        watchlist.clear();
    }

    watchlists.enabled = true;

    let (alloc, ctx) = ctx.split_part_mut(ClauseAllocP);
    let assignment = ctx.part(AssignmentP);

    for &cref in ctx.part(ClauseDbP).clause_refs() {
        if alloc.header(cref).deleted() {
            continue;
        }
        let lits = alloc.clause_mut(cref).lits_mut();
        select_watched(assignment, lits);
        watchlists.watch_clause(cref, [lits[0], lits[1]]);
    }
}
