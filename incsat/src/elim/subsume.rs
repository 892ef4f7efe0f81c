//! Backward subsumption and self-subsuming strengthening.
use partial_ref::{partial, PartialRef};

use incsat_formula::Lit;

use crate::clause::{db, ClauseRef, Tier};
use crate::context::{parts::*, Context};
use crate::state::SatState;

use super::add_derived_clause;

/// How a clause relates to a clause whose literals are flagged.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Subsumption {
    None,
    /// All flagged literals are present.
    Subsumed,
    /// All flagged literals but one are present, that one is present negated.
    ///
    /// Contains the negated literal, which can be removed.
    Strengthened(Lit),
}

fn check_subsumption(flags: &[bool], flagged_count: usize, lits: &[Lit]) -> Subsumption {
    let mut matched = 0;
    let mut negated = None;

    for &lit in lits {
        if flags[lit.code()] {
            matched += 1;
        } else if flags[(!lit).code()] {
            if negated.is_some() {
                return Subsumption::None;
            }
            negated = Some(lit);
        }
    }

    match negated {
        None if matched == flagged_count => Subsumption::Subsumed,
        Some(lit) if matched + 1 == flagged_count => Subsumption::Strengthened(lit),
        _ => Subsumption::None,
    }
}

/// Use every short enough irredundant clause to subsume or strengthen other irredundant clauses.
///
/// Requires occurrence lists. Returns the number of removed and of strengthened clauses.
pub fn subsume_clauses(
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
        mut WatchlistsP,
        SolverConfigP,
    ),
) -> (usize, usize) {
    let limit = ctx.part(SolverConfigP).subsumption_limit;

    let mut candidates: Vec<ClauseRef> = {
        let alloc = ctx.part(ClauseAllocP);
        ctx.part(ClauseDbP)
            .clause_refs()
            .iter()
            .cloned()
            .filter(|&cref| {
                let header = alloc.header(cref);
                !header.deleted() && header.tier() == Tier::Irred && header.len() <= limit
            })
            .collect()
    };

    candidates.sort_by_key(|&cref| ctx.part(ClauseAllocP).header(cref).len());

    let mut subsumed = 0;
    let mut strengthened = 0;

    let mut lits = vec![];
    let mut new_lits = vec![];

    for cref in candidates {
        if ctx.part(SolverStateP).sat_state == SatState::Unsat {
            break;
        }
        if ctx.part(ClauseAllocP).header(cref).deleted() {
            continue;
        }

        lits.clear();
        lits.extend_from_slice(ctx.part(ClauseAllocP).clause(cref).lits());

        // Every clause subsumed or strengthened by this one contains `best` or `!best`.
        let others = {
            let elim = ctx.part(ElimP);
            let occurrence_count =
                |lit: Lit| elim.occurrences(lit).len() + elim.occurrences(!lit).len();
            let best = match lits.iter().cloned().min_by_key(|&lit| occurrence_count(lit)) {
                Some(best) => best,
                None => continue,
            };
            let mut others = elim.occurrences(best).to_vec();
            others.extend_from_slice(elim.occurrences(!best));
            others
        };

        for &lit in lits.iter() {
            ctx.part_mut(TmpDataP).flags[lit.code()] = true;
        }

        for other in others {
            if other == cref {
                continue;
            }

            let result = {
                let header = ctx.part(ClauseAllocP).header(other);
                if header.deleted() || header.len() < lits.len() {
                    continue;
                }
                check_subsumption(
                    &ctx.part(TmpDataP).flags,
                    lits.len(),
                    ctx.part(ClauseAllocP).clause(other).lits(),
                )
            };

            match result {
                Subsumption::None => (),
                Subsumption::Subsumed => {
                    db::delete_clause(ctx.borrow(), other);
                    subsumed += 1;
                }
                Subsumption::Strengthened(removed) => {
                    new_lits.clear();
                    new_lits.extend(
                        ctx.part(ClauseAllocP)
                            .clause(other)
                            .lits()
                            .iter()
                            .cloned()
                            .filter(|&lit| lit != removed),
                    );
                    db::delete_clause(ctx.borrow(), other);
                    add_derived_clause(ctx.borrow(), &mut new_lits);
                    strengthened += 1;

                    if ctx.part(SolverStateP).sat_state == SatState::Unsat {
                        break;
                    }
                }
            }
        }

        for &lit in lits.iter() {
            ctx.part_mut(TmpDataP).flags[lit.code()] = false;
        }
    }

    (subsumed, strengthened)
}

#[cfg(test)]
mod tests {
    use super::*;

    use incsat_formula::{lit, lits};

    #[test]
    fn subsumption_checks() {
        let mut flags = vec![false; 20];
        for lit in lits![1, -2, 3].iter() {
            flags[lit.code()] = true;
        }

        assert_eq!(
            check_subsumption(&flags, 3, &lits![4, 3, -2, 1]),
            Subsumption::Subsumed
        );
        assert_eq!(
            check_subsumption(&flags, 3, &lits![4, -3, -2, 1]),
            Subsumption::Strengthened(lit!(-3))
        );
        assert_eq!(
            check_subsumption(&flags, 3, &lits![-3, 2, 1]),
            Subsumption::None
        );
        assert_eq!(check_subsumption(&flags, 3, &lits![1, 3, 4]), Subsumption::None);
    }
}
