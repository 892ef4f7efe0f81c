//! Clause storage.
//!
//! All clauses live in a single vector of [`LitIdx`] words. A clause takes [`HEADER_LEN`] words
//! for its header followed by one word per literal, and a [`ClauseRef`] is the offset of the
//! header. Deleting a clause only sets the deleted flag of its header. The words are reclaimed by
//! [`ClauseAlloc::compact`], which slides the remaining clauses towards the start of the vector.
use incsat_formula::{lit::LitIdx, Lit};

use super::{Clause, ClauseHeader, HEADER_LEN};

/// Integer type used to store offsets into [`ClauseAlloc`]'s memory.
type ClauseOffset = u32;

/// Storage for all clauses of length 2 and above.
#[derive(Default)]
pub struct ClauseAlloc {
    words: Vec<LitIdx>,
}

impl ClauseAlloc {
    pub fn new() -> ClauseAlloc {
        ClauseAlloc::default()
    }

    /// Store a new clause.
    ///
    /// The length of the header is set to the number of literals. Unit clauses are level 0
    /// assignments and never stored here, so every stored clause has two watchable literals.
    pub fn add_clause(&mut self, mut header: ClauseHeader, lits: &[Lit]) -> ClauseRef {
        assert!(lits.len() >= 2, "stored clauses need at least two literals");
        assert!(
            self.words.len() <= ClauseOffset::max_value() as usize,
            "clause storage exhausted"
        );

        let cref = ClauseRef {
            offset: self.words.len() as ClauseOffset,
        };

        header.set_len(lits.len());
        self.words.extend_from_slice(&header.data);
        self.words
            .extend(lits.iter().map(|lit| lit.code() as LitIdx));

        cref
    }

    fn header_words(&self, cref: ClauseRef) -> &[LitIdx] {
        let start = cref.offset as usize;
        &self.words[start..start + HEADER_LEN]
    }

    /// Header of a clause.
    pub fn header(&self, cref: ClauseRef) -> &ClauseHeader {
        ClauseHeader::from_words(self.header_words(cref))
    }

    pub fn header_mut(&mut self, cref: ClauseRef) -> &mut ClauseHeader {
        let start = cref.offset as usize;
        ClauseHeader::from_words_mut(&mut self.words[start..start + HEADER_LEN])
    }

    /// Words of a clause, including the header.
    fn range(&self, cref: ClauseRef) -> std::ops::Range<usize> {
        let start = cref.offset as usize;
        start..start + HEADER_LEN + self.header(cref).len()
    }

    pub fn clause(&self, cref: ClauseRef) -> &Clause {
        Clause::from_words(&self.words[self.range(cref)])
    }

    pub fn clause_mut(&mut self, cref: ClauseRef) -> &mut Clause {
        let range = self.range(cref);
        Clause::from_words_mut(&mut self.words[range])
    }

    /// Number of words in use, including those of deleted clauses.
    pub fn buffer_size(&self) -> usize {
        self.words.len()
    }

    /// Move the clauses listed in `crefs` together, dropping deleted clauses and all clauses not
    /// listed.
    ///
    /// Afterwards `crefs` holds the new references of the kept clauses in storage order. Returns
    /// the number of reclaimed words.
    pub fn compact(&mut self, crefs: &mut Vec<ClauseRef>) -> usize {
        let old_size = self.words.len();

        crefs.sort_unstable();

        let mut kept = 0;
        let mut end = 0;

        for index in 0..crefs.len() {
            let cref = crefs[index];
            if self.header(cref).deleted() {
                continue;
            }

            let range = self.range(cref);
            let size = range.len();
            // Clauses only ever move towards the start
            self.words.copy_within(range, end);

            crefs[kept] = ClauseRef {
                offset: end as ClauseOffset,
            };
            kept += 1;
            end += size;
        }

        crefs.truncate(kept);
        self.words.truncate(end);

        old_size - end
    }
}

/// Compact reference to a clause.
///
/// Only valid for the [`ClauseAlloc`] that created it and only until the next compaction.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ClauseRef {
    offset: ClauseOffset,
}

#[cfg(test)]
mod tests {
    use super::*;

    use incsat_formula::{cnf::strategy::*, lits};

    use proptest::*;

    #[test]
    fn shortened_clauses_are_compacted() {
        let mut alloc = ClauseAlloc::new();

        let a = alloc.add_clause(ClauseHeader::new(), &lits![1, 2, 3, 4]);
        let b = alloc.add_clause(ClauseHeader::new(), &lits![-1, 5]);
        let c = alloc.add_clause(ClauseHeader::new(), &lits![2, -3, 6]);

        assert_eq!(alloc.buffer_size(), 3 * HEADER_LEN + 9);

        alloc.clause_mut(a).lits_mut().swap(0, 3);
        alloc.header_mut(a).set_len(2);
        alloc.header_mut(b).set_deleted(true);

        let mut crefs = vec![c, b, a];
        let freed = alloc.compact(&mut crefs);

        assert_eq!(freed, HEADER_LEN + 4);
        assert_eq!(crefs.len(), 2);
        assert_eq!(alloc.clause(crefs[0]).lits(), &lits![4, 2][..]);
        assert_eq!(alloc.clause(crefs[1]).lits(), &lits![2, -3, 6][..]);
        assert_eq!(alloc.buffer_size(), 2 * HEADER_LEN + 5);
    }

    proptest! {
        #[test]
        fn compaction_keeps_live_clauses(
            input in cnf_formula(1..100usize, 0..500, 2..30),
            delete_every in 1..5usize,
        ) {
            let mut alloc = ClauseAlloc::new();
            let mut crefs = vec![];

            for lits in input.iter() {
                crefs.push(alloc.add_clause(ClauseHeader::new(), lits));
            }

            let mut expected = vec![];
            for (index, (&cref, lits)) in crefs.iter().zip(input.iter()).enumerate() {
                if index % delete_every == 0 {
                    alloc.header_mut(cref).set_deleted(true);
                } else {
                    expected.push(lits.to_vec());
                }
            }

            let old_size = alloc.buffer_size();
            let freed = alloc.compact(&mut crefs);

            prop_assert_eq!(old_size - freed, alloc.buffer_size());

            let remaining: Vec<Vec<Lit>> = crefs
                .iter()
                .map(|&cref| alloc.clause(cref).lits().to_vec())
                .collect();

            prop_assert_eq!(remaining, expected);
        }
    }
}
