//! Metadata stored in the header of each clause.
use incsat_formula::{lit::LitIdx, Var};

use super::Tier;

/// Length of a [`ClauseHeader`] in multiples of [`LitIdx`]
pub(super) const HEADER_LEN: usize = 3;

const FLAGS_WORD: usize = 0;
const ACTIVITY_WORD: usize = 1;
const LEN_WORD: usize = 2;

const TIER_OFFSET: usize = 0;
const TIER_MASK: u32 = 0b11;

const DELETED_OFFSET: usize = 2;
const MARK_OFFSET: usize = 3;
const ACTIVE_OFFSET: usize = 4;

const GLUE_OFFSET: usize = 6;
const GLUE_LIMIT: usize = (LitIdx::max_value() >> GLUE_OFFSET) as usize;

/// Metadata for a clause.
///
/// This is stored in a [`ClauseAlloc`](super::ClauseAlloc) and thus must have a representation
/// compatible with a slice of [`LitIdx`] values.
#[repr(transparent)]
#[derive(Copy, Clone, Default)]
pub struct ClauseHeader {
    pub(super) data: [LitIdx; HEADER_LEN],
}

impl ClauseHeader {
    /// Create a new clause header with default entries.
    pub fn new() -> ClauseHeader {
        Self::default()
    }

    /// View the first words of a stored clause as its header.
    pub(super) fn from_words(words: &[LitIdx]) -> &ClauseHeader {
        assert!(words.len() >= HEADER_LEN);
        unsafe { &*(words.as_ptr() as *const ClauseHeader) }
    }

    pub(super) fn from_words_mut(words: &mut [LitIdx]) -> &mut ClauseHeader {
        assert!(words.len() >= HEADER_LEN);
        unsafe { &mut *(words.as_mut_ptr() as *mut ClauseHeader) }
    }

    /// Length of the clause.
    pub fn len(&self) -> usize {
        self.data[LEN_WORD] as usize
    }

    /// Set the length of the clause.
    ///
    /// Must be `<= Var::max_count()` as each variable may only be present once per clause.
    pub fn set_len(&mut self, length: usize) {
        debug_assert!(length <= Var::max_count());

        self.data[LEN_WORD] = length as LitIdx;
    }

    fn flag(&self, offset: usize) -> bool {
        (self.data[FLAGS_WORD] >> offset) & 1 != 0
    }

    fn set_flag(&mut self, offset: usize, value: bool) {
        let word = &mut self.data[FLAGS_WORD];
        *word = (*word & !(1 << offset)) | ((value as LitIdx) << offset);
    }

    /// Whether the clause is marked as deleted.
    pub fn deleted(&self) -> bool {
        self.flag(DELETED_OFFSET)
    }

    /// Mark the clause as deleted.
    pub fn set_deleted(&mut self, deleted: bool) {
        self.set_flag(DELETED_OFFSET, deleted)
    }

    /// Current [`Tier`] of the clause.
    pub fn tier(&self) -> Tier {
        Tier::from_index(((self.data[FLAGS_WORD] >> TIER_OFFSET) & TIER_MASK) as usize)
    }

    /// Set the current [`Tier`] of the clause.
    pub fn set_tier(&mut self, tier: Tier) {
        let word = &mut self.data[FLAGS_WORD];
        *word = (*word & !(TIER_MASK << TIER_OFFSET)) | ((tier as u32) << TIER_OFFSET);
    }

    /// Whether the clause was learned during search.
    pub fn learned(&self) -> bool {
        self.tier() != Tier::Irred
    }

    /// Multi purpose marker bit, must be left cleared.
    pub fn mark(&self) -> bool {
        self.flag(MARK_OFFSET)
    }

    /// Set the marker bit.
    pub fn set_mark(&mut self, mark: bool) {
        self.set_flag(MARK_OFFSET, mark)
    }

    /// Whether the clause was involved in a conflict since the last mid tier reduction.
    pub fn active(&self) -> bool {
        self.flag(ACTIVE_OFFSET)
    }

    /// Set the active bit.
    pub fn set_active(&mut self, active: bool) {
        self.set_flag(ACTIVE_OFFSET, active)
    }

    /// The glue level, saturating at a large value.
    pub fn glue(&self) -> usize {
        (self.data[FLAGS_WORD] >> GLUE_OFFSET) as usize
    }

    /// Update the glue level.
    pub fn set_glue(&mut self, glue: usize) {
        let glue = glue.min(GLUE_LIMIT) as LitIdx;
        let word = &mut self.data[FLAGS_WORD];
        *word = (*word & !(!0 << GLUE_OFFSET)) | (glue << GLUE_OFFSET);
    }

    /// Clause activity used for reducing the local tier.
    pub fn activity(&self) -> f32 {
        f32::from_bits(self.data[ACTIVITY_WORD])
    }

    /// Update the clause activity.
    pub fn set_activity(&mut self, activity: f32) {
        self.data[ACTIVITY_WORD] = activity.to_bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_mask() {
        assert!(Tier::count() <= TIER_MASK as usize + 1);
    }

    #[test]
    fn fields_are_independent() {
        let mut header = ClauseHeader::new();
        assert_eq!(header.activity(), 0.0);

        header.set_tier(Tier::Local);
        header.set_glue(12);
        header.set_active(true);
        header.set_activity(2.5);
        header.set_len(7);

        assert_eq!(header.tier(), Tier::Local);
        assert!(header.learned());
        assert_eq!(header.glue(), 12);
        assert!(header.active());
        assert!(!header.deleted());
        assert!(!header.mark());

        header.set_deleted(true);
        header.set_mark(true);
        header.set_tier(Tier::Irred);
        header.set_glue(GLUE_LIMIT + 10);

        assert!(header.deleted());
        assert!(header.mark());
        assert!(!header.learned());
        assert_eq!(header.glue(), GLUE_LIMIT);
        assert!(header.active());
        assert_eq!(header.activity(), 2.5);
        assert_eq!(header.len(), 7);
    }
}
