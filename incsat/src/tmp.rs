//! Temporary data.
use incsat_formula::Lit;

/// Temporary buffers shared by various parts of the solver.
///
/// Users must leave `flags` all-false when done. Check existing users before adding invariants.
#[derive(Default)]
pub struct TmpData {
    pub lits: Vec<Lit>,
    pub lits_2: Vec<Lit>,
    /// A boolean for each literal code, also used indexed by decision level.
    pub flags: Vec<bool>,
}

impl TmpData {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.flags.resize(count * 2 + 1, false);
    }
}
