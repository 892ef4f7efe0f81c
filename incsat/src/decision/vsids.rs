//! The VSIDS branching heuristic.
//!
//! VSIDS (Variable State Independent Decaying Sum) keeps an activity value for each variable.
//! Every variable taking part in conflict analysis is bumped, i.e. its activity is increased by a
//! constant, and after each conflict all activities are decayed by multiplying them with a
//! constant below 1. Decisions branch on the unassigned variable with the highest activity. Among
//! variables of equal activity the one with the lowest index is chosen, which makes the search
//! deterministic.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use incsat_formula::Var;

use crate::config::SolverConfig;

/// The VSIDS branching heuristic.
///
/// Instead of decaying all activities after each conflict, the bump value is divided by the decay
/// factor. When this would overflow, all activities and the bump value are scaled down. Only the
/// order of activities matters, so this is equivalent to decaying every value.
pub struct Vsids {
    /// The activity of each variable.
    activity: Vec<OrderedFloat<f32>>,
    /// Whether a variable may be used for decisions.
    enabled: Vec<bool>,
    /// A binary max-heap of the variables.
    heap: Vec<Var>,
    /// The position in the binary heap for each variable.
    position: Vec<Option<usize>>,
    /// The value to add on bumping.
    bump: f32,
    /// The inverse of the decay factor.
    inv_decay: f32,
}

impl Default for Vsids {
    fn default() -> Vsids {
        Vsids {
            activity: vec![],
            enabled: vec![],
            heap: vec![],
            position: vec![],
            bump: 1.0,
            inv_decay: 1.0 / SolverConfig::default().vsids_decay,
        }
    }
}

impl Vsids {
    /// Update structures for a new variable count.
    ///
    /// New variables start out disabled.
    pub fn set_var_count(&mut self, count: usize) {
        debug_assert!(!self.heap.iter().any(|&v| v.index() >= count));
        self.activity.resize(count, OrderedFloat(0.0));
        self.enabled.resize(count, false);
        self.position.resize(count, None);
    }

    /// Rescale activities if any value exceeds this value.
    fn rescale_limit() -> f32 {
        std::f32::MAX / 16.0
    }

    /// Change the decay factor.
    ///
    /// The factor must be in the range checked by the config update.
    pub fn set_decay(&mut self, decay: f32) {
        debug_assert!(decay < 1.0);
        debug_assert!(decay > 1.0 / 16.0);
        self.inv_decay = 1.0 / decay;
    }

    /// Allow or forbid decisions on a variable.
    pub fn set_enabled(&mut self, var: Var, enabled: bool) {
        self.enabled[var.index()] = enabled;
        if enabled {
            self.make_available(var);
        }
    }

    /// Whether decisions on a variable are allowed.
    pub fn enabled(&self, var: Var) -> bool {
        self.enabled[var.index()]
    }

    /// Bump a variable by increasing its activity.
    pub fn bump(&mut self, var: Var) {
        let rescale = {
            let value = &mut self.activity[var.index()];
            value.0 += self.bump;
            value.0 >= Self::rescale_limit()
        };
        if rescale {
            self.rescale();
        }
        if let Some(pos) = self.position[var.index()] {
            self.sift_up(pos);
        }
    }

    /// Decay all variable activities.
    pub fn decay(&mut self) {
        self.bump *= self.inv_decay;
        if self.bump >= Self::rescale_limit() {
            self.rescale();
        }
    }

    /// Rescale all values to avoid an overflow.
    fn rescale(&mut self) {
        let rescale_factor = 1.0 / Self::rescale_limit();
        for activity in &mut self.activity {
            activity.0 *= rescale_factor;
        }
        self.bump *= rescale_factor;
    }

    /// Insert an enabled variable into the heap if not already present.
    pub fn make_available(&mut self, var: Var) {
        if self.enabled[var.index()] && self.position[var.index()].is_none() {
            let position = self.heap.len();
            self.position[var.index()] = Some(position);
            self.heap.push(var);
            self.sift_up(position);
        }
    }

    /// Heap order: higher activity first, lower index on ties.
    fn before(&self, a: Var, b: Var) -> bool {
        match self.activity[a.index()].cmp(&self.activity[b.index()]) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => a.index() < b.index(),
        }
    }

    /// Move a variable closer to the root until the heap property is satisfied.
    fn sift_up(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        while pos > 0 {
            let parent_pos = (pos - 1) / 2;
            let parent_var = self.heap[parent_pos];
            if !self.before(var, parent_var) {
                break;
            }
            self.position[parent_var.index()] = Some(pos);
            self.heap[pos] = parent_var;
            pos = parent_pos;
        }
        self.position[var.index()] = Some(pos);
        self.heap[pos] = var;
    }

    /// Move a variable away from the root until the heap property is satisfied.
    fn sift_down(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        loop {
            let mut best_pos = pos;
            let mut best_var = var;

            for &child_pos in [pos * 2 + 1, pos * 2 + 2].iter() {
                if child_pos < self.heap.len() {
                    let child_var = self.heap[child_pos];
                    if self.before(child_var, best_var) {
                        best_pos = child_pos;
                        best_var = child_var;
                    }
                }
            }

            if best_pos == pos {
                break;
            }

            self.position[best_var.index()] = Some(pos);
            self.heap[pos] = best_var;
            pos = best_pos;
        }
        self.position[var.index()] = Some(pos);
        self.heap[pos] = var;
    }

    /// Remove and return the root of the heap.
    fn pop(&mut self) -> Option<Var> {
        if self.heap.is_empty() {
            return None;
        }
        let var = self.heap.swap_remove(0);
        self.position[var.index()] = None;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(var)
    }
}

/// Yields enabled variables by decreasing activity, removing them from the heap.
///
/// Variables disabled while in the heap are dropped on the way.
impl Iterator for Vsids {
    type Item = Var;

    fn next(&mut self) -> Option<Var> {
        while let Some(var) = self.pop() {
            if self.enabled[var.index()] {
                return Some(var);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use incsat_formula::var;

    fn enabled_vsids(count: usize) -> Vsids {
        let mut vsids = Vsids::default();
        vsids.set_var_count(count);
        for i in 0..count {
            vsids.set_enabled(Var::from_index(i), true);
        }
        vsids
    }

    #[test]
    fn rescale_bump() {
        let mut vsids = enabled_vsids(4);
        vsids.set_decay(1.0 / 8.0);

        for _ in 0..4 {
            vsids.next();
        }

        for i in 0..4 {
            for _ in 0..i {
                vsids.bump(Var::from_index(i));
            }
        }

        for _ in 0..41 {
            vsids.decay();
        }

        for _ in 0..30 {
            vsids.bump(var!(4));
        }

        // Decay is a power of two so these values are exact
        assert_eq!(vsids.activity[0].0, 0.0);
        assert_eq!(vsids.activity[2].0, vsids.activity[1].0 * 2.0);
        assert!(vsids.activity[3] > vsids.activity[2]);
    }

    #[test]
    fn heap_sorts() {
        let mut vsids = enabled_vsids(8);

        for _ in 0..8 {
            vsids.next();
        }

        for i in 0..8 {
            for _ in 0..i {
                vsids.bump(Var::from_index(i));
            }
        }

        for i in 0..8 {
            vsids.make_available(Var::from_index((i * 5) % 8));
        }

        for i in (0..8).rev() {
            assert_eq!(vsids.next(), Some(Var::from_index(i)));
        }
        assert_eq!(vsids.next(), None);
    }

    #[test]
    fn ties_prefer_lower_index() {
        let mut vsids = enabled_vsids(6);

        for _ in 0..6 {
            vsids.next();
        }

        for &i in [5, 3, 0, 4, 1, 2].iter() {
            vsids.make_available(Var::from_index(i));
        }

        vsids.bump(var!(5));

        assert_eq!(vsids.next(), Some(var!(5)));
        for i in &[1, 2, 3, 4, 6] {
            assert_eq!(vsids.next(), Some(var!(*i)));
        }
        assert_eq!(vsids.next(), None);
    }

    #[test]
    fn disabled_vars_are_skipped() {
        let mut vsids = enabled_vsids(4);

        vsids.set_enabled(var!(1), false);
        vsids.set_enabled(var!(3), false);

        assert_eq!(vsids.next(), Some(var!(2)));
        assert_eq!(vsids.next(), Some(var!(4)));
        assert_eq!(vsids.next(), None);

        vsids.make_available(var!(1));
        assert_eq!(vsids.next(), None);

        vsids.set_enabled(var!(1), true);
        assert_eq!(vsids.next(), Some(var!(1)));
    }
}
