//! Partial assignment and trail.
use partial_ref::{partial, PartialRef};

use incsat_formula::{lit::LitIdx, Lit, Var};

use crate::context::{parts::*, Context};
use crate::state::SatState;

use super::Reason;

/// Current partial assignment.
#[derive(Default)]
pub struct Assignment {
    assignment: Vec<Option<bool>>,
    /// Value a variable had before it was last unassigned.
    last_value: Vec<bool>,
}

/// This compares two `Option<bool>` values as bytes. Workaround for bad code generation.
pub fn fast_option_eq(a: Option<bool>, b: Option<bool>) -> bool {
    unsafe { std::mem::transmute::<_, u8>(a) == std::mem::transmute::<_, u8>(b) }
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, None);
        self.last_value.resize(count, false);
    }

    /// Current partial assignment as slice.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.assignment[var.index()]
    }

    /// Saved phase of a variable, `false` for variables never assigned.
    pub fn last_var_value(&self, var: Var) -> bool {
        self.last_value[var.index()]
    }

    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.index()].map(|b| b ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        fast_option_eq(self.assignment[lit.index()], Some(lit.is_positive()))
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        fast_option_eq(self.assignment[lit.index()], Some(lit.is_negative()))
    }

    pub fn lit_is_unk(&self, lit: Lit) -> bool {
        fast_option_eq(self.assignment[lit.index()], None)
    }

    pub fn assign_lit(&mut self, lit: Lit) {
        self.assignment[lit.index()] = lit.is_positive().into()
    }

    /// Unassign a variable, saving its current value as phase.
    pub fn unassign_var(&mut self, var: Var) {
        if let Some(value) = self.assignment[var.index()] {
            self.last_value[var.index()] = value;
        }
        self.assignment[var.index()] = None;
    }
}

/// Decision and propagation history.
#[derive(Default)]
pub struct Trail {
    /// Stack of all propagated and all enqueued assignments
    trail: Vec<Lit>,
    /// Next assignment in trail to propagate
    queue_head_pos: usize,
    /// Decision levels as trail indices.
    decisions: Vec<LitIdx>,
}

impl Trail {
    /// Return the next assigned literal to propagate.
    pub fn queue_head(&self) -> Option<Lit> {
        self.trail.get(self.queue_head_pos).cloned()
    }

    pub fn pop_queue(&mut self) {
        self.queue_head_pos += 1;
        debug_assert!(self.queue_head_pos <= self.trail.len());
    }

    /// Assigned literals in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Clear the trail.
    ///
    /// This simply removes all entries without performing any backtracking. Can only be called
    /// with no active decisions. Used after level 0 facts were made permanent.
    pub fn clear(&mut self) {
        assert!(self.decisions.is_empty());
        self.trail.clear();
        self.queue_head_pos = 0;
    }

    /// Start a new decision level.
    ///
    /// Does not enqueue the decision itself.
    pub fn new_decision_level(&mut self) {
        self.decisions.push(self.trail.len() as LitIdx)
    }

    /// Current decision level.
    pub fn current_level(&self) -> usize {
        self.decisions.len()
    }

    /// Whether all assignments are processed.
    pub fn fully_propagated(&self) -> bool {
        self.queue_head_pos == self.trail.len()
    }
}

/// Enqueues the assignment of true to a literal.
///
/// This updates the assignment and trail, but does not perform any propagation. The literal has to
/// be unassigned when calling this.
pub fn enqueue_assignment(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP),
    lit: Lit,
    reason: Reason,
) {
    let assignment = ctx.part_mut(AssignmentP);
    debug_assert!(assignment.lit_value(lit) == None);

    assignment.assign_lit(lit);

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    let node = &mut ctx.part_mut(ImplGraphP).nodes[lit.index()];
    node.reason = reason;
    node.level = trail.decisions.len() as LitIdx;
    node.depth = trail.trail.len() as LitIdx;

    trail.trail.push(lit);
}

/// Undo all assignments in decision levels deeper than the given level.
///
/// Unassigned variables keep their value as saved phase and become available for decisions again.
pub fn backtrack(
    mut ctx: partial!(Context, mut AssignmentP, mut TrailP, mut VsidsP),
    level: usize,
) {
    let (assignment, mut ctx) = ctx.split_part_mut(AssignmentP);
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    let vsids = ctx.part_mut(VsidsP);

    if level >= trail.decisions.len() {
        return;
    }

    let new_trail_len = trail.decisions[level] as usize;

    trail.queue_head_pos = new_trail_len;
    trail.decisions.truncate(level);

    for &lit in trail.trail[new_trail_len..].iter() {
        assignment.unassign_var(lit.var());
        vsids.make_available(lit.var());
    }
    trail.trail.truncate(new_trail_len);
}

/// Undo all decisions.
pub fn restart(mut ctx: partial!(Context, mut AssignmentP, mut TrailP, mut VsidsP)) {
    backtrack(ctx.borrow(), 0);
}

/// Undo all decisions before changing the formula.
///
/// Unlike a restart this also forgets that the current formula was found satisfiable.
pub fn full_restart(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut SolverStateP,
        mut TrailP,
        mut VsidsP,
    ),
) {
    let state = ctx.part_mut(SolverStateP);
    state.interrupted = false;
    if state.sat_state == SatState::Sat {
        state.sat_state = SatState::Unknown;
    }
    backtrack(ctx.borrow(), 0);
}
