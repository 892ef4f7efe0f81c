//! The implication graph.
use incsat_formula::{lit::LitIdx, Lit, Var};

use crate::clause::{ClauseAlloc, ClauseRef};

/// Assignments that caused a propagation.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Reason {
    /// Decisions and level 0 facts.
    Unit,
    /// Propagated by a clause, which keeps the propagated literal at position 0.
    Clause(ClauseRef),
}

impl Reason {
    /// The false literals that caused the propagation.
    pub fn lits<'a>(&self, alloc: &'a ClauseAlloc) -> &'a [Lit] {
        match *self {
            Reason::Unit => &[],
            Reason::Clause(cref) => &alloc.clause(cref).lits()[1..],
        }
    }

    /// True for decisions and level 0 facts.
    pub fn is_unit(&self) -> bool {
        *self == Reason::Unit
    }
}

/// Propagation that resulted in a conflict.
///
/// All literals of the referenced clause are false.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Conflict(pub ClauseRef);

impl Conflict {
    /// The literals that caused the conflict.
    pub fn lits<'a>(&self, alloc: &'a ClauseAlloc) -> &'a [Lit] {
        alloc.clause(self.0).lits()
    }
}

/// Node and incoming edges of the implication graph.
#[derive(Copy, Clone)]
pub struct ImplNode {
    pub reason: Reason,
    pub level: LitIdx,
    /// Position in the trail when assigned.
    pub depth: LitIdx,
}

/// The implication graph.
///
/// This is a DAG having all assigned variables as nodes. Decisions and level 0 facts are its
/// sources. Each propagated assignment has incoming edges from the literals whose assignment
/// caused the propagation.
#[derive(Default)]
pub struct ImplGraph {
    /// Contains only valid data for indices of assigned variables.
    pub nodes: Vec<ImplNode>,
}

impl ImplGraph {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.nodes.resize(
            count,
            ImplNode {
                reason: Reason::Unit,
                level: 0,
                depth: 0,
            },
        );
    }

    /// Get the reason for an assigned variable.
    ///
    /// Returns stale data if the variable isn't assigned.
    pub fn reason(&self, var: Var) -> &Reason {
        &self.nodes[var.index()].reason
    }

    /// Get the decision level of an assigned variable.
    ///
    /// Returns stale data if the variable isn't assigned.
    pub fn level(&self, var: Var) -> usize {
        self.nodes[var.index()].level as usize
    }

    /// Get the trail depth of an assigned variable.
    ///
    /// Returns stale data if the variable isn't assigned.
    pub fn depth(&self, var: Var) -> usize {
        self.nodes[var.index()].depth as usize
    }

    /// Updates the reason for an assigned variable.
    pub fn update_reason(&mut self, var: Var, reason: Reason) {
        self.nodes[var.index()].reason = reason
    }
}
