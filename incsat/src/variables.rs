//! Variable metadata.

use partial_ref::{partial, PartialRef};

use incsat_formula::Var;

use crate::context::{parts::*, set_var_count, Context};

pub mod data;

use data::VarData;

/// Variable metadata.
#[derive(Default)]
pub struct Variables {
    var_data: Vec<VarData>,
}

impl Variables {
    /// Number of allocated variables.
    pub fn var_count(&self) -> usize {
        self.var_data.len()
    }

    /// Metadata of a variable.
    pub fn var_data(&self, var: Var) -> &VarData {
        &self.var_data[var.index()]
    }

    /// Mutable metadata of a variable.
    pub fn var_data_mut(&mut self, var: Var) -> &mut VarData {
        &mut self.var_data[var.index()]
    }

    /// Whether a variable was allocated.
    pub fn var_present(&self, var: Var) -> bool {
        var.index() < self.var_data.len()
    }
}

/// Allocate a new variable.
pub fn add_var(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ImplGraphP,
        mut TmpDataP,
        mut VariablesP,
        mut VsidsP,
        mut WatchlistsP,
    ),
    data: VarData,
) -> Var {
    let var = Var::from_index(ctx.part(VariablesP).var_count());

    set_var_count(ctx.borrow(), var.index() + 1);

    let decision = data.decision;
    ctx.part_mut(VariablesP).var_data.push(data);
    ctx.part_mut(VsidsP).set_enabled(var, decision);

    var
}

/// Allocate default variables until there are at least `count` of them.
pub fn ensure_var_count(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ImplGraphP,
        mut TmpDataP,
        mut VariablesP,
        mut VsidsP,
        mut WatchlistsP,
    ),
    count: usize,
) {
    while ctx.part(VariablesP).var_count() < count {
        add_var(ctx.borrow(), VarData::default());
    }
}

/// Allow or forbid decisions on a variable.
///
/// Eliminated variables are never used for decisions.
pub fn set_decision_var(
    mut ctx: partial!(Context, mut VariablesP, mut VsidsP),
    var: Var,
    decision: bool,
) {
    let data = ctx.part_mut(VariablesP).var_data_mut(var);
    data.decision = decision;
    let enabled = decision && !data.eliminated;
    ctx.part_mut(VsidsP).set_enabled(var, enabled);
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    #[test]
    fn decision_flags_control_heap() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        ensure_var_count(ctx.borrow(), 3);
        let extra = add_var(
            ctx.borrow(),
            VarData {
                decision: false,
                ..VarData::default()
            },
        );

        assert_eq!(extra.index(), 3);
        assert_eq!(ctx.part(VariablesP).var_count(), 4);
        assert!(!ctx.part(VsidsP).enabled(extra));

        set_decision_var(ctx.borrow(), Var::from_index(1), false);
        set_decision_var(ctx.borrow(), extra, true);

        let mut order = vec![];
        while let Some(var) = ctx.part_mut(VsidsP).next() {
            order.push(var.index());
        }
        assert_eq!(order, vec![0, 2, 3]);
    }
}
