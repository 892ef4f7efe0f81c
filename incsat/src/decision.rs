//! Decision heuristics.

use partial_ref::{partial, PartialRef};

use crate::context::{parts::*, Context};
use crate::prop::{enqueue_assignment, Reason};

pub mod vsids;

/// Make a decision and enqueue it.
///
/// The polarity is the variable's user hint if present, its saved phase otherwise.
///
/// Returns `false` if no decision was made because all decision variables are assigned.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut TrailP,
        mut VsidsP,
        VariablesP,
    ),
) -> bool {
    let (vsids, mut ctx) = ctx.split_part_mut(VsidsP);

    if let Some(decision_var) = vsids.find(|&var| ctx.part(AssignmentP).var_value(var).is_none()) {
        let polarity = ctx
            .part(VariablesP)
            .var_data(decision_var)
            .polarity
            .unwrap_or_else(|| ctx.part(AssignmentP).last_var_value(decision_var));

        ctx.part_mut(TrailP).new_decision_level();

        enqueue_assignment(ctx.borrow(), decision_var.lit(polarity), Reason::Unit);

        true
    } else {
        false
    }
}
