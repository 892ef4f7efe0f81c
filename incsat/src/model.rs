//! Model reconstruction.
use partial_ref::{partial, PartialRef};

use incsat_formula::Lit;

use crate::context::{parts::*, Context};

/// Model of the formula, including eliminated variables.
#[derive(Default)]
pub struct Model {
    /// Whenever the last solve call returned SAT this is up to date.
    assignment: Vec<Option<bool>>,
}

impl Model {
    /// Assignment of the model.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    /// Value of a literal in the model.
    ///
    /// Variables allocated after the model was found have no value.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment
            .get(lit.index())
            .cloned()
            .flatten()
            .map(|value| value == lit.is_positive())
    }
}

/// Store the current assignment extended to eliminated variables.
pub fn reconstruct_model(mut ctx: partial!(Context, mut ModelP, AssignmentP, ElimP)) {
    let (model, ctx) = ctx.split_part_mut(ModelP);

    model.assignment.clear();
    model
        .assignment
        .extend_from_slice(ctx.part(AssignmentP).assignment());

    ctx.part(ElimP).extend_model(&mut model.assignment);
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use incsat_formula::lit;

    use crate::variables::ensure_var_count;

    #[test]
    fn values_of_the_assignment() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        ensure_var_count(ctx.borrow(), 3);
        ctx.part_mut(AssignmentP).assign_lit(lit!(1));
        ctx.part_mut(AssignmentP).assign_lit(lit!(-2));

        reconstruct_model(ctx.borrow());

        let model = ctx.part(ModelP);
        assert_eq!(model.lit_value(lit!(1)), Some(true));
        assert_eq!(model.lit_value(lit!(-1)), Some(false));
        assert_eq!(model.lit_value(lit!(2)), Some(false));
        assert_eq!(model.lit_value(lit!(3)), None);
        assert_eq!(model.lit_value(lit!(7)), None);
    }
}
