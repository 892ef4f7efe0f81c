//! Incremental boolean satisfiability solver.
use log::debug;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use thiserror::Error;

use incsat_formula::{CnfFormula, Lit, Var};

use crate::config::SolverConfigUpdate;
use crate::context::{parts::*, Context};
use crate::elim::simplify_formula;
use crate::load::load_clause;
use crate::model::reconstruct_model;
use crate::prop::{full_restart, propagate};
use crate::schedule::schedule_step;
use crate::state::SatState;
use crate::variables::{self, data::VarData, ensure_var_count};

/// Outcome of a solve call.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SolveResult {
    Sat,
    Unsat,
    /// A decision or conflict budget ran out.
    Unknown,
}

impl SolveResult {
    /// Conventional SAT solver exit code: 10 for SAT, 20 for UNSAT and 0 otherwise.
    pub fn exit_code(self) -> i32 {
        match self {
            SolveResult::Sat => 10,
            SolveResult::Unsat => 20,
            SolveResult::Unknown => 0,
        }
    }
}

/// Possible errors while using the solver.
///
/// Unsatisfiability and exhausted budgets are reported as a [`SolveResult`], not as errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("variable {0} was never allocated")]
    UnknownVariable(Var),
    #[error("0 is not a literal")]
    ZeroLiteral,
    #[error("literal {0} is out of range")]
    LiteralOutOfRange(i32),
    #[error("variable {0} was eliminated and cannot be used in new clauses")]
    EliminatedVariable(Var),
    #[error("no model available, the last solve call did not return SAT")]
    NoModel,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("the last clause was not terminated by 0")]
    IncompleteClause,
    #[error("unknown engine {0:?}, expected \"plain\" or \"simp\"")]
    UnknownEngine(String),
}

/// An incremental boolean satisfiability solver.
///
/// Clauses can be added between solve calls. Variables that may occur in clauses added after a
/// call to [`eliminate`](Solver::eliminate) or [`solve_with`](Solver::solve_with) need to be
/// frozen using [`set_frozen`](Solver::set_frozen).
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Change the solver configuration.
    pub fn config(&mut self, update: &SolverConfigUpdate) -> Result<(), SolverError> {
        let mut ctx = self.ctx.into_partial_ref_mut();
        update.apply(ctx.part_mut(SolverConfigP))?;

        let (config, mut ctx) = ctx.split_part(SolverConfigP);
        ctx.part_mut(VsidsP).set_decay(config.vsids_decay);
        ctx.part_mut(ClauseActivityP)
            .set_decay(config.clause_activity_decay);
        Ok(())
    }

    /// Allocate a new variable.
    ///
    /// A `polarity` overrides the saved phase when deciding on the variable. Variables with
    /// `decision` set to `false` are only assigned by propagation.
    pub fn new_var(&mut self, polarity: Option<bool>, decision: bool) -> Var {
        self.add_var(polarity, decision, false)
    }

    pub(crate) fn add_var(&mut self, polarity: Option<bool>, decision: bool, frozen: bool) -> Var {
        let mut ctx = self.ctx.into_partial_ref_mut();
        variables::add_var(
            ctx.borrow(),
            VarData {
                polarity,
                decision,
                frozen,
                ..VarData::default()
            },
        )
    }

    /// Allocate a new decision variable without polarity hint.
    pub fn new_var_default(&mut self) -> Var {
        self.new_var(None, true)
    }

    /// Number of allocated variables.
    pub fn var_count(&self) -> usize {
        self.ctx.variables.var_count()
    }

    fn check_var(&self, var: Var) -> Result<(), SolverError> {
        if self.ctx.variables.var_present(var) {
            Ok(())
        } else {
            Err(SolverError::UnknownVariable(var))
        }
    }

    /// Allow or forbid decisions on a variable.
    pub fn set_decision_var(&mut self, var: Var, decision: bool) -> Result<(), SolverError> {
        self.check_var(var)?;
        let mut ctx = self.ctx.into_partial_ref_mut();
        variables::set_decision_var(ctx.borrow(), var, decision);
        Ok(())
    }

    /// Protect a variable from elimination or remove the protection.
    pub fn set_frozen(&mut self, var: Var, frozen: bool) -> Result<(), SolverError> {
        self.check_var(var)?;
        self.ctx.variables.var_data_mut(var).frozen = frozen;
        Ok(())
    }

    /// Add a clause to the formula.
    ///
    /// Returns `false` if the formula is known to be unsatisfiable afterwards. Adding clauses to
    /// an unsatisfiable formula has no effect.
    pub fn add_clause(&mut self, lits: &[Lit]) -> Result<bool, SolverError> {
        for &lit in lits {
            self.check_var(lit.var())?;
            if self.ctx.variables.var_data(lit.var()).eliminated {
                return Err(SolverError::EliminatedVariable(lit.var()));
            }
        }

        let mut ctx = self.ctx.into_partial_ref_mut();
        load_clause(ctx.borrow(), lits);

        if ctx.part(SolverStateP).sat_state != SatState::Unsat && propagate(ctx.borrow()).is_err()
        {
            ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
        }

        Ok(self.okay())
    }

    /// Add a formula, allocating all variables it uses.
    pub fn add_formula(&mut self, formula: &CnfFormula) -> Result<bool, SolverError> {
        {
            let mut ctx = self.ctx.into_partial_ref_mut();
            ensure_var_count(ctx.borrow(), formula.var_count());
        }
        for clause in formula.iter() {
            self.add_clause(clause)?;
        }
        Ok(self.okay())
    }

    /// Limit the number of decisions of each solve call.
    pub fn set_decision_limit(&mut self, limit: Option<u64>) {
        self.ctx.schedule.set_decision_limit(limit);
    }

    /// Limit the number of conflicts of each solve call.
    pub fn set_conflict_limit(&mut self, limit: Option<u64>) {
        self.ctx.schedule.set_conflict_limit(limit);
    }

    /// Check the satisfiability of the current formula without simplifying it.
    pub fn solve(&mut self) -> SolveResult {
        self.solve_with(false, false)
    }

    /// Check the satisfiability of the current formula.
    ///
    /// With `do_simplify` this runs [`eliminate`](Solver::eliminate) first, passing on
    /// `turn_off_elimination`.
    pub fn solve_with(&mut self, do_simplify: bool, turn_off_elimination: bool) -> SolveResult {
        if do_simplify {
            self.eliminate(turn_off_elimination);
        }

        let mut ctx = self.ctx.into_partial_ref_mut();

        full_restart(ctx.borrow());
        ctx.part_mut(ScheduleP).start_search();

        while schedule_step(ctx.borrow()) {}

        let result = match ctx.part(SolverStateP).sat_state {
            SatState::Sat => {
                reconstruct_model(ctx.borrow());
                SolveResult::Sat
            }
            SatState::Unsat => SolveResult::Unsat,
            SatState::Unknown => SolveResult::Unknown,
        };

        let schedule = ctx.part(ScheduleP);
        debug!(
            "solve: {:?} ({} conflicts, {} decisions, {} restarts in total)",
            result,
            schedule.conflicts(),
            schedule.decisions(),
            schedule.restarts()
        );

        ctx.part_mut(SolverStateP).last_result = Some(result);

        result
    }

    /// Value of a literal in the model found by the last solve call.
    ///
    /// Returns `None` for variables that were neither assigned nor eliminated, e.g. non-decision
    /// variables not occurring in any clause.
    pub fn model_value(&self, lit: Lit) -> Result<Option<bool>, SolverError> {
        self.check_var(lit.var())?;
        if self.ctx.solver_state.last_result != Some(SolveResult::Sat) {
            return Err(SolverError::NoModel);
        }
        Ok(self.ctx.model.lit_value(lit))
    }

    /// Set of literals true in the model found by the last solve call.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).last_result == Some(SolveResult::Sat) {
            Some(
                ctx.part(ModelP)
                    .assignment()
                    .iter()
                    .enumerate()
                    .flat_map(|(index, assignment)| {
                        assignment.map(|polarity| Lit::from_index(index, polarity))
                    })
                    .collect(),
            )
        } else {
            None
        }
    }

    /// Subsumption and strengthening of the formula.
    ///
    /// Returns `false` if the formula is known to be unsatisfiable afterwards.
    pub fn simplify(&mut self) -> bool {
        let mut ctx = self.ctx.into_partial_ref_mut();
        full_restart(ctx.borrow());
        simplify_formula(ctx.borrow(), false);
        self.okay()
    }

    /// Simplification including elimination of non-frozen variables.
    ///
    /// With `turn_off_elimination` no variable is eliminated by later calls.
    ///
    /// Returns `false` if the formula is known to be unsatisfiable afterwards.
    pub fn eliminate(&mut self, turn_off_elimination: bool) -> bool {
        let mut ctx = self.ctx.into_partial_ref_mut();
        full_restart(ctx.borrow());
        simplify_formula(ctx.borrow(), true);
        if turn_off_elimination {
            ctx.part_mut(ElimP).turn_off();
        }
        self.okay()
    }

    /// Whether a variable was eliminated.
    pub fn is_eliminated(&self, var: Var) -> Result<bool, SolverError> {
        self.check_var(var)?;
        Ok(self.ctx.variables.var_data(var).eliminated)
    }

    /// Whether the formula is not yet known to be unsatisfiable.
    pub fn okay(&self) -> bool {
        self.ctx.solver_state.sat_state != SatState::Unsat
    }

    /// Remove all variables and clauses.
    ///
    /// The configuration is kept.
    pub fn reset(&mut self) {
        let config = self.ctx.solver_config.clone();
        self.ctx = Box::new(Context::default());
        self.ctx.vsids.set_decay(config.vsids_decay);
        self.ctx.clause_activity.set_decay(config.clause_activity_decay);
        self.ctx.solver_config = config;
    }

    /// Total number of conflicts.
    pub fn conflicts(&self) -> u64 {
        self.ctx.schedule.conflicts()
    }

    /// Total number of decisions.
    pub fn decisions(&self) -> u64 {
        self.ctx.schedule.decisions()
    }

    /// Total number of restarts.
    pub fn restarts(&self) -> u64 {
        self.ctx.schedule.restarts()
    }
}
