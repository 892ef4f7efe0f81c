//! Solver engines behind a common interface using signed integer literals.
//!
//! Variable `v` (counting from 1) is represented by the literals `v` and `-v`. The [`SimpSolver`]
//! engine simplifies the formula and eliminates variables, the [`PlainSolver`] engine only
//! searches.
use std::str::FromStr;

use bitflags::bitflags;

use incsat_formula::{Lit, Var};

use crate::config::SolverConfigUpdate;
use crate::solver::{SolveResult, Solver, SolverError};

bitflags! {
    /// Properties of a new variable.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct VarFlags: u32 {
        /// Decide on the true value first.
        const TRY_TRUE = 0x01;
        /// Decide on the false value first.
        const TRY_FALSE = 0x02;
        /// The variable may be eliminated, so it must not occur in clauses added after the next
        /// simplification. Without this flag the variable is frozen.
        const ELIMINATE = 0x04;
        /// Never decide on this variable.
        const NO_DECISION = 0x08;
    }
}

impl VarFlags {
    fn polarity(self) -> Option<bool> {
        if self.contains(VarFlags::TRY_TRUE) {
            Some(true)
        } else if self.contains(VarFlags::TRY_FALSE) {
            Some(false)
        } else {
            None
        }
    }

    fn decision(self) -> bool {
        !self.contains(VarFlags::NO_DECISION)
    }
}

/// Incremental solving using signed integer literals.
pub trait IncrementalSolver {
    /// Allocate a variable, returning its positive literal.
    fn new_variable(&mut self, flags: VarFlags) -> i32;

    /// Add a clause.
    ///
    /// Returns `false` if the formula is known to be unsatisfiable afterwards.
    fn add_clause(&mut self, lits: &[i32]) -> Result<bool, SolverError>;

    /// Check the satisfiability of the current formula.
    fn solve(&mut self) -> Result<SolveResult, SolverError>;

    /// Value of a literal in the model found by the last solve call.
    ///
    /// Returns `1` for true, `-1` for false and `0` for an unassigned literal.
    fn model_value(&self, lit: i32) -> Result<i32, SolverError>;

    /// Whether the formula is not yet known to be unsatisfiable.
    fn okay(&self) -> bool;

    /// Number of allocated variables.
    fn var_count(&self) -> usize;

    /// Remove all variables and clauses.
    fn reset(&mut self);

    /// Limit the number of decisions per solve call, `None` for no limit.
    fn set_decision_limit(&mut self, limit: Option<u64>);
}

/// Available engines.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineKind {
    /// [`PlainSolver`]
    Plain,
    /// [`SimpSolver`] simplifying once.
    Simp,
}

impl FromStr for EngineKind {
    type Err = SolverError;

    fn from_str(name: &str) -> Result<EngineKind, SolverError> {
        match name {
            "plain" => Ok(EngineKind::Plain),
            "simp" => Ok(EngineKind::Simp),
            _ => Err(SolverError::UnknownEngine(name.to_owned())),
        }
    }
}

/// Create an engine with the default configuration.
pub fn create(kind: EngineKind) -> Box<dyn IncrementalSolver + Send> {
    match kind {
        EngineKind::Plain => Box::new(PlainSolver::new()),
        EngineKind::Simp => Box::new(SimpSolver::new(SimplifyMode::Once)),
    }
}

/// Create an engine and apply a configuration update to it.
pub fn create_with(
    kind: EngineKind,
    update: &SolverConfigUpdate,
) -> Result<Box<dyn IncrementalSolver + Send>, SolverError> {
    Ok(match kind {
        EngineKind::Plain => {
            let mut engine = PlainSolver::new();
            engine.solver_mut().config(update)?;
            Box::new(engine)
        }
        EngineKind::Simp => {
            let mut engine = SimpSolver::new(SimplifyMode::Once);
            engine.solver_mut().config(update)?;
            Box::new(engine)
        }
    })
}

fn lit_from_signed(lit: i32) -> Result<Lit, SolverError> {
    match lit {
        0 => Err(SolverError::ZeroLiteral),
        _ => Lit::from_signed(lit).ok_or(SolverError::LiteralOutOfRange(lit)),
    }
}

fn var_from_signed(lit: i32) -> Result<Var, SolverError> {
    lit_from_signed(lit).map(|lit| lit.var())
}

fn lits_from_signed(lits: &[i32]) -> Result<Vec<Lit>, SolverError> {
    lits.iter().map(|&lit| lit_from_signed(lit)).collect()
}

fn value_to_signed(value: Option<bool>) -> i32 {
    match value {
        Some(true) => 1,
        Some(false) => -1,
        None => 0,
    }
}

/// When [`SimpSolver`] simplifies the formula.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SimplifyMode {
    /// Search without simplification.
    Never,
    /// Simplify and eliminate variables on the first solve call only.
    Once,
    /// Simplify before every solve call.
    Always,
}

/// CDCL engine with subsumption and variable elimination.
pub struct SimpSolver {
    solver: Solver,
    mode: SimplifyMode,
    simplified: bool,
}

impl SimpSolver {
    pub fn new(mode: SimplifyMode) -> SimpSolver {
        SimpSolver {
            solver: Solver::new(),
            mode,
            simplified: false,
        }
    }

    /// The wrapped solver.
    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// The wrapped solver.
    pub fn solver_mut(&mut self) -> &mut Solver {
        &mut self.solver
    }

    pub fn set_decision_var(&mut self, lit: i32, decision: bool) -> Result<(), SolverError> {
        self.solver
            .set_decision_var(var_from_signed(lit)?, decision)
    }

    pub fn set_frozen(&mut self, lit: i32, frozen: bool) -> Result<(), SolverError> {
        self.solver.set_frozen(var_from_signed(lit)?, frozen)
    }

    /// See [`Solver::simplify`].
    pub fn simplify(&mut self) -> bool {
        self.solver.simplify()
    }

    /// See [`Solver::eliminate`].
    pub fn eliminate(&mut self, turn_off_elimination: bool) -> bool {
        self.solver.eliminate(turn_off_elimination)
    }

    pub fn is_eliminated(&self, lit: i32) -> Result<bool, SolverError> {
        self.solver.is_eliminated(var_from_signed(lit)?)
    }

    pub fn add_clause1(&mut self, a: i32) -> Result<bool, SolverError> {
        IncrementalSolver::add_clause(self, &[a])
    }

    pub fn add_clause2(&mut self, a: i32, b: i32) -> Result<bool, SolverError> {
        IncrementalSolver::add_clause(self, &[a, b])
    }

    pub fn add_clause3(&mut self, a: i32, b: i32, c: i32) -> Result<bool, SolverError> {
        IncrementalSolver::add_clause(self, &[a, b, c])
    }
}

impl IncrementalSolver for SimpSolver {
    fn new_variable(&mut self, flags: VarFlags) -> i32 {
        let frozen = !flags.contains(VarFlags::ELIMINATE);
        self.solver
            .add_var(flags.polarity(), flags.decision(), frozen)
            .to_signed()
    }

    fn add_clause(&mut self, lits: &[i32]) -> Result<bool, SolverError> {
        let lits = lits_from_signed(lits)?;
        self.solver.add_clause(&lits)
    }

    fn solve(&mut self) -> Result<SolveResult, SolverError> {
        let result = match self.mode {
            SimplifyMode::Never => self.solver.solve(),
            SimplifyMode::Once => {
                let first = !self.simplified;
                self.simplified = true;
                self.solver.solve_with(first, first)
            }
            SimplifyMode::Always => self.solver.solve_with(true, false),
        };
        Ok(result)
    }

    fn model_value(&self, lit: i32) -> Result<i32, SolverError> {
        let value = self.solver.model_value(lit_from_signed(lit)?)?;
        Ok(value_to_signed(value))
    }

    fn okay(&self) -> bool {
        self.solver.okay()
    }

    fn var_count(&self) -> usize {
        self.solver.var_count()
    }

    fn reset(&mut self) {
        self.solver.reset();
        self.simplified = false;
    }

    fn set_decision_limit(&mut self, limit: Option<u64>) {
        self.solver.set_decision_limit(limit);
    }
}

/// CDCL engine without simplification.
///
/// Clauses are added one literal at a time, terminated by `0`.
#[derive(Default)]
pub struct PlainSolver {
    solver: Solver,
    clause: Vec<Lit>,
}

impl PlainSolver {
    pub fn new() -> PlainSolver {
        PlainSolver::default()
    }

    /// The wrapped solver.
    pub fn solver_mut(&mut self) -> &mut Solver {
        &mut self.solver
    }

    /// Allocate a variable, returning its positive literal.
    pub fn inc_max_var(&mut self) -> i32 {
        self.solver.new_var_default().to_signed()
    }

    /// Add a literal to the current clause, or finish the clause with `0`.
    ///
    /// Variables not allocated yet are allocated. An invalid literal leaves the current clause
    /// unchanged.
    pub fn add(&mut self, lit: i32) -> Result<(), SolverError> {
        if lit == 0 {
            let result = self.solver.add_clause(&self.clause);
            self.clause.clear();
            return result.map(|_| ());
        }

        let lit = lit_from_signed(lit)?;
        while self.solver.var_count() <= lit.index() {
            self.solver.new_var_default();
        }
        self.clause.push(lit);
        Ok(())
    }

    /// Solve with a decision limit, negative for no limit.
    ///
    /// Returns 10 for SAT, 20 for UNSAT and 0 when the limit was reached.
    pub fn sat(&mut self, decision_limit: i64) -> Result<i32, SolverError> {
        let limit = if decision_limit < 0 {
            None
        } else {
            Some(decision_limit as u64)
        };
        IncrementalSolver::set_decision_limit(self, limit);
        IncrementalSolver::solve(self).map(SolveResult::exit_code)
    }

    /// Value of a literal in the last model: 1 for true, -1 for false, 0 if unassigned.
    pub fn deref(&self, lit: i32) -> Result<i32, SolverError> {
        IncrementalSolver::model_value(self, lit)
    }
}

impl IncrementalSolver for PlainSolver {
    fn new_variable(&mut self, flags: VarFlags) -> i32 {
        self.solver
            .new_var(flags.polarity(), flags.decision())
            .to_signed()
    }

    fn add_clause(&mut self, lits: &[i32]) -> Result<bool, SolverError> {
        // Checked up front so a rejected clause leaves nothing pending
        lits_from_signed(lits)?;
        for &lit in lits {
            self.add(lit)?;
        }
        self.add(0)?;
        Ok(self.solver.okay())
    }

    fn solve(&mut self) -> Result<SolveResult, SolverError> {
        if !self.clause.is_empty() {
            return Err(SolverError::IncompleteClause);
        }
        Ok(self.solver.solve())
    }

    fn model_value(&self, lit: i32) -> Result<i32, SolverError> {
        let value = self.solver.model_value(lit_from_signed(lit)?)?;
        Ok(value_to_signed(value))
    }

    fn okay(&self) -> bool {
        self.solver.okay()
    }

    fn var_count(&self) -> usize {
        self.solver.var_count()
    }

    fn reset(&mut self) {
        self.solver.reset();
        self.clause.clear();
    }

    fn set_decision_limit(&mut self, limit: Option<u64>) {
        self.solver.set_decision_limit(limit);
    }
}
