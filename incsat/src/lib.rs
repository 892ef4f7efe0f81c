//! incsat is an incremental [CDCL][cdcl] SAT solver. Clauses can be added between calls to
//! `solve`, variables can be protected from elimination by freezing them, and a bounded search
//! reports an unknown result instead of running forever.
//!
//! The solver is available through the [`Solver`](solver::Solver) type using the crate's own
//! [`Lit`] type, and through the [`IncrementalSolver`](engine::IncrementalSolver) trait using
//! signed integer literals, implemented by two engines with different simplification behavior.
//!
//! [cdcl]: https://en.wikipedia.org/wiki/Conflict-Driven_Clause_Learning

pub mod config;
pub mod encoding;
pub mod engine;
pub mod posets;
pub mod solver;

mod analyze_conflict;
mod cdcl;
mod clause;
mod context;
mod decision;
mod elim;
mod glue;
mod load;
mod model;
mod prop;
mod schedule;
mod simplify;
mod state;
mod tmp;
mod variables;

pub use incsat_formula::{cnf, lit, CnfFormula, Lit, Var};

pub use engine::{create, create_with, EngineKind, IncrementalSolver, VarFlags};
pub use solver::{SolveResult, Solver, SolverError};

/// Version of this library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Version of the integer literal interface provided by [`IncrementalSolver`].
///
/// This changes whenever the semantics of an existing trait method change.
pub fn api_version() -> u32 {
    1
}
