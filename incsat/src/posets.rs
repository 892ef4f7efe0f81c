//! Counting partial orders by enumerating all models.
//!
//! A partial order on `size` elements is encoded using a variable for every ordered pair of
//! elements. Each model found is excluded by a blocking clause before solving again, so the
//! number of solve calls is one more than the number of partial orders.
use log::info;

use crate::engine::{IncrementalSolver, VarFlags};
use crate::solver::{SolveResult, SolverError};

/// Clauses of the partial order relations on `size` elements.
struct PosetFormula {
    size: usize,
    /// Positive literal for each ordered pair, row major.
    table: Vec<i32>,
}

impl PosetFormula {
    fn new<S>(solver: &mut S, size: usize) -> PosetFormula
    where
        S: IncrementalSolver + ?Sized,
    {
        let table = (0..size * size)
            .map(|_| solver.new_variable(VarFlags::empty()))
            .collect();
        PosetFormula { size, table }
    }

    fn related(&self, i: usize, j: usize) -> i32 {
        self.table[i * self.size + j]
    }

    fn add_clauses<S>(&self, solver: &mut S) -> Result<(), SolverError>
    where
        S: IncrementalSolver + ?Sized,
    {
        let size = self.size;

        for i in 0..size {
            solver.add_clause(&[self.related(i, i)])?;
        }

        for i in 1..size {
            for j in 0..i {
                solver.add_clause(&[-self.related(i, j), -self.related(j, i)])?;
            }
        }

        for i in 0..size {
            for j in 0..size {
                for k in 0..size {
                    solver.add_clause(&[
                        -self.related(i, j),
                        -self.related(j, k),
                        self.related(i, k),
                    ])?;
                }
            }
        }

        Ok(())
    }
}

/// Number of partial orders on `size` labelled elements.
///
/// The solver should be empty. All variables used are frozen.
pub fn count_posets<S>(solver: &mut S, size: usize) -> Result<u64, SolverError>
where
    S: IncrementalSolver + ?Sized,
{
    let formula = PosetFormula::new(solver, size);
    formula.add_clauses(solver)?;

    let mut count = 0;
    let mut blocking = vec![];

    while solver.solve()? == SolveResult::Sat {
        count += 1;

        blocking.clear();
        for &lit in formula.table.iter() {
            let value = solver.model_value(lit)?;
            blocking.push(if value > 0 { -lit } else { lit });
        }

        if blocking.is_empty() {
            break;
        }
        solver.add_clause(&blocking)?;
    }

    info!("found {} partial orders on {} elements", count, size);

    Ok(count)
}
