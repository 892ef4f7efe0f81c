//! Cardinality constraint encodings.
//!
//! The encodings add clauses to any [`IncrementalSolver`], allocating auxiliary variables as
//! needed. Auxiliary variables may be eliminated.
use crate::engine::{IncrementalSolver, VarFlags};
use crate::solver::SolverError;

/// Add clauses forbidding more than one of `lits` to be true, using the commander encoding.
///
/// Literals are split into groups of `group_size`. Within a group at most one literal may be true
/// and a commander variable is true iff a literal of its group is. The commander variables are
/// constrained recursively. Group sizes below 2 are treated as 2.
///
/// Returns `false` if the formula is known to be unsatisfiable afterwards.
pub fn at_most_one_commander<S>(
    solver: &mut S,
    lits: &[i32],
    group_size: usize,
) -> Result<bool, SolverError>
where
    S: IncrementalSolver + ?Sized,
{
    let group_size = group_size.max(2);

    if lits.len() <= group_size {
        return at_most_one_pairwise(solver, lits);
    }

    let mut commanders = vec![];

    for group in lits.chunks(group_size) {
        at_most_one_pairwise(solver, group)?;

        let commander = solver.new_variable(VarFlags::ELIMINATE);

        let mut some_true = vec![-commander];
        for &lit in group {
            solver.add_clause(&[commander, -lit])?;
            some_true.push(lit);
        }
        solver.add_clause(&some_true)?;

        commanders.push(commander);
    }

    at_most_one_commander(solver, &commanders, group_size)
}

/// At most one literal true, using a binary clause for every pair.
fn at_most_one_pairwise<S>(solver: &mut S, lits: &[i32]) -> Result<bool, SolverError>
where
    S: IncrementalSolver + ?Sized,
{
    for (i, &a) in lits.iter().enumerate() {
        for &b in lits[i + 1..].iter() {
            solver.add_clause(&[-a, -b])?;
        }
    }
    Ok(solver.okay())
}

/// Add clauses forbidding more than `k` of `lits` to be true, using a sequential counter.
///
/// For `n` literals this allocates `(n - 1) * k` auxiliary variables, where the variable
/// `s[i][j]` is implied when at least `j + 1` of the first `i + 1` literals are true.
///
/// Returns `false` if the formula is known to be unsatisfiable afterwards.
pub fn at_most_k_sequential<S>(solver: &mut S, lits: &[i32], k: usize) -> Result<bool, SolverError>
where
    S: IncrementalSolver + ?Sized,
{
    let n = lits.len();

    if k == 0 {
        for &lit in lits {
            solver.add_clause(&[-lit])?;
        }
        return Ok(solver.okay());
    }

    if k >= n {
        return Ok(solver.okay());
    }

    let counters: Vec<Vec<i32>> = (0..n - 1)
        .map(|_| {
            (0..k)
                .map(|_| solver.new_variable(VarFlags::ELIMINATE))
                .collect()
        })
        .collect();

    solver.add_clause(&[-lits[0], counters[0][0]])?;
    for &counter in counters[0][1..].iter() {
        solver.add_clause(&[-counter])?;
    }

    for i in 1..n - 1 {
        let (lit, previous, current) = (lits[i], &counters[i - 1], &counters[i]);

        solver.add_clause(&[-lit, current[0]])?;
        solver.add_clause(&[-previous[0], current[0]])?;

        for j in 1..k {
            solver.add_clause(&[-lit, -previous[j - 1], current[j]])?;
            solver.add_clause(&[-previous[j], current[j]])?;
        }

        solver.add_clause(&[-lit, -previous[k - 1]])?;
    }

    solver.add_clause(&[-lits[n - 1], -counters[n - 2][k - 1]])?;

    Ok(solver.okay())
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::engine::{create, EngineKind};
    use crate::solver::SolveResult;

    /// Number of assignments to `lits` that extend to a model.
    fn count_projected_models(solver: &mut dyn IncrementalSolver, lits: &[i32]) -> usize {
        let mut count = 0;
        while solver.solve().unwrap() == SolveResult::Sat {
            count += 1;
            let blocking: Vec<i32> = lits
                .iter()
                .map(|&lit| {
                    if solver.model_value(lit).unwrap() == 1 {
                        -lit
                    } else {
                        lit
                    }
                })
                .collect();
            if blocking.is_empty() || !solver.add_clause(&blocking).unwrap() {
                break;
            }
        }
        count
    }

    fn binomial(n: usize, k: usize) -> usize {
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    fn new_lits(solver: &mut dyn IncrementalSolver, n: usize) -> Vec<i32> {
        (0..n).map(|_| solver.new_variable(VarFlags::empty())).collect()
    }

    #[test]
    fn commander_forces_single_literal() {
        let mut solver = create(EngineKind::Simp);
        let lits = new_lits(&mut *solver, 7);

        at_most_one_commander(&mut *solver, &lits, 3).unwrap();
        solver.add_clause(&lits).unwrap();
        solver.add_clause(&[-lits[0], -lits[3]]).unwrap();
        solver.add_clause(&[lits[5]]).unwrap();

        assert_eq!(solver.solve(), Ok(SolveResult::Sat));
        for (i, &lit) in lits.iter().enumerate() {
            let expected = if i == 5 { 1 } else { -1 };
            assert_eq!(solver.model_value(lit), Ok(expected));
        }

        solver.add_clause(&[lits[6]]).unwrap();
        assert_eq!(solver.solve(), Ok(SolveResult::Unsat));
    }

    #[test]
    fn sequential_zero_forbids_all() {
        let mut solver = create(EngineKind::Plain);
        let lits = new_lits(&mut *solver, 3);

        at_most_k_sequential(&mut *solver, &lits, 0).unwrap();

        assert_eq!(count_projected_models(&mut *solver, &lits), 1);
        assert_eq!(solver.var_count(), 3);
    }

    proptest! {
        #[test]
        fn commander_counts(n in 0..9usize, group_size in 1..5usize) {
            let mut solver = create(EngineKind::Plain);
            let lits = new_lits(&mut *solver, n);

            at_most_one_commander(&mut *solver, &lits, group_size).unwrap();

            let expected = if n == 0 { 1 } else { n + 1 };
            prop_assert_eq!(count_projected_models(&mut *solver, &lits), expected);
        }

        #[test]
        fn sequential_counts(n in 1..8usize, k in 0..5usize) {
            let mut solver = create(EngineKind::Plain);
            let lits = new_lits(&mut *solver, n);

            at_most_k_sequential(&mut *solver, &lits, k).unwrap();

            let expected: usize = (0..=k.min(n)).map(|i| binomial(n, i)).sum();
            prop_assert_eq!(count_projected_models(&mut *solver, &lits), expected);

            if k > 0 && k < n {
                prop_assert_eq!(solver.var_count(), n + (n - 1) * k);
            }
        }
    }
}
