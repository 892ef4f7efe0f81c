//! End to end properties of the incremental solver.
use std::collections::HashSet;

use proptest::prelude::*;

use rand::{rngs::StdRng, SeedableRng};

use incsat::{CnfFormula, Lit, SolveResult, Solver, Var};
use incsat_formula::{
    cnf_formula,
    gen::{pigeon_hole, random_k_sat},
    lit,
    test::{sat_formula, sgen_unsat_formula},
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn check_model(solver: &Solver, formula: &CnfFormula) -> bool {
    let model: HashSet<Lit> = solver.model().unwrap().into_iter().collect();
    formula
        .iter()
        .all(|clause| clause.iter().any(|lit| model.contains(lit)))
}

#[test]
fn empty_formula_has_empty_model() {
    init_logging();
    let mut solver = Solver::new();
    assert_eq!(solver.solve(), SolveResult::Sat);
    assert_eq!(solver.model(), Some(vec![]));
}

#[test]
fn contradicting_units_stay_unsat() {
    init_logging();
    let mut solver = Solver::new();

    assert_eq!(solver.add_formula(&cnf_formula![1; -1;]), Ok(false));
    assert!(!solver.okay());

    for _ in 0..3 {
        assert_eq!(solver.solve(), SolveResult::Unsat);
        assert_eq!(solver.solve_with(true, false), SolveResult::Unsat);
    }

    assert_eq!(solver.add_clause(&[lit!(1)]), Ok(false));
    assert_eq!(solver.conflicts(), 0);
}

#[test]
fn pigeon_hole_is_unsat() {
    init_logging();
    for &holes in [2, 3, 4].iter() {
        let formula = pigeon_hole(holes);

        let mut solver = Solver::new();
        solver.add_formula(&formula).unwrap();
        assert_eq!(solver.solve(), SolveResult::Unsat);

        let mut solver = Solver::new();
        solver.add_formula(&formula).unwrap();
        assert_eq!(solver.solve_with(true, true), SolveResult::Unsat);
    }
}

#[test]
fn budgets_give_unknown_and_keep_the_solver_usable() {
    init_logging();
    let mut solver = Solver::new();
    solver.add_formula(&pigeon_hole(6)).unwrap();

    solver.set_decision_limit(Some(5));
    assert_eq!(solver.solve(), SolveResult::Unknown);
    assert!(solver.okay());
    assert_eq!(solver.model(), None);

    solver.set_decision_limit(None);
    solver.set_conflict_limit(Some(3));
    assert_eq!(solver.solve(), SolveResult::Unknown);

    solver.set_conflict_limit(None);
    assert_eq!(solver.solve(), SolveResult::Unsat);
}

#[test]
fn random_3_sat_is_deterministic() {
    init_logging();
    for seed in 0..5 {
        let formula = random_k_sat(&mut StdRng::seed_from_u64(seed), 60, 256, 3);

        let mut first = Solver::new();
        first.add_formula(&formula).unwrap();
        let first_result = first.solve();

        let mut second = Solver::new();
        second.add_formula(&formula).unwrap();
        let second_result = second.solve();

        assert_ne!(first_result, SolveResult::Unknown);
        assert_eq!(first_result, second_result);
        assert_eq!(first.conflicts(), second.conflicts());
        assert_eq!(first.model(), second.model());

        if first_result == SolveResult::Sat {
            assert!(check_model(&first, &formula));
        }
    }
}

#[test]
fn independent_solvers_on_threads() {
    init_logging();
    let handles: Vec<_> = (2..6)
        .map(|holes| {
            std::thread::spawn(move || {
                let mut solver = Solver::new();
                solver.add_formula(&pigeon_hole(holes)).unwrap();
                solver.solve()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), SolveResult::Unsat);
    }
}

proptest! {
    #[test]
    fn sgen_unsat(formula in sgen_unsat_formula(1..7usize), simplify in any::<bool>()) {
        init_logging();
        let mut solver = Solver::new();
        solver.add_formula(&formula).unwrap();

        prop_assert_eq!(solver.solve_with(simplify, false), SolveResult::Unsat);
    }

    #[test]
    fn models_satisfy_all_clauses(
        formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0),
        simplify in any::<bool>(),
    ) {
        init_logging();
        let mut solver = Solver::new();
        solver.add_formula(&formula).unwrap();

        prop_assert_eq!(solver.solve_with(simplify, false), SolveResult::Sat);
        prop_assert!(check_model(&solver, &formula));
    }

    #[test]
    fn elimination_preserves_models(
        formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0),
    ) {
        init_logging();
        let mut solver = Solver::new();
        solver.add_formula(&formula).unwrap();

        prop_assert!(solver.eliminate(false));
        prop_assert_eq!(solver.solve(), SolveResult::Sat);
        prop_assert!(check_model(&solver, &formula));

        for index in 0..formula.var_count() {
            let var = Var::from_index(index);
            if solver.is_eliminated(var).unwrap() {
                prop_assert!(solver.model_value(var.positive()).unwrap().is_some());
            }
        }
    }

    #[test]
    fn frozen_values_survive_new_clauses(
        formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0),
        frozen_count in 1..4usize,
    ) {
        init_logging();
        let mut solver = Solver::new();
        solver.add_formula(&formula).unwrap();

        let frozen: Vec<Var> = (0..frozen_count.min(formula.var_count()))
            .map(Var::from_index)
            .collect();
        for &var in frozen.iter() {
            solver.set_frozen(var, true).unwrap();
        }

        prop_assert_eq!(solver.solve_with(true, false), SolveResult::Sat);

        let mut values = vec![];
        for &var in frozen.iter() {
            prop_assert_eq!(solver.is_eliminated(var), Ok(false));
            let value = solver.model_value(var.positive()).unwrap().unwrap_or(false);
            values.push(var.lit(value));
        }

        for &lit in values.iter() {
            prop_assert!(solver.add_clause(&[lit]).unwrap());
        }

        prop_assert_eq!(solver.solve_with(true, false), SolveResult::Sat);
        prop_assert!(check_model(&solver, &formula));

        for &lit in values.iter() {
            prop_assert_eq!(solver.model_value(lit), Ok(Some(true)));
        }
    }
}
