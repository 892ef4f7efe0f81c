//! Both engines through the integer literal interface.
use incsat::encoding::{at_most_k_sequential, at_most_one_commander};
use incsat::engine::{PlainSolver, SimpSolver, SimplifyMode};
use incsat::posets::count_posets;
use incsat::{create, EngineKind, IncrementalSolver, SolveResult, SolverError, VarFlags};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn all_engines() -> Vec<Box<dyn IncrementalSolver + Send>> {
    vec![
        create(EngineKind::Plain),
        create(EngineKind::Simp),
        Box::new(SimpSolver::new(SimplifyMode::Never)),
        Box::new(SimpSolver::new(SimplifyMode::Always)),
    ]
}

#[test]
fn poset_counts() {
    init_logging();
    for mut solver in all_engines() {
        assert_eq!(count_posets(&mut *solver, 3), Ok(19));
        solver.reset();
        assert_eq!(solver.var_count(), 0);
        assert_eq!(count_posets(&mut *solver, 4), Ok(219));
    }
}

#[test]
fn misuse_is_reported() {
    init_logging();
    for mut solver in all_engines() {
        let a = solver.new_variable(VarFlags::empty());
        assert_eq!(solver.add_clause(&[a, 0]), Err(SolverError::ZeroLiteral));
        assert_eq!(
            solver.add_clause(&[a, 1 << 29]),
            Err(SolverError::LiteralOutOfRange(1 << 29))
        );
        assert_eq!(
            solver.add_clause(&[i32::MIN]),
            Err(SolverError::LiteralOutOfRange(i32::MIN))
        );
        assert_eq!(solver.model_value(a), Err(SolverError::NoModel));
        assert_eq!(solver.solve(), Ok(SolveResult::Sat));
        assert_eq!(solver.model_value(0), Err(SolverError::ZeroLiteral));
    }

    let mut solver = create(EngineKind::Simp);
    solver.new_variable(VarFlags::empty());
    assert!(matches!(
        solver.add_clause(&[1, 2]),
        Err(SolverError::UnknownVariable(_))
    ));
}

#[test]
fn eliminable_vars_and_later_clauses() {
    init_logging();
    let mut solver = SimpSolver::new(SimplifyMode::Once);

    let x = solver.new_variable(VarFlags::ELIMINATE | VarFlags::TRY_TRUE);
    let y = solver.new_variable(VarFlags::empty());
    let z = solver.new_variable(VarFlags::empty());

    solver.add_clause2(x, y).unwrap();
    solver.add_clause2(-x, z).unwrap();

    assert_eq!(solver.solve(), Ok(SolveResult::Sat));
    assert_eq!(solver.is_eliminated(x), Ok(true));
    assert!(matches!(
        solver.add_clause1(x),
        Err(SolverError::EliminatedVariable(_))
    ));

    solver.add_clause1(-y).unwrap();
    assert_eq!(solver.solve(), Ok(SolveResult::Sat));
    assert_eq!(solver.model_value(x), Ok(1));
    assert_eq!(solver.model_value(z), Ok(1));

    solver.add_clause1(-z).unwrap();
    assert_eq!(solver.solve(), Ok(SolveResult::Unsat));
}

#[test]
fn plain_decision_limit() {
    init_logging();
    let mut solver = PlainSolver::new();
    let holes = 6;
    let pigeons = holes + 1;
    let sits = |pigeon: usize, hole: usize| (pigeon * holes + hole + 1) as i32;

    for pigeon in 0..pigeons {
        for hole in 0..holes {
            solver.add(sits(pigeon, hole)).unwrap();
        }
        solver.add(0).unwrap();
    }

    for hole in 0..holes {
        let lits: Vec<i32> = (0..pigeons).map(|pigeon| sits(pigeon, hole)).collect();
        at_most_one_commander(&mut solver, &lits, 3).unwrap();
    }

    assert_eq!(solver.sat(3), Ok(0));
    assert!(solver.okay());
    assert_eq!(solver.sat(-1), Ok(20));
}

#[test]
fn sequential_counter_bounds_models() {
    init_logging();
    let mut solver = create(EngineKind::Simp);
    let lits: Vec<i32> = (0..6).map(|_| solver.new_variable(VarFlags::empty())).collect();

    at_most_k_sequential(&mut *solver, &lits, 2).unwrap();
    solver.add_clause(&lits[..3]).unwrap();
    solver.add_clause(&lits[3..]).unwrap();

    let mut models = 0;
    while solver.solve().unwrap() == SolveResult::Sat {
        models += 1;
        let true_count = lits
            .iter()
            .filter(|&&lit| solver.model_value(lit).unwrap() == 1)
            .count();
        assert_eq!(true_count, 2);

        let blocking: Vec<i32> = lits
            .iter()
            .map(|&lit| -lit * solver.model_value(lit).unwrap())
            .collect();
        solver.add_clause(&blocking).unwrap();
    }

    assert_eq!(models, 9);
}

#[test]
fn version_information() {
    assert!(!incsat::version().is_empty());
    assert_eq!(incsat::api_version(), 1);
}
