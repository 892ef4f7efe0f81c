use std::env;
use std::fs;
use std::io::Write;

use anyhow::{Context, Error};
use clap::{value_t, values_t, App, AppSettings, Arg, ArgMatches, SubCommand};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};
use rand::{rngs::StdRng, SeedableRng};

use incsat::config::{SolverConfig, SolverConfigUpdate};
use incsat::posets::count_posets;
use incsat::{create_with, CnfFormula, EngineKind, IncrementalSolver, SolveResult, VarFlags};
use incsat_formula::gen::{pigeon_hole, random_k_sat};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{:#}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            let level = record.level().to_string().to_lowercase();
            writeln!(buf, "c {}: {}", level, record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("INCSAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is incsat {}", env!("INCSAT_VERSION"));
    info!(
        "  {} build - {}",
        env!("INCSAT_PROFILE"),
        env!("INCSAT_RUSTC_VERSION")
    );
}

fn app() -> App<'static, 'static> {
    App::new("incsat")
        .version(env!("INCSAT_VERSION"))
        .about("Builds benchmark formulas and solves them incrementally")
        .setting(AppSettings::DisableHelpSubcommand)
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::from_usage("[engine] --engine=[ENGINE] 'Solver engine to use'")
                .possible_values(&["plain", "simp"])
                .default_value("simp"),
        )
        .arg_from_usage("[config-file] --config=[FILE] 'Read parameters from configuration file'")
        .arg(
            Arg::from_usage("[config-option] -C --config-option")
                .value_name("OPTION>=<VALUE")
                .help(
                    "Specify a single config option, see 'incsat -C help' for a list of options.",
                )
                .multiple(true)
                .number_of_values(1),
        )
        .arg_from_usage(
            "[decision-limit] --decision-limit=[N] 'Stop each search after N decisions'",
        )
        .subcommand(
            SubCommand::with_name("posets")
                .about("Count the partial orders on SIZE elements by enumerating all models")
                .arg_from_usage("<SIZE> 'Number of elements'"),
        )
        .subcommand(
            SubCommand::with_name("pigeonhole")
                .about("Solve the unsatisfiable pigeonhole formula for HOLES holes")
                .arg_from_usage("<HOLES> 'Number of holes'"),
        )
        .subcommand(
            SubCommand::with_name("random")
                .about("Solve a uniform random k-SAT formula")
                .arg_from_usage("<VARS> 'Number of variables'")
                .arg_from_usage("<CLAUSES> 'Number of clauses'")
                .arg(
                    Arg::from_usage("[width] --width=[K] 'Literals per clause'")
                        .default_value("3"),
                )
                .arg(
                    Arg::from_usage("[seed] --seed=[SEED] 'Seed of the random generator'")
                        .default_value("0"),
                ),
        )
}

fn main_with_err() -> Result<i32, Error> {
    let matches = app().get_matches();

    let config_options = values_t!(matches, "config-option", String).unwrap_or_default();

    if config_options.iter().any(|option| option == "help") {
        print!("{}", SolverConfig::help());
        return Ok(0);
    }

    init_logging();
    banner();

    let mut config_update = SolverConfigUpdate::new();

    if let Some(config_path) = matches.value_of("config-file") {
        let config_contents = fs::read_to_string(config_path)
            .with_context(|| format!("reading config file '{}'", config_path))?;

        config_update.merge(
            toml::from_str(&config_contents)
                .with_context(|| format!("parsing config file '{}'", config_path))?,
        );
    }

    for config_option in config_options {
        config_update.merge(
            toml::from_str(&config_option)
                .with_context(|| format!("parsing config option '{}'", config_option))?,
        );
    }

    let kind: EngineKind = matches.value_of("engine").unwrap_or("simp").parse()?;

    let decision_limit = match matches.value_of("decision-limit") {
        Some(_) => Some(value_t!(matches, "decision-limit", u64)?),
        None => None,
    };

    let mut solver = new_engine(kind, &config_update, decision_limit)?;

    info!("Using the {:?} engine", kind);

    match matches.subcommand() {
        ("posets", Some(matches)) => posets_main(&mut *solver, matches),
        ("pigeonhole", Some(matches)) => {
            let holes = value_t!(matches, "HOLES", usize)?;
            info!("Pigeonhole formula with {} holes", holes);
            solve_formula(&mut *solver, &pigeon_hole(holes))
        }
        ("random", Some(matches)) => {
            let vars = value_t!(matches, "VARS", usize)?;
            let clauses = value_t!(matches, "CLAUSES", usize)?;
            let width = value_t!(matches, "width", usize)?;
            let seed = value_t!(matches, "seed", u64)?;

            anyhow::ensure!(
                width <= vars,
                "clause width {} exceeds variable count {}",
                width,
                vars
            );

            info!("Random {}-SAT formula with seed {}", width, seed);
            let mut rng = StdRng::seed_from_u64(seed);
            solve_formula(&mut *solver, &random_k_sat(&mut rng, vars, clauses, width))
        }
        _ => {
            println!("{}", matches.usage());
            Ok(1)
        }
    }
}

fn new_engine(
    kind: EngineKind,
    config_update: &SolverConfigUpdate,
    decision_limit: Option<u64>,
) -> Result<Box<dyn IncrementalSolver + Send>, Error> {
    let mut solver = create_with(kind, config_update)?;
    solver.set_decision_limit(decision_limit);
    Ok(solver)
}

fn posets_main(solver: &mut dyn IncrementalSolver, matches: &ArgMatches) -> Result<i32, Error> {
    let size = value_t!(matches, "SIZE", usize)?;
    let count = count_posets(solver, size)?;
    println!("Number of posets of size {} is: {}", size, count);
    Ok(0)
}

/// Add the clauses of a formula, solve it and print the result in the usual SAT competition
/// format.
fn solve_formula(solver: &mut dyn IncrementalSolver, formula: &CnfFormula) -> Result<i32, Error> {
    info!(
        "Formula with {} variables and {} clauses",
        formula.var_count(),
        formula.len()
    );

    for _ in 0..formula.var_count() {
        solver.new_variable(VarFlags::ELIMINATE);
    }

    let mut clause = vec![];
    for lits in formula.iter() {
        clause.clear();
        clause.extend(lits.iter().map(|lit| lit.to_signed()));
        solver.add_clause(&clause)?;
    }

    let result = solver.solve()?;

    match result {
        SolveResult::Sat => {
            println!("s SATISFIABLE");
            print!("v");
            for var in 1..=formula.var_count() as i32 {
                match solver.model_value(var)? {
                    0 => (),
                    value => print!(" {}", var * value),
                }
            }
            println!(" 0");
        }
        SolveResult::Unsat => println!("s UNSATISFIABLE"),
        SolveResult::Unknown => println!("s UNKNOWN"),
    }

    Ok(result.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let matches = app()
            .get_matches_from_safe(vec!["incsat", "--engine=plain", "random", "20", "80"])
            .unwrap();
        assert_eq!(matches.value_of("engine"), Some("plain"));

        let (name, sub_matches) = matches.subcommand();
        assert_eq!(name, "random");
        let sub_matches = sub_matches.unwrap();
        assert_eq!(sub_matches.value_of("width"), Some("3"));
        assert_eq!(sub_matches.value_of("seed"), Some("0"));

        assert!(app()
            .get_matches_from_safe(vec!["incsat", "--engine=minisat", "posets", "3"])
            .is_err());
    }

    #[test]
    fn config_options_are_toml() {
        let update: SolverConfigUpdate = toml::from_str("elim_grow_limit = 2").unwrap();
        assert_eq!(update.elim_grow_limit, Some(2));
        assert!(toml::from_str::<SolverConfigUpdate>("no_such_option = 2").is_err());
    }

    #[test]
    fn solves_generated_formulas() {
        let mut solver = new_engine(EngineKind::Plain, &SolverConfigUpdate::new(), None).unwrap();
        assert_eq!(solve_formula(&mut *solver, &pigeon_hole(3)).unwrap(), 20);

        let mut solver = new_engine(EngineKind::Plain, &SolverConfigUpdate::new(), Some(0)).unwrap();
        assert_eq!(solve_formula(&mut *solver, &pigeon_hole(5)).unwrap(), 0);

        let mut solver = new_engine(EngineKind::Simp, &SolverConfigUpdate::new(), None).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let formula = random_k_sat(&mut rng, 20, 40, 3);
        assert_eq!(solve_formula(&mut *solver, &formula).unwrap(), 10);
    }
}
