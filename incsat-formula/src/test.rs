//! Proptest strategies for solver tests.
use proptest::{prelude::*, *};

use rand::distributions::Bernoulli;
use rand::seq::SliceRandom;

use crate::cnf::CnfFormula;
use crate::lit::Lit;

/// Generate small hard unsat instances.
///
/// Follows the sgen construction (http://www.cs.qub.ac.uk/~i.spence/sgen/) with random
/// partitions: two partitions of the variables into blocks of four, at most one literal true per
/// block in the first and at least one true per block in the second.
pub fn sgen_unsat_formula(
    blocks: impl Strategy<Value = usize>,
) -> impl Strategy<Value = CnfFormula> {
    blocks.prop_flat_map(|blocks| {
        collection::vec(bool::ANY, blocks * 4 + 1).prop_perturb(|polarity, mut rng| {
            let mut clauses: Vec<Vec<Lit>> = vec![];
            let mut lits = polarity
                .into_iter()
                .enumerate()
                .map(|(index, polarity)| Lit::from_index(index, polarity))
                .collect::<Vec<_>>();

            for &invert in [false, true].iter() {
                lits.shuffle(&mut rng);
                for block in lits.chunks_exact(4) {
                    for a in 0..4 {
                        for b in 0..a {
                            for c in 0..b {
                                let mut clause =
                                    vec![block[a] ^ invert, block[b] ^ invert, block[c] ^ invert];
                                clause.shuffle(&mut rng);
                                clauses.push(clause);
                            }
                        }
                    }
                }
                let &extra = lits.last().unwrap();
                for b in 0..4 {
                    for c in 0..b {
                        let mut clause = vec![extra ^ invert, lits[b] ^ invert, lits[c] ^ invert];
                        clause.shuffle(&mut rng);
                        clauses.push(clause);
                    }
                }
            }

            clauses.shuffle(&mut rng);
            CnfFormula::from(clauses)
        })
    })
}

/// Generate a satisfiable instance.
///
/// Picks a random full assignment and then only generates clauses that contain at least one
/// literal true under that assignment.
pub fn sat_formula(
    vars: impl Strategy<Value = usize>,
    clause_count: impl Strategy<Value = usize>,
    density: impl Strategy<Value = f64>,
    polarity_dist: impl Strategy<Value = f64>,
) -> impl Strategy<Value = CnfFormula> {
    (vars, clause_count, density, polarity_dist).prop_flat_map(
        |(vars, clause_count, density, polarity_dist)| {
            let density = Bernoulli::new(density).unwrap();
            let polarity_dist = Bernoulli::new(polarity_dist).unwrap();

            collection::vec(bool::ANY, vars).prop_perturb(move |polarity, mut rng| {
                let mut clauses: Vec<Vec<Lit>> = vec![];
                let lits = polarity
                    .into_iter()
                    .enumerate()
                    .map(|(index, polarity)| Lit::from_index(index, polarity))
                    .collect::<Vec<_>>();

                for _ in 0..clause_count {
                    let &fixed_lit = lits.choose(&mut rng).unwrap();
                    let mut clause = vec![fixed_lit];
                    for &lit in lits.iter() {
                        if lit != fixed_lit && rng.sample(density) {
                            clause.push(lit ^ rng.sample(polarity_dist));
                        }
                    }
                    clause.shuffle(&mut rng);
                    clauses.push(clause);
                }

                clauses.shuffle(&mut rng);
                let mut formula = CnfFormula::from(clauses);
                formula.set_var_count(vars);
                formula
            })
        },
    )
}
