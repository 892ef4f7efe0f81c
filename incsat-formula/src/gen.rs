//! Deterministic benchmark instance generators.
use rand::seq::index::sample;
use rand::Rng;

use crate::cnf::CnfFormula;
use crate::lit::{Lit, Var};

/// The pigeonhole principle for `holes + 1` pigeons and `holes` holes.
///
/// Variable `pigeon * holes + hole` is true when `pigeon` sits in `hole`. Every pigeon needs a
/// hole and no two pigeons share a hole, so the formula is unsatisfiable.
pub fn pigeon_hole(holes: usize) -> CnfFormula {
    let pigeons = holes + 1;
    let sits = |pigeon: usize, hole: usize| Lit::from_index(pigeon * holes + hole, true);

    let mut formula = CnfFormula::new();
    formula.set_var_count(pigeons * holes);

    for pigeon in 0..pigeons {
        formula.add_clause((0..holes).map(|hole| sits(pigeon, hole)));
    }

    for hole in 0..holes {
        for a in 0..pigeons {
            for b in 0..a {
                formula.add_clause(&[!sits(a, hole), !sits(b, hole)]);
            }
        }
    }

    formula
}

/// Uniform random k-SAT.
///
/// Each clause uses `k` distinct variables with independent random polarities. For `k = 3` the
/// satisfiability threshold is at about `4.26` clauses per variable.
pub fn random_k_sat(rng: &mut impl Rng, vars: usize, clauses: usize, k: usize) -> CnfFormula {
    assert!(k <= vars, "clause width {} exceeds variable count {}", k, vars);

    let mut formula = CnfFormula::new();
    formula.set_var_count(vars);

    let mut clause = Vec::with_capacity(k);
    for _ in 0..clauses {
        clause.clear();
        for index in sample(rng, vars, k).into_iter() {
            let polarity = rng.gen::<bool>();
            clause.push(Var::from_index(index).lit(polarity));
        }
        formula.add_clause(&clause);
    }

    formula
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn pigeon_hole_shape() {
        let formula = pigeon_hole(4);
        assert_eq!(formula.var_count(), 20);
        // 5 "needs a hole" clauses and 4 * C(5, 2) exclusion clauses
        assert_eq!(formula.len(), 5 + 4 * 10);
    }

    #[test]
    fn random_k_sat_is_reproducible() {
        let a = random_k_sat(&mut StdRng::seed_from_u64(7), 50, 213, 3);
        let b = random_k_sat(&mut StdRng::seed_from_u64(7), 50, 213, 3);
        assert_eq!(a, b);
        assert_eq!(a.len(), 213);
        for clause in a.iter() {
            assert_eq!(clause.len(), 3);
            let mut vars: Vec<_> = clause.iter().map(|lit| lit.var()).collect();
            vars.dedup();
            vars.sort();
            vars.dedup();
            assert_eq!(vars.len(), 3);
        }
    }
}
