//! Variables, literals and CNF formulas used by the incsat solver.

/// Literal from a signed integer, for tests.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lit {
    ($x:expr) => {
        match $crate::lit::Lit::from_signed($x) {
            Some(lit) => lit,
            None => panic!("invalid literal {}", $x),
        }
    };
}

/// Variable from a positive integer, for tests.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! var {
    ($x:expr) => {
        match $crate::lit::Var::from_signed($x) {
            Some(var) => var,
            None => panic!("invalid variable {}", $x),
        }
    };
}

#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lits {
    ( $( $x:expr ),* ) => { [ $( $crate::lit!( $x ) ),* ] };
    ( $( $x:expr ),* , ) => { $crate::lits! [ $( $ x),* ] };
}

#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! cnf {
    ( $( $( $x:expr ),* );* ; ) => { [ $( &[ $( $crate::lit!( $x ) ),* ] as &[$crate::Lit] ),* ] };
}

#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! cnf_formula {
    ( $( $t:tt )* ) => { $crate::cnf::CnfFormula::from($crate::cnf![ $($t)* ].iter().cloned()) };
}

pub mod cnf;
pub mod lit;

#[cfg(feature = "generators")]
pub mod gen;

#[cfg(any(test, feature = "internal-testing"))]
pub mod test;

pub use cnf::CnfFormula;
pub use lit::{Lit, Var};
