//! Variables and literals.
use std::{fmt, ops};

/// Integer type backing variables, literals and clause words.
pub type LitIdx = u32;

/// A boolean variable.
///
/// Variables are identified by a dense 0-based index. The external representation, used for
/// display and by the integer based solver interfaces, is 1-based so that a negated variable can
/// be written as a negative number.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var {
    index: LitIdx,
}

impl Var {
    /// Creates a variable from a 0-based index.
    #[inline]
    pub fn from_index(index: usize) -> Var {
        debug_assert!(index < Var::max_count());
        Var {
            index: index as LitIdx,
        }
    }

    /// Creates a variable from its 1-based external number.
    ///
    /// Returns `None` for numbers that are not positive or that exceed the supported range.
    #[inline]
    pub fn from_signed(number: i32) -> Option<Var> {
        if number <= 0 || number as usize > Var::max_count() {
            None
        } else {
            Some(Var::from_index(number as usize - 1))
        }
    }

    /// The 1-based external number of this variable.
    #[inline]
    pub fn to_signed(self) -> i32 {
        self.index as i32 + 1
    }

    /// The 0-based index of this variable.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Largest number of variables supported.
    ///
    /// Leaves a few high bits of a `LitIdx` free, so that a literal code fits into a clause word
    /// next to tag bits.
    pub const fn max_count() -> usize {
        (LitIdx::max_value() >> 4) as usize + 1
    }

    /// The literal of this variable with the given polarity.
    #[inline]
    pub fn lit(self, polarity: bool) -> Lit {
        Lit::from_var(self, polarity)
    }

    #[inline]
    pub fn positive(self) -> Lit {
        Lit::from_var(self, true)
    }

    #[inline]
    pub fn negative(self) -> Lit {
        Lit::from_var(self, false)
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_signed())
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A boolean literal, i.e. a variable or its negation.
///
/// The literal's `code` is `2 * var.index()` for the positive and `2 * var.index() + 1` for the
/// negative literal. Codes are dense and used to index per-literal tables such as watchlists.
/// Negating a literal flips the lowest bit of its code.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Lit {
    code: LitIdx,
}

impl Lit {
    /// The literal of `var` that is true when `var` has the value `polarity`.
    #[inline]
    pub fn from_var(var: Var, polarity: bool) -> Lit {
        Lit {
            code: (var.index << 1) | (!polarity as LitIdx),
        }
    }

    /// Shortcut for `Lit::from_var(Var::from_index(index), polarity)`.
    #[inline]
    pub fn from_index(index: usize, polarity: bool) -> Lit {
        Lit::from_var(Var::from_index(index), polarity)
    }

    /// The literal with the given code.
    #[inline]
    pub fn from_code(code: usize) -> Lit {
        debug_assert!(code < Var::max_count() * 2);
        Lit {
            code: code as LitIdx,
        }
    }

    /// Converts a 1-based signed integer into a literal.
    ///
    /// The magnitude selects the variable and the sign selects the polarity. Returns `None` for
    /// `0` and for magnitudes outside of the supported range.
    #[inline]
    pub fn from_signed(number: i32) -> Option<Lit> {
        let var = Var::from_signed(number.checked_abs()?)?;
        Some(var.lit(number > 0))
    }

    /// The 1-based signed integer representing this literal.
    #[inline]
    pub fn to_signed(self) -> i32 {
        let number = self.var().to_signed();
        if self.is_negative() {
            -number
        } else {
            number
        }
    }

    /// 0-based index of the literal's variable.
    #[inline]
    pub fn index(self) -> usize {
        (self.code >> 1) as usize
    }

    #[inline]
    pub fn var(self) -> Var {
        Var {
            index: self.code >> 1,
        }
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        (self.code & 1) != 0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        !self.is_negative()
    }

    #[inline]
    pub fn code(self) -> usize {
        self.code as usize
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit {
            code: self.code ^ 1,
        }
    }
}

/// Negates the literal when the right hand side is `true`.
impl ops::BitXor<bool> for Lit {
    type Output = Lit;

    #[inline]
    fn bitxor(self, rhs: bool) -> Lit {
        Lit {
            code: self.code ^ (rhs as LitIdx),
        }
    }
}

impl From<Var> for Lit {
    #[inline]
    fn from(var: Var) -> Lit {
        var.positive()
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_signed())
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;
    use proptest::{prelude::*, *};

    pub fn var(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Var> {
        index.prop_map(Var::from_index)
    }

    pub fn lit(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Lit> {
        (var(index), bool::ANY).prop_map(|(var, polarity)| var.lit(polarity))
    }
}

#[cfg(test)]
mod tests {
    use super::{strategy::*, *};

    use proptest::*;

    #[test]
    fn signed_conversion_rejects_zero_and_out_of_range() {
        assert_eq!(Lit::from_signed(0), None);
        assert_eq!(Var::from_signed(-3), None);
        assert_eq!(Lit::from_signed(i32::min_value()), None);
        assert_eq!(Lit::from_signed(Var::max_count() as i32 + 1), None);
        assert!(Lit::from_signed(Var::max_count() as i32).is_some());
    }

    #[test]
    fn code_layout() {
        assert_eq!(Lit::from_signed(1).unwrap().code(), 0);
        assert_eq!(Lit::from_signed(-1).unwrap().code(), 1);
        assert_eq!(Lit::from_signed(3).unwrap().code(), 4);
        assert_eq!(Lit::from_signed(-3).unwrap().code(), 5);
    }

    proptest! {
        #[test]
        fn negation_flips_low_bit(lit in lit(0..1000usize)) {
            prop_assert_eq!((!lit).code(), lit.code() ^ 1);
            prop_assert_eq!((!lit).var(), lit.var());
            prop_assert_eq!((!lit).to_signed(), -lit.to_signed());
            prop_assert_eq!(lit ^ true, !lit);
            prop_assert_eq!(lit ^ false, lit);
        }

        #[test]
        fn signed_form_is_inverse(number in prop_oneof![1..1000i32, -1000..-1i32]) {
            let lit = Lit::from_signed(number).unwrap();
            prop_assert_eq!(lit.to_signed(), number);
            prop_assert_eq!(lit.is_positive(), number > 0);
            prop_assert_eq!(Lit::from_code(lit.code()), lit);
        }
    }
}
