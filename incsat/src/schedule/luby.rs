//! The reluctant doubling Luby sequence.
//!
//! This sequence is [A182105](https://oeis.org/A182105).

/// Infinite iterator yielding the Luby sequence.
pub struct LubySequence {
    u: u64,
    v: u64,
}

impl Default for LubySequence {
    fn default() -> LubySequence {
        LubySequence { u: 1, v: 1 }
    }
}

impl Iterator for LubySequence {
    type Item = u64;

    /// Yields the next number of the Luby sequence.
    fn next(&mut self) -> Option<u64> {
        let result = self.v;

        // Knuth's method, see "The Art of Computer Programming", Vol. 4B, 7.2.2.2
        if (self.u & self.u.wrapping_neg()) == self.v {
            self.u += 1;
            self.v = 1;
        } else {
            self.v <<= 1;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luby_sequence() {
        let initial_terms: Vec<_> = LubySequence::default().take(64).collect();

        assert_eq!(
            initial_terms,
            vec![
                1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2,
                4, 8, 16, 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, 1, 1, 2, 1, 1, 2, 4, 1, 1,
                2, 1, 1, 2, 4, 8, 16, 32, 1,
            ]
        )
    }
}
