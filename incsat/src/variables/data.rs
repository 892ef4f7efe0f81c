//! Data associated with variables.

/// Data associated with variables.
#[derive(Clone, Debug)]
pub struct VarData {
    /// Polarity used for decisions, overriding the saved phase.
    pub polarity: Option<bool>,
    /// Whether the search may branch on this variable.
    pub decision: bool,
    /// Whether the variable is protected from elimination.
    ///
    /// Variables that may be used in later clauses need to be frozen.
    pub frozen: bool,
    /// Whether the variable was removed by variable elimination.
    pub eliminated: bool,
}

impl Default for VarData {
    fn default() -> VarData {
        VarData {
            polarity: None,
            decision: true,
            frozen: false,
            eliminated: false,
        }
    }
}
