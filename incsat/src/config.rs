//! Solver configuration.
use serde::Deserialize;

use incsat_macros::{ConfigHelp, DocDefault};

use crate::solver::SolverError;

/// Configurable parameters used during solving and simplification.
#[derive(DocDefault, ConfigHelp, Clone, Debug)]
pub struct SolverConfig {
    /// Multiplicative decay for the VSIDS decision heuristic. (Default: 0.95)
    pub vsids_decay: f32,

    /// Multiplicative decay for clause activities. (Default: 0.999)
    pub clause_activity_decay: f32,

    /// Number of conflicts between local clause reductions. (Default: 15000)
    pub reduce_locals_interval: u64,

    /// Number of conflicts between mid clause reductions. (Default: 10000)
    pub reduce_mids_interval: u64,

    /// Scaling factor for luby sequence based restarts (number of conflicts). (Default: 128)
    pub luby_restart_interval_scale: u64,

    /// Number of clauses variable elimination may add on top of the clauses it removes.
    /// (Default: 0)
    pub elim_grow_limit: usize,

    /// Variables producing a resolvent longer than this are not eliminated. (Default: 20)
    pub elim_resolvent_limit: usize,

    /// Variables occurring in more clauses than this are not eliminated. (Default: 64)
    pub elim_occurrence_limit: usize,

    /// Clauses longer than this are not used to subsume other clauses. (Default: 100)
    pub subsumption_limit: usize,
}

/// Partial update of a [`SolverConfig`].
///
/// Every field that is `Some` overrides the corresponding field of the config it is applied to.
/// Can be deserialized, e.g. from a TOML file.
#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SolverConfigUpdate {
    pub vsids_decay: Option<f32>,
    pub clause_activity_decay: Option<f32>,
    pub reduce_locals_interval: Option<u64>,
    pub reduce_mids_interval: Option<u64>,
    pub luby_restart_interval_scale: Option<u64>,
    pub elim_grow_limit: Option<usize>,
    pub elim_resolvent_limit: Option<usize>,
    pub elim_occurrence_limit: Option<usize>,
    pub subsumption_limit: Option<usize>,
}

fn check_decay(name: &str, decay: f32) -> Result<(), SolverError> {
    if decay > 1.0 / 16.0 && decay < 1.0 {
        Ok(())
    } else {
        Err(SolverError::InvalidConfig(format!(
            "{} must be between 0.0625 and 1.0 (exclusive), got {}",
            name, decay
        )))
    }
}

fn check_positive(name: &str, value: u64) -> Result<(), SolverError> {
    if value > 0 {
        Ok(())
    } else {
        Err(SolverError::InvalidConfig(format!(
            "{} must be positive",
            name
        )))
    }
}

impl SolverConfigUpdate {
    pub fn new() -> SolverConfigUpdate {
        SolverConfigUpdate::default()
    }

    /// Overrides the fields of `self` with all fields set in `other`.
    pub fn merge(&mut self, other: SolverConfigUpdate) {
        macro_rules! merge_fields {
            ($($field:ident),*) => {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )*
            };
        }
        merge_fields!(
            vsids_decay,
            clause_activity_decay,
            reduce_locals_interval,
            reduce_mids_interval,
            luby_restart_interval_scale,
            elim_grow_limit,
            elim_resolvent_limit,
            elim_occurrence_limit,
            subsumption_limit
        );
    }

    /// Applies the update to a config.
    ///
    /// The config is left unchanged when any of the new values is out of range.
    pub fn apply(&self, config: &mut SolverConfig) -> Result<(), SolverError> {
        let mut updated = config.clone();

        if let Some(decay) = self.vsids_decay {
            check_decay("vsids_decay", decay)?;
            updated.vsids_decay = decay;
        }
        if let Some(decay) = self.clause_activity_decay {
            check_decay("clause_activity_decay", decay)?;
            updated.clause_activity_decay = decay;
        }
        if let Some(interval) = self.reduce_locals_interval {
            check_positive("reduce_locals_interval", interval)?;
            updated.reduce_locals_interval = interval;
        }
        if let Some(interval) = self.reduce_mids_interval {
            check_positive("reduce_mids_interval", interval)?;
            updated.reduce_mids_interval = interval;
        }
        if let Some(scale) = self.luby_restart_interval_scale {
            check_positive("luby_restart_interval_scale", scale)?;
            updated.luby_restart_interval_scale = scale;
        }
        if let Some(limit) = self.elim_grow_limit {
            updated.elim_grow_limit = limit;
        }
        if let Some(limit) = self.elim_resolvent_limit {
            updated.elim_resolvent_limit = limit;
        }
        if let Some(limit) = self.elim_occurrence_limit {
            updated.elim_occurrence_limit = limit;
        }
        if let Some(limit) = self.subsumption_limit {
            updated.subsumption_limit = limit;
        }

        *config = updated;
        Ok(())
    }
}
