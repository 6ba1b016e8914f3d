//! Line-oriented persistence for optimized parameters.
//!
//! Format: the first line holds the dimension count `D`, followed by `D`
//! lines of three whitespace-separated reals, `value min max`. A missing or
//! corrupt file is not an error: loading falls back to "no prior state" with
//! a logged warning so a fresh random initialization can take over.

use std::fmt::Write as _;
use std::path::Path;

use tracing::{debug, warn};

use crate::errors::OptResult;
use crate::params::{Bound, ParameterBounds, Parameters};

/// Default location used by workers to pick up previous results.
pub const LAST_OPTIMIZED_PARAMETERS_FILE: &str = "last_optimized_parameters";

/// A parameter vector together with the bounds it was optimized under.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedParameters {
    pub values: Parameters,
    pub bounds: ParameterBounds,
}

impl SavedParameters {
    pub fn new(values: Parameters, bounds: ParameterBounds) -> Self {
        Self { values, bounds }
    }

    /// Load previously saved parameters.
    ///
    /// Returns `None` when the file is absent or malformed; neither case is
    /// fatal to a run.
    pub fn load(path: impl AsRef<Path>) -> Option<SavedParameters> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                debug!(path = %path.display(), %err, "no previous parameters found");
                return None;
            }
        };

        match parse(&text) {
            Some(saved) => Some(saved),
            None => {
                warn!(
                    path = %path.display(),
                    "parameter file is malformed; falling back to fresh initialization"
                );
                None
            }
        }
    }

    /// Write the parameters out in the `value min max` line format.
    pub fn save(&self, path: impl AsRef<Path>) -> OptResult<()> {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.values.len());
        for (i, value) in self.values.iter().enumerate() {
            let _ = writeln!(out, "{}\t{}\t{}", value, self.bounds.min(i), self.bounds.max(i));
        }
        std::fs::write(path, out)?;
        Ok(())
    }
}

fn parse(text: &str) -> Option<SavedParameters> {
    let mut lines = text.lines();
    let dims: usize = lines.next()?.trim().parse().ok()?;
    if dims == 0 {
        return None;
    }

    let mut values = Vec::with_capacity(dims);
    let mut bounds = ParameterBounds::new();
    for _ in 0..dims {
        let line = lines.next()?;
        let mut fields = line.split_whitespace();
        let value: f64 = fields.next()?.parse().ok()?;
        let min: f64 = fields.next()?.parse().ok()?;
        let max: f64 = fields.next()?.parse().ok()?;
        if fields.next().is_some() {
            return None;
        }
        values.push(value);
        bounds.bounds.push(Bound { min, max });
    }

    Some(SavedParameters { values, bounds })
}
