//! Parameter space and candidate definitions.

use serde::{Deserialize, Serialize};

use crate::config_error;
use crate::errors::OptResult;

/// A concrete parameter vector, one value per registered dimension.
pub type Parameters = Vec<f64>;

/// One dimension of the search space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub min: f64,
    pub max: f64,
}

impl Bound {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// The bounded parameter space: an ordered list of `(min, max)` pairs.
///
/// The dimension count is fixed once a search starts; `validate` must pass
/// before any worker thread is created.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub bounds: Vec<Bound>,
}

impl ParameterBounds {
    pub fn new() -> Self {
        Self { bounds: Vec::new() }
    }

    /// Register one more dimension with the given range.
    pub fn register(mut self, min: f64, max: f64) -> Self {
        self.bounds.push(Bound { min, max });
        self
    }

    /// Number of dimensions in the space.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn min(&self, dim: usize) -> f64 {
        self.bounds[dim].min
    }

    pub fn max(&self, dim: usize) -> f64 {
        self.bounds[dim].max
    }

    /// Clamp a coordinate to its dimension's range.
    pub fn clamp(&self, dim: usize, value: f64) -> f64 {
        let b = &self.bounds[dim];
        value.clamp(b.min, b.max)
    }

    /// Check the setup invariants: at least one dimension, and
    /// `min <= max` everywhere. Called before any search starts.
    pub fn validate(&self) -> OptResult<()> {
        if self.bounds.is_empty() {
            return Err(config_error!("parameter bounds are empty; register at least one dimension"));
        }
        for (dim, b) in self.bounds.iter().enumerate() {
            if !(b.min <= b.max) {
                return Err(config_error!(
                    "invalid bound at dimension {dim}: min {} > max {}",
                    b.min,
                    b.max
                ));
            }
        }
        Ok(())
    }

    /// Check that a parameter vector matches this space's dimension count.
    pub fn check_dims(&self, params: &[f64]) -> OptResult<()> {
        if params.len() != self.bounds.len() {
            return Err(config_error!(
                "parameter vector has {} values but the space has {} dimensions",
                params.len(),
                self.bounds.len()
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// One parameter vector plus its fitness. Lower fitness is better.
///
/// A candidate starts with the `INFINITY` sentinel and is written exactly
/// once per round by whichever worker evaluates it. A candidate whose
/// evaluator panicked keeps the sentinel and is marked `failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub params: Parameters,
    pub fitness: f64,
    pub failed: bool,
}

impl Candidate {
    /// Fitness sentinel for a candidate that has not been evaluated yet.
    pub const UNEVALUATED: f64 = f64::INFINITY;

    pub fn unevaluated(params: Parameters) -> Self {
        Self {
            params,
            fitness: Self::UNEVALUATED,
            failed: false,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness < Self::UNEVALUATED
    }

    /// Strict minimization comparison.
    pub fn improves_on(&self, other: &Candidate) -> bool {
        self.fitness < other.fitness
    }
}
