//! # paropt-pso
//!
//! Particle swarm optimization scheduler built on the paropt work-queue
//! engine, plus a one-shot random-search baseline.
//!
//! Implement [`Evaluator`] (or use any `FnMut(&[f64]) -> f64` closure) for
//! your fitness function, describe the space with
//! [`paropt_types::ParameterBounds`], and run:
//!
//! ```
//! use paropt_pso::{PsoConfig, PsoOptimizer};
//! use paropt_types::ParameterBounds;
//!
//! let bounds = ParameterBounds::new().register(-10.0, 10.0);
//! let config = PsoConfig::new()
//!     .with_particles(30)
//!     .with_generations(20)
//!     .with_seed(42);
//! let mut optimizer = PsoOptimizer::with_evaluator_factory(bounds, config, |_| {
//!     |p: &[f64]| (p[0] - 3.0).powi(2)
//! })
//! .unwrap();
//!
//! let fitness = optimizer.optimize().unwrap();
//! assert!(fitness < 0.1);
//! assert!((optimizer.best().unwrap().params[0] - 3.0).abs() < 0.5);
//! ```

mod config;
mod optimizer;
mod random;
mod swarm;

pub use config::{InertiaSchedule, PsoConfig, PsoVariant};
pub use optimizer::{ProgressCallback, PsoOptimizer};
pub use random::{RandomSearchOptimizer, DEFAULT_SAMPLES_PER_DIM};

pub use paropt_engine::Evaluator;
