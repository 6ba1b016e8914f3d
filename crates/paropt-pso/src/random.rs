//! One-shot random-search baseline.
//!
//! Samples a fixed budget of uniform candidates, evaluates them all through
//! the same work-queue barrier the swarm scheduler uses, and keeps the
//! minimum. Useful as a sanity baseline for the fitness function and the
//! worker setup before committing to a long swarm run.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use paropt_engine::{evaluate_batch, Evaluator, WorkItem, WorkQueue, WorkerPool};
use paropt_types::{config_error, Candidate, OptResult, ParameterBounds};

use crate::swarm::sample_position;

/// Default number of samples per search-space dimension.
pub const DEFAULT_SAMPLES_PER_DIM: usize = 200;

pub struct RandomSearchOptimizer {
    bounds: ParameterBounds,
    samples_per_dim: usize,
    evaluators: Option<Vec<Box<dyn Evaluator>>>,
    rng: ChaCha8Rng,
    best: Option<Candidate>,
    failures: usize,
}

impl RandomSearchOptimizer {
    pub fn new(
        bounds: ParameterBounds,
        evaluators: Vec<Box<dyn Evaluator>>,
    ) -> OptResult<Self> {
        bounds.validate()?;
        if evaluators.is_empty() {
            return Err(config_error!("at least one evaluator is required"));
        }
        Ok(Self {
            bounds,
            samples_per_dim: DEFAULT_SAMPLES_PER_DIM,
            evaluators: Some(evaluators),
            rng: ChaCha8Rng::seed_from_u64(rand::thread_rng().gen()),
            best: None,
            failures: 0,
        })
    }

    pub fn with_samples_per_dim(mut self, samples: usize) -> Self {
        self.samples_per_dim = samples.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Evaluate the whole sample budget in one round and return the best
    /// fitness found. Single-shot, like [`crate::PsoOptimizer::optimize`].
    pub fn optimize(&mut self) -> OptResult<f64> {
        let evaluators = self
            .evaluators
            .take()
            .ok_or_else(|| config_error!("optimize() may only be called once per optimizer"))?;
        let worker_count = evaluators.len();
        let total = self.samples_per_dim * self.bounds.len();

        let queue = Arc::new(WorkQueue::new());
        queue.set_chunk_size(WorkQueue::chunk_size_for(total, worker_count));
        info!(candidates = total, workers = worker_count, "starting random search");

        let mut pool = WorkerPool::start(Arc::clone(&queue), evaluators)?;

        let items = (0..total)
            .map(|slot| {
                WorkItem::new(
                    slot,
                    Candidate::unevaluated(sample_position(&self.bounds, &mut self.rng)),
                )
            })
            .collect();
        let results = evaluate_batch(&queue, items);

        let mut best = Candidate::unevaluated(Vec::new());
        for item in results {
            if item.candidate.improves_on(&best) {
                best = item.candidate;
            }
        }

        queue.shutdown();
        pool.stop();
        self.failures = queue.failures();

        info!(fitness = best.fitness, "random search finished");
        let fitness = best.fitness;
        self.best = Some(best);
        Ok(fitness)
    }

    /// Best candidate found. Valid after `optimize` returns.
    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref()
    }

    pub fn failures(&self) -> usize {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluators(n: usize, f: fn(&[f64]) -> f64) -> Vec<Box<dyn Evaluator>> {
        (0..n).map(|_| Box::new(f) as Box<dyn Evaluator>).collect()
    }

    #[test]
    fn finds_a_low_point_on_a_quadratic() {
        let bounds = ParameterBounds::new().register(-10.0, 10.0);
        let mut opt = RandomSearchOptimizer::new(bounds, evaluators(4, |p| (p[0] - 3.0).powi(2)))
            .unwrap()
            .with_seed(1);

        let fitness = opt.optimize().unwrap();
        // 200 uniform samples over [-10, 10] land well within 1.0 of x = 3.
        assert!(fitness < 1.0, "fitness {fitness} too high");
        assert!((opt.best().unwrap().params[0] - 3.0).abs() < 1.0);
    }

    #[test]
    fn minimizes_not_maximizes() {
        let bounds = ParameterBounds::new().register(0.0, 1.0);
        let mut opt = RandomSearchOptimizer::new(bounds, evaluators(2, |p| p[0]))
            .unwrap()
            .with_seed(2);
        let fitness = opt.optimize().unwrap();
        assert!(fitness < 0.1, "expected a value near the low end, got {fitness}");
    }

    #[test]
    fn deterministic_with_seed() {
        let run = || {
            let bounds = ParameterBounds::new().register(-5.0, 5.0).register(-5.0, 5.0);
            let mut opt =
                RandomSearchOptimizer::new(bounds, evaluators(3, |p| p[0].abs() + p[1].abs()))
                    .unwrap()
                    .with_seed(77);
            opt.optimize().unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn sample_budget_scales_with_dimensions() {
        let bounds = ParameterBounds::new().register(0.0, 1.0).register(0.0, 1.0);
        let mut opt = RandomSearchOptimizer::new(bounds, evaluators(2, |_| 0.0))
            .unwrap()
            .with_samples_per_dim(10)
            .with_seed(3);
        opt.optimize().unwrap();
        // All 20 candidates scored zero; the best must be one of them.
        assert_eq!(opt.best().unwrap().fitness, 0.0);
    }

    #[test]
    fn single_shot() {
        let bounds = ParameterBounds::new().register(0.0, 1.0);
        let mut opt = RandomSearchOptimizer::new(bounds, evaluators(1, |p| p[0]))
            .unwrap()
            .with_seed(4);
        opt.optimize().unwrap();
        assert!(opt.optimize().is_err());
    }
}
