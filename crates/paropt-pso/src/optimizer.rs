//! The particle swarm scheduler.
//!
//! One coordinating thread owns all swarm state. Per generation it pushes
//! every particle position through the work queue, barrier-waits for the
//! exact result count, folds the fitness values back into the swarm, and
//! only then computes the next positions. Workers never see swarm state,
//! only the individual candidates handed to them.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use paropt_engine::{Evaluator, WorkItem, WorkQueue, WorkerPool};
use paropt_types::{config_error, Candidate, OptResult, ParameterBounds};

use crate::config::{PsoConfig, PsoVariant};
use crate::swarm::{init_swarm, update_leaders, Particle};

/// Notification hook for new-best announcements: `(best_fitness, progress)`
/// with progress in `[0, 1]`. Invoked synchronously on the coordinating
/// thread, at most once per generation, only on improvement.
pub type ProgressCallback = Box<dyn FnMut(f64, f64) + Send>;

/// Particle swarm optimizer over a caller-supplied fitness function.
///
/// Construct with one [`Evaluator`] per desired worker thread, optionally
/// register a progress callback, then call [`PsoOptimizer::optimize`] once.
/// The best candidate is available from [`PsoOptimizer::best`] afterwards.
pub struct PsoOptimizer {
    bounds: ParameterBounds,
    config: PsoConfig,
    evaluators: Option<Vec<Box<dyn Evaluator>>>,
    rng: ChaCha8Rng,
    observer: Option<ProgressCallback>,
    best: Option<Candidate>,
    failures: usize,
}

impl PsoOptimizer {
    /// Create an optimizer with an explicit set of per-worker evaluators.
    /// The worker count equals `evaluators.len()`.
    pub fn new(
        bounds: ParameterBounds,
        config: PsoConfig,
        evaluators: Vec<Box<dyn Evaluator>>,
    ) -> OptResult<Self> {
        bounds.validate()?;
        config.validate()?;
        if evaluators.is_empty() {
            return Err(config_error!("at least one evaluator is required"));
        }

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::seed_from_u64(rand::thread_rng().gen()),
        };

        Ok(Self {
            bounds,
            config,
            evaluators: Some(evaluators),
            rng,
            observer: None,
            best: None,
            failures: 0,
        })
    }

    /// Create an optimizer whose workers are built from a factory, one call
    /// per worker. The worker count comes from `config.workers`, defaulting
    /// to the host's available core count.
    pub fn with_evaluator_factory<E, F>(
        bounds: ParameterBounds,
        config: PsoConfig,
        factory: F,
    ) -> OptResult<Self>
    where
        E: Evaluator + 'static,
        F: Fn(usize) -> E,
    {
        let workers = config.workers.unwrap_or_else(default_worker_count);
        let evaluators = (0..workers)
            .map(|index| Box::new(factory(index)) as Box<dyn Evaluator>)
            .collect();
        Self::new(bounds, config, evaluators)
    }

    /// Register the new-best observer. Replaces any previous callback.
    pub fn set_new_best_callback(&mut self, callback: impl FnMut(f64, f64) + Send + 'static) {
        self.observer = Some(Box::new(callback));
    }

    /// Run the configured search and return the best fitness found.
    ///
    /// Consumes the evaluators; a second call is a configuration error.
    pub fn optimize(&mut self) -> OptResult<f64> {
        let evaluators = self
            .evaluators
            .take()
            .ok_or_else(|| config_error!("optimize() may only be called once per optimizer"))?;
        let worker_count = evaluators.len();

        let queue = Arc::new(WorkQueue::new());
        queue.set_chunk_size(WorkQueue::chunk_size_for(self.config.particles, worker_count));
        info!(
            particles = self.config.particles,
            generations = self.config.generations,
            swarms = self.config.swarms,
            workers = worker_count,
            variant = ?self.config.variant,
            chunk_size = queue.chunk_size(),
            "starting particle swarm optimization"
        );

        let mut pool = WorkerPool::start(Arc::clone(&queue), evaluators)?;

        let generations = self.config.generations;
        let swarms = self.config.swarms;
        let mut global_best = Candidate::unevaluated(Vec::new());

        for swarm_index in 0..swarms {
            if swarms > 1 {
                debug!(swarm = swarm_index, "starting swarm");
            }
            let mut particles = init_swarm(&self.bounds, self.config.particles, &mut self.rng);
            let mut swarm_best = Candidate::unevaluated(Vec::new());

            self.dispatch(&queue, &particles);

            for generation in 0..generations {
                let results = queue.wait_until_collected(self.config.particles);

                // Fold fitness values back into the swarm. Failed candidates
                // keep the sentinel and can never become a best.
                for item in results {
                    let particle = &mut particles[item.slot];
                    particle.fitness = item.candidate.fitness;
                    if item.candidate.improves_on(&particle.best) {
                        particle.best = item.candidate;
                    }
                }
                for particle in &particles {
                    if particle.best.improves_on(&swarm_best) {
                        swarm_best = particle.best.clone();
                    }
                }
                if swarm_best.improves_on(&global_best) {
                    global_best = swarm_best.clone();
                    let progress = (swarm_index * generations + generation) as f64
                        / (generations * swarms) as f64;
                    info!(fitness = global_best.fitness, progress, "new best fitness");
                    if let Some(observer) = self.observer.as_mut() {
                        observer(global_best.fitness, progress);
                    }
                }

                // The last barrier of a swarm is final: no further positions
                // are computed from it.
                if generation + 1 == generations {
                    break;
                }

                if self.config.variant == PsoVariant::NeighborhoodBest {
                    update_leaders(&mut particles);
                }
                let inertia = self.config.inertia.value(generation, generations);
                self.advance(&mut particles, inertia, &swarm_best, &global_best);
                self.dispatch(&queue, &particles);
            }
        }

        queue.shutdown();
        pool.stop();

        self.failures = queue.failures();
        if self.failures > 0 {
            warn!(failures = self.failures, "some evaluations failed during the run");
        }

        let fitness = global_best.fitness;
        self.best = Some(global_best);
        Ok(fitness)
    }

    /// Best candidate across the whole run. Valid after `optimize` returns.
    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref()
    }

    /// Number of evaluator faults absorbed during the run.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Enqueue every particle's current position and wake the workers.
    fn dispatch(&self, queue: &WorkQueue, particles: &[Particle]) {
        let items = particles
            .iter()
            .enumerate()
            .map(|(slot, p)| WorkItem::new(slot, Candidate::unevaluated(p.position.clone())))
            .collect();
        queue.enqueue(items);
        queue.notify_workers();
    }

    /// Velocity and position update for one generation. Positions are
    /// hard-clamped to the bounds; velocity is neither reset nor reflected,
    /// so a particle can sit on a wall while its velocity points outward.
    fn advance(
        &mut self,
        particles: &mut [Particle],
        inertia: f64,
        swarm_best: &Candidate,
        global_best: &Candidate,
    ) {
        let dims = self.bounds.len();

        // Snapshot of leader positions, taken before any particle moves.
        let leader_positions: Option<Vec<Vec<f64>>> = match self.config.variant {
            PsoVariant::NeighborhoodBest => {
                let leaders: Vec<usize> = particles.iter().map(|p| p.leader).collect();
                Some(
                    leaders
                        .into_iter()
                        .map(|l| particles[l].best.params.clone())
                        .collect(),
                )
            }
            PsoVariant::PopulationBest => None,
        };
        // In swarm-restart mode the social pull stays within the current
        // swarm; a single swarm follows the run-wide best.
        let population_best = if self.config.swarms > 1 {
            swarm_best
        } else {
            global_best
        };
        let population_ok = population_best.params.len() == dims;

        for (i, particle) in particles.iter_mut().enumerate() {
            for j in 0..dims {
                let leader_j = match &leader_positions {
                    Some(snapshot) => snapshot[i][j],
                    // Degenerate case: nothing evaluated yet (every candidate
                    // failed), fall back to the particle's own best.
                    None if !population_ok => particle.best.params[j],
                    None => population_best.params[j],
                };
                let r1: f64 = self.rng.gen();
                let r2: f64 = self.rng.gen();
                let velocity = inertia * particle.velocity[j]
                    + self.config.c1 * r1 * (particle.best.params[j] - particle.position[j])
                    + self.config.c2 * r2 * (leader_j - particle.position[j]);
                particle.velocity[j] = velocity;
                particle.position[j] = self.bounds.clamp(j, particle.position[j] + velocity);
            }
        }
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
