//! PSO run configuration.

use serde::{Deserialize, Serialize};

use paropt_types::{config_error, OptResult};

/// Which social term the velocity update uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PsoVariant {
    /// Particles tend toward the best position known to the population.
    PopulationBest,
    /// Particles tend toward the best position in their ring neighborhood.
    NeighborhoodBest,
}

impl Default for PsoVariant {
    fn default() -> Self {
        Self::PopulationBest
    }
}

/// Inertia weight as a function of the generation index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InertiaSchedule {
    /// Fixed inertia for the whole run.
    Constant(f64),
    /// Linear decay: `start - decay * generation / generations`.
    LinearDecay { start: f64, decay: f64 },
}

impl InertiaSchedule {
    pub fn value(&self, generation: usize, generations: usize) -> f64 {
        match *self {
            Self::Constant(w) => w,
            Self::LinearDecay { start, decay } => {
                start - decay * generation as f64 / generations.max(1) as f64
            }
        }
    }
}

impl Default for InertiaSchedule {
    fn default() -> Self {
        // Start at 1.0 and shed 0.7 over the full run.
        Self::LinearDecay {
            start: 1.0,
            decay: 0.7,
        }
    }
}

/// Top-level configuration for one `optimize()` call. Immutable for the
/// duration of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsoConfig {
    pub variant: PsoVariant,

    /// Number of particles per swarm.
    pub particles: usize,

    /// Number of generations per swarm.
    pub generations: usize,

    /// Number of independent swarm restarts; the best result is tracked
    /// across all of them.
    pub swarms: usize,

    /// Cognitive coefficient: pull toward a particle's own best position.
    pub c1: f64,

    /// Social coefficient: pull toward the leader position.
    pub c2: f64,

    pub inertia: InertiaSchedule,

    /// Worker-thread count for constructors that build evaluators from a
    /// factory. `None` means the host's available core count.
    pub workers: Option<usize>,

    /// Seed for the run's random generator. `None` draws a fresh seed;
    /// setting it makes two identically configured runs reproduce the same
    /// particle trajectories.
    pub seed: Option<u64>,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            variant: PsoVariant::PopulationBest,
            particles: 1000,
            generations: 100,
            swarms: 1,
            c1: 0.7,
            c2: 0.2,
            inertia: InertiaSchedule::default(),
            workers: None,
            seed: None,
        }
    }
}

impl PsoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variant(mut self, variant: PsoVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_particles(mut self, n: usize) -> Self {
        self.particles = n;
        self
    }

    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    pub fn with_swarms(mut self, n: usize) -> Self {
        self.swarms = n;
        self
    }

    pub fn with_coefficients(mut self, c1: f64, c2: f64) -> Self {
        self.c1 = c1;
        self.c2 = c2;
        self
    }

    pub fn with_inertia(mut self, inertia: InertiaSchedule) -> Self {
        self.inertia = inertia;
        self
    }

    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = Some(n);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> OptResult<()> {
        if self.particles == 0 {
            return Err(config_error!("particle count must be at least 1"));
        }
        if self.generations == 0 {
            return Err(config_error!("generation count must be at least 1"));
        }
        if self.swarms == 0 {
            return Err(config_error!("swarm count must be at least 1"));
        }
        if let Some(0) = self.workers {
            return Err(config_error!("worker count must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = PsoConfig::default();
        assert_eq!(config.variant, PsoVariant::PopulationBest);
        assert_eq!(config.particles, 1000);
        assert_eq!(config.generations, 100);
        assert_eq!(config.swarms, 1);
        assert_eq!(config.c1, 0.7);
        assert_eq!(config.c2, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_chain() {
        let config = PsoConfig::new()
            .with_variant(PsoVariant::NeighborhoodBest)
            .with_particles(50)
            .with_generations(20)
            .with_swarms(3)
            .with_coefficients(1.5, 1.5)
            .with_workers(2)
            .with_seed(7);
        assert_eq!(config.particles, 50);
        assert_eq!(config.swarms, 3);
        assert_eq!(config.seed, Some(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_counts_rejected() {
        assert!(PsoConfig::new().with_particles(0).validate().is_err());
        assert!(PsoConfig::new().with_generations(0).validate().is_err());
        assert!(PsoConfig::new().with_swarms(0).validate().is_err());
        assert!(PsoConfig::new().with_workers(0).validate().is_err());
    }

    #[test]
    fn linear_decay_schedule() {
        let schedule = InertiaSchedule::LinearDecay {
            start: 1.0,
            decay: 0.7,
        };
        assert_eq!(schedule.value(0, 100), 1.0);
        assert!((schedule.value(50, 100) - 0.65).abs() < 1e-12);
        assert!((schedule.value(100, 100) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn constant_schedule() {
        let schedule = InertiaSchedule::Constant(0.8);
        assert_eq!(schedule.value(0, 10), 0.8);
        assert_eq!(schedule.value(9, 10), 0.8);
    }
}
