//! Particle state and swarm initialization.

use rand::Rng;

use paropt_types::{Candidate, ParameterBounds, Parameters};

/// One particle: current position and velocity, its personal best, and the
/// index of its leader for the social term. Leaders are stable indices into
/// the swarm's particle vec rather than references, so they stay valid for
/// the whole life of the swarm.
#[derive(Debug, Clone)]
pub(crate) struct Particle {
    pub position: Parameters,
    pub velocity: Vec<f64>,
    /// Fitness of the current position, written back after each barrier.
    pub fitness: f64,
    /// Personal best position seen so far.
    pub best: Candidate,
    /// Index of the particle whose personal best drives the social term.
    pub leader: usize,
}

/// Uniform position within the bounds, one draw per dimension.
pub(crate) fn sample_position<R: Rng>(bounds: &ParameterBounds, rng: &mut R) -> Parameters {
    (0..bounds.len())
        .map(|d| rng.gen_range(bounds.min(d)..=bounds.max(d)))
        .collect()
}

/// Create a fresh swarm: random positions, small random velocities, personal
/// bests pinned at the start position with sentinel fitness, leaders
/// pointing at self.
pub(crate) fn init_swarm<R: Rng>(
    bounds: &ParameterBounds,
    count: usize,
    rng: &mut R,
) -> Vec<Particle> {
    (0..count)
        .map(|index| {
            let position = sample_position(bounds, rng);
            let velocity = (0..bounds.len())
                .map(|d| {
                    let min = bounds.min(d);
                    let max = bounds.max(d);
                    // Velocity formula carried over verbatim from the
                    // reference implementation, including the additive `min`
                    // offset. Kept for output compatibility.
                    rng.gen::<f64>() / 100.0 * (max - min) + min
                })
                .collect();
            Particle {
                best: Candidate::unevaluated(position.clone()),
                position,
                velocity,
                fitness: Candidate::UNEVALUATED,
                leader: index,
            }
        })
        .collect()
}

/// Recompute ring-topology leaders: each particle's leader becomes the best
/// of {itself, left neighbor, right neighbor} by personal-best fitness.
///
/// The comparison runs against a snapshot of personal bests taken before any
/// leader changes, so every particle in a generation sees the same state.
pub(crate) fn update_leaders(particles: &mut [Particle]) {
    let n = particles.len();
    let best_fitness: Vec<f64> = particles.iter().map(|p| p.best.fitness).collect();
    for i in 0..n {
        let prev = (i + n - 1) % n;
        let next = (i + 1) % n;
        let mut leader = i;
        if best_fitness[next] < best_fitness[leader] {
            leader = next;
        }
        if best_fitness[prev] < best_fitness[leader] {
            leader = prev;
        }
        particles[i].leader = leader;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn bounds() -> ParameterBounds {
        ParameterBounds::new().register(-10.0, 10.0).register(0.0, 1.0)
    }

    #[test]
    fn positions_start_within_bounds() {
        let bounds = bounds();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for particle in init_swarm(&bounds, 200, &mut rng) {
            for (d, &x) in particle.position.iter().enumerate() {
                assert!(x >= bounds.min(d) && x <= bounds.max(d), "dim {d} at {x}");
            }
        }
    }

    #[test]
    fn personal_best_starts_at_sentinel() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let swarm = init_swarm(&bounds(), 5, &mut rng);
        for particle in &swarm {
            assert!(!particle.best.is_evaluated());
            assert_eq!(particle.best.params, particle.position);
            assert_eq!(particle.fitness, Candidate::UNEVALUATED);
        }
    }

    #[test]
    fn leaders_start_as_self() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let swarm = init_swarm(&bounds(), 8, &mut rng);
        for (i, particle) in swarm.iter().enumerate() {
            assert_eq!(particle.leader, i);
        }
    }

    #[test]
    fn velocity_follows_reference_formula_range() {
        // For U in [0,1) the coordinate velocity lies in
        // [min, min + span/100).
        let bounds = ParameterBounds::new().register(5.0, 25.0);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for particle in init_swarm(&bounds, 500, &mut rng) {
            let v = particle.velocity[0];
            assert!((5.0..5.2).contains(&v), "velocity {v} outside expected band");
        }
    }

    #[test]
    fn leader_is_best_of_ring_neighborhood() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut swarm = init_swarm(&bounds(), 5, &mut rng);
        // Personal-best fitness by index: 4, 1, 3, 0, 2.
        for (particle, fitness) in swarm.iter_mut().zip([4.0, 1.0, 3.0, 0.0, 2.0]) {
            particle.best.fitness = fitness;
        }
        update_leaders(&mut swarm);

        // Neighborhood of 0 is {4, 0, 1}: best is 1.
        assert_eq!(swarm[0].leader, 1);
        // Neighborhood of 1 is {0, 1, 2}: best is 1 itself.
        assert_eq!(swarm[1].leader, 1);
        assert_eq!(swarm[2].leader, 3);
        assert_eq!(swarm[3].leader, 3);
        assert_eq!(swarm[4].leader, 3);
    }

    #[test]
    fn leader_unchanged_on_fitness_ties() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut swarm = init_swarm(&bounds(), 3, &mut rng);
        for particle in swarm.iter_mut() {
            particle.best.fitness = 1.0;
        }
        update_leaders(&mut swarm);
        // Strict comparison: ties keep the particle itself as leader.
        for (i, particle) in swarm.iter().enumerate() {
            assert_eq!(particle.leader, i);
        }
    }

    #[test]
    fn same_seed_same_swarm() {
        let bounds = bounds();
        let mut a = ChaCha8Rng::seed_from_u64(9);
        let mut b = ChaCha8Rng::seed_from_u64(9);
        let swarm_a = init_swarm(&bounds, 16, &mut a);
        let swarm_b = init_swarm(&bounds, 16, &mut b);
        for (pa, pb) in swarm_a.iter().zip(&swarm_b) {
            assert_eq!(pa.position, pb.position);
            assert_eq!(pa.velocity, pb.velocity);
        }
    }
}
