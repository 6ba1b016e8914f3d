//! Minimize a 3-D Rosenbrock function across four worker threads.

use paropt_pso::{PsoConfig, PsoOptimizer, PsoVariant};
use paropt_types::ParameterBounds;

const DIMENSIONS: usize = 3;
const LENGTH: f64 = 100.0;

fn rosenbrock(x: &[f64]) -> f64 {
    let mut sum = 0.0;
    for i in 0..DIMENSIONS - 1 {
        sum += 100.0 * (x[i + 1] - x[i] * x[i]).powi(2) + (x[i] - 1.0).powi(2);
    }
    sum
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut bounds = ParameterBounds::new();
    for _ in 0..DIMENSIONS {
        bounds = bounds.register(-LENGTH / 2.0, LENGTH / 2.0);
    }

    let config = PsoConfig::new()
        .with_variant(PsoVariant::NeighborhoodBest)
        .with_generations(200)
        .with_workers(4);

    let mut optimizer = PsoOptimizer::with_evaluator_factory(bounds, config, |_| rosenbrock)?;
    optimizer.set_new_best_callback(|fitness, progress| {
        println!("progress: {:5.1}%\tnew min: {fitness}", progress * 100.0);
    });

    let fitness = optimizer.optimize()?;
    let best = optimizer.best().expect("optimize has returned");
    println!("best fitness {fitness} at {:?}", best.params);
    Ok(())
}
