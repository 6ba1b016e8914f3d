//! Worker threads and their request loop.
//!
//! Each worker owns one [`Evaluator`] and runs a simple loop: block until a
//! chunk of candidates is available, evaluate them outside any lock, publish
//! the results, repeat. An empty chunk signals shutdown.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, info, warn};

use paropt_types::{resource_error, OptResult};

use crate::queue::{WorkItem, WorkQueue};

/// The capability a caller implements to score a parameter vector.
///
/// Called once per candidate per generation, on a worker thread. Lower
/// fitness is better. The pool takes one evaluator per worker, so an
/// implementation only needs `&mut self` access to its own state; sharing
/// state between evaluators is the caller's choice.
pub trait Evaluator: Send {
    fn evaluate(&mut self, params: &[f64]) -> f64;
}

impl<F> Evaluator for F
where
    F: FnMut(&[f64]) -> f64 + Send,
{
    fn evaluate(&mut self, params: &[f64]) -> f64 {
        self(params)
    }
}

/// A fixed pool of worker threads bound to one [`WorkQueue`].
///
/// Threads are created once and reused across generations; stopping is
/// cooperative and idempotent.
pub struct WorkerPool {
    queue: Arc<WorkQueue>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn one named thread per evaluator. A spawn failure is fatal: any
    /// already-running workers are stopped before the error is returned, so
    /// no partial pool is left behind.
    pub fn start(
        queue: Arc<WorkQueue>,
        evaluators: Vec<Box<dyn Evaluator>>,
    ) -> OptResult<WorkerPool> {
        if evaluators.is_empty() {
            return Err(paropt_types::config_error!(
                "worker pool needs at least one evaluator"
            ));
        }

        info!(workers = evaluators.len(), "starting worker pool");
        let mut pool = WorkerPool {
            queue: Arc::clone(&queue),
            handles: Vec::with_capacity(evaluators.len()),
        };

        for (index, evaluator) in evaluators.into_iter().enumerate() {
            let queue = Arc::clone(&queue);
            let spawned = std::thread::Builder::new()
                .name(format!("paropt-worker-{index}"))
                .spawn(move || request_loop(queue, evaluator));
            match spawned {
                Ok(handle) => pool.handles.push(handle),
                Err(err) => {
                    pool.stop();
                    return Err(resource_error!("failed to spawn worker {index}: {err}"));
                }
            }
        }

        Ok(pool)
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Shut the queue down, wake blocked workers, and join every thread.
    /// Safe to call more than once. Blocks until in-flight evaluations
    /// finish; cancellation is cooperative, never preemptive.
    pub fn stop(&mut self) {
        self.queue.shutdown();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                // The request loop catches evaluator panics, so this only
                // fires on a bug in the engine itself.
                warn!("worker thread terminated abnormally");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Per-thread request loop: fetch, evaluate, publish, until shutdown.
fn request_loop(queue: Arc<WorkQueue>, mut evaluator: Box<dyn Evaluator>) {
    loop {
        let mut chunk = queue.fetch_chunk(queue.chunk_size());
        if chunk.is_empty() {
            break;
        }

        for item in &mut chunk {
            // A panicking fitness function must not kill the thread: the
            // barrier needs every dispatched item back. The candidate keeps
            // its sentinel fitness and is reported as failed instead.
            let result = catch_unwind(AssertUnwindSafe(|| {
                evaluator.evaluate(&item.candidate.params)
            }));
            match result {
                Ok(fitness) => item.candidate.fitness = fitness,
                Err(_) => {
                    item.candidate.failed = true;
                    queue.record_failure();
                    warn!(slot = item.slot, "evaluator panicked; candidate marked failed");
                }
            }
        }

        queue.publish_results(chunk);
    }
    debug!("worker exiting");
}

/// Evaluate one batch of work items to completion and return them.
///
/// Convenience wrapper for one-shot schedulers: dispatch everything, barrier
/// on the full count, and hand the results back in a single call.
pub fn evaluate_batch(queue: &WorkQueue, items: Vec<WorkItem>) -> Vec<WorkItem> {
    let expected = items.len();
    queue.enqueue(items);
    queue.notify_workers();
    queue.wait_until_collected(expected)
}
