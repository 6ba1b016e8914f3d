//! # paropt-engine
//!
//! Master/worker synchronization engine for parallel black-box optimization.
//!
//! A scheduling algorithm (the coordinator) enqueues candidates on a
//! [`WorkQueue`], a fixed [`WorkerPool`] evaluates them in chunks through a
//! caller-supplied [`Evaluator`], and the coordinator barrier-waits for the
//! exact result count before computing the next round. No thread is spawned
//! per task and workers never talk to each other directly.

mod queue;
mod worker;

pub use queue::{WorkItem, WorkQueue};
pub use worker::{evaluate_batch, Evaluator, WorkerPool};
