//! The work queue at the heart of the engine.
//!
//! Two independent FIFO resources connect the coordinating thread and the
//! worker pool: a pending queue of candidates awaiting evaluation and a
//! completed queue of results. Each sits behind its own lock and condition
//! variable; no lock is ever held while a fitness function runs, and no
//! caller takes both locks at once.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use paropt_types::Candidate;

/// One unit of work moving through the engine: an owned candidate tagged
/// with the stable slot it was dispatched from, so the coordinator can
/// scatter results back without sharing references across threads.
#[derive(Debug)]
pub struct WorkItem {
    pub slot: usize,
    pub candidate: Candidate,
}

impl WorkItem {
    pub fn new(slot: usize, candidate: Candidate) -> Self {
        Self { slot, candidate }
    }
}

/// Shared pending/completed queues plus the run-wide flags.
pub struct WorkQueue {
    pending: Mutex<VecDeque<WorkItem>>,
    work_ready: Condvar,
    completed: Mutex<Vec<WorkItem>>,
    results_ready: Condvar,
    done: AtomicBool,
    failures: AtomicUsize,
    chunk_size: AtomicUsize,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            completed: Mutex::new(Vec::new()),
            results_ready: Condvar::new(),
            done: AtomicBool::new(false),
            failures: AtomicUsize::new(0),
            chunk_size: AtomicUsize::new(1),
        }
    }

    /// Chunk sizing heuristic: an even split across workers, shrunk when a
    /// single chunk would dominate a round. Purely a load-balance knob; any
    /// value >= 1 is correct.
    pub fn chunk_size_for(total: usize, workers: usize) -> usize {
        let workers = workers.max(1);
        let mut chunk = total / workers;
        if chunk > 20 * workers {
            chunk /= 10;
        }
        chunk.max(1)
    }

    pub fn set_chunk_size(&self, chunk: usize) {
        self.chunk_size.store(chunk.max(1), Ordering::Release);
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size.load(Ordering::Acquire)
    }

    /// Append candidates to the pending queue. Coordinator-only; workers are
    /// woken separately via [`WorkQueue::notify_workers`].
    pub fn enqueue(&self, items: Vec<WorkItem>) {
        let mut pending = self.pending.lock();
        pending.extend(items);
    }

    /// Wake every worker blocked waiting for pending work.
    pub fn notify_workers(&self) {
        self.work_ready.notify_all();
    }

    /// Worker side: block until work is pending or the engine is shutting
    /// down, then atomically remove up to `max` items. An empty return means
    /// "shutting down and drained", the signal to leave the request loop.
    pub fn fetch_chunk(&self, max: usize) -> Vec<WorkItem> {
        let max = max.max(1);
        let mut pending = self.pending.lock();
        while pending.is_empty() && !self.done.load(Ordering::Acquire) {
            self.work_ready.wait(&mut pending);
        }
        let take = pending.len().min(max);
        pending.drain(..take).collect()
    }

    /// Worker side: append an evaluated chunk and wake the coordinator.
    pub fn publish_results(&self, items: Vec<WorkItem>) {
        let mut completed = self.completed.lock();
        completed.extend(items);
        drop(completed);
        self.results_ready.notify_all();
    }

    /// Coordinator side: hard generation barrier. Blocks until the completed
    /// queue holds exactly `expected` items, then drains and returns them.
    pub fn wait_until_collected(&self, expected: usize) -> Vec<WorkItem> {
        let mut completed = self.completed.lock();
        while completed.len() < expected {
            self.results_ready.wait(&mut completed);
        }
        debug_assert_eq!(completed.len(), expected, "more results than dispatched");
        std::mem::take(&mut *completed)
    }

    /// Mark the run as finished and wake everyone so blocked workers can
    /// observe "no more work" and exit.
    pub fn shutdown(&self) {
        self.done.store(true, Ordering::Release);
        self.work_ready.notify_all();
        self.results_ready.notify_all();
        debug!("work queue shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Record one evaluator fault. Incremented by workers, read by the
    /// coordinator after the run.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
