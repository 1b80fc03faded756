use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;

use rayon::prelude::*;

use crate::error::{Error, Result};

/// Fixed-size pool that runs the tiles of one render.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

/// Hardware parallelism, never below two.
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .max(2)
}

impl WorkerPool {
    /// `workers == 0` sizes the pool to [`default_workers`].
    pub fn new(workers: usize) -> Result<Self> {
        let workers = if workers == 0 { default_workers() } else { workers };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("iqgram-tile-{}", i))
            .build()
            .map_err(|e| Error::Pool(e.to_string()))?;
        log::debug!("Worker pool started with {} threads", workers);
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `job(0..jobs)` on the pool and returns the outputs in job order.
    ///
    /// Blocks until every job has finished.
    pub fn run<T, F>(&self, jobs: usize, job: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        self.pool
            .install(|| (0..jobs).into_par_iter().map(&job).collect())
    }
}

/// Allows one computation at a time. Callers arriving while it runs wait and
/// receive a clone of its output instead of starting their own.
pub struct InFlight<T> {
    state: Mutex<Slot<T>>,
    done: Condvar,
}

struct Slot<T> {
    running: bool,
    generation: u64,
    waiting: usize,
    /// Output of the most recent computation, kept until the next one ends.
    last: Option<T>,
}

impl<T: Clone> Default for InFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> InFlight<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Slot { running: false, generation: 0, waiting: 0, last: None }),
            done: Condvar::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).running
    }

    /// Runs `compute` unless another call is already computing, in which case
    /// this waits for that call's output.
    ///
    /// Returns `None` only when the computation being waited on panicked.
    pub fn run_or_join<F>(&self, compute: F) -> Option<T>
    where
        F: FnOnce() -> T,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.running {
            let generation = state.generation;
            log::debug!("Joining render already in flight");
            state.waiting += 1;
            let mut state = self
                .done
                .wait_while(state, |s| s.generation == generation)
                .unwrap_or_else(PoisonError::into_inner);
            state.waiting -= 1;
            return state.last.clone();
        }
        state.running = true;
        drop(state);

        let mut finish = Finish { flight: self, output: None };
        let output = compute();
        finish.output = Some(output.clone());
        drop(finish);
        Some(output)
    }
}

/// Publishes the output and wakes waiters, also when `compute` unwinds.
struct Finish<'a, T> {
    flight: &'a InFlight<T>,
    output: Option<T>,
}

impl<T> Drop for Finish<'_, T> {
    fn drop(&mut self) {
        let mut state = self.flight.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.running = false;
        state.generation = state.generation.wrapping_add(1);
        state.last = self.output.take();
        self.flight.done.notify_all();
    }
}
