//! Bounded worker pool on scoped OS threads.
//!
//! ```text
//!   items ──► job channel ──┬─► worker 0 ──┐
//!   (index, item)           ├─► worker 1 ──┼──► result channel ──► slots[index]
//!                           └─► worker W-1 ┘    (index, result)
//! ```
//!
//! Exactly `W` threads pull from one queue, so no more than `W` jobs ever run
//! at once. Jobs may use the rayon global pool internally; rayon threads never
//! pick up pool jobs.
//!
//! # Usage
//!
//! ```ignore
//! let pool = WorkerPool::new(4)?;
//! let lengths = pool.run(paths, |_index, path| std::fs::metadata(path).map(|m| m.len()))?;
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};

use crossbeam_channel::unbounded;

use crate::constants::FALLBACK_WORKERS;
use crate::error::{BatchError, ConfigError};

/// Fixed-size pool of worker threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerPool {
  workers: usize,
}

impl WorkerPool {
  /// Create a pool with `workers` threads.
  pub fn new(workers: usize) -> Result<Self, ConfigError> {
    if workers == 0 {
      return Err(ConfigError::ZeroWorkers);
    }
    Ok(Self { workers })
  }

  /// Pool sized to the machine's available parallelism.
  pub fn default_threads() -> Self {
    Self {
      workers: available_parallelism(),
    }
  }

  pub fn workers(&self) -> usize {
    self.workers
  }

  /// Run `job` once per item and block until all finish.
  ///
  /// Results come back in input order regardless of completion order. Spawns
  /// at most `min(workers, items.len())` threads.
  pub fn run<T, R, F>(&self, items: Vec<T>, job: F) -> Result<Vec<R>, BatchError>
  where
    T: Send,
    R: Send,
    F: Fn(usize, T) -> R + Sync,
  {
    let count = items.len();
    if count == 0 {
      return Ok(Vec::new());
    }

    let (job_tx, job_rx) = unbounded::<(usize, T)>();
    let (result_tx, result_rx) = unbounded::<(usize, R)>();
    for entry in items.into_iter().enumerate() {
      // Receiver is alive in this scope; send cannot fail.
      let _ = job_tx.send(entry);
    }
    drop(job_tx);

    let threads = self.workers.min(count);
    let job = &job;
    let spawned = std::thread::scope(|scope| {
      let mut spawned = 0;
      for worker in 0..threads {
        let job_rx = job_rx.clone();
        let result_tx = result_tx.clone();
        let handle = std::thread::Builder::new()
          .name(format!("frame-worker-{worker}"))
          .spawn_scoped(scope, move || {
            for (index, item) in job_rx.iter() {
              match catch_unwind(AssertUnwindSafe(|| job(index, item))) {
                Ok(result) => {
                  let _ = result_tx.send((index, result));
                }
                Err(_) => {
                  tracing::error!(worker, index, "job panicked outside its own error capture");
                }
              }
            }
          });
        match handle {
          Ok(_) => spawned += 1,
          Err(err) => tracing::warn!(worker, "failed to spawn worker thread: {err}"),
        }
      }
      spawned
    });
    drop(result_tx);

    if spawned == 0 {
      return Err(BatchError::Pool("no worker thread could be spawned".into()));
    }

    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(count).collect();
    for (index, result) in result_rx.try_iter() {
      slots[index] = Some(result);
    }

    slots
      .into_iter()
      .enumerate()
      .map(|(index, slot)| {
        slot.ok_or_else(|| BatchError::Pool(format!("job {index} produced no result")))
      })
      .collect()
  }
}

impl Default for WorkerPool {
  fn default() -> Self {
    Self::default_threads()
  }
}

/// Hardware parallelism, or `FALLBACK_WORKERS` when it cannot be queried.
pub fn available_parallelism() -> usize {
  std::thread::available_parallelism()
    .map(|n| n.get())
    .unwrap_or(FALLBACK_WORKERS)
}

// =============================================================================
// Tests
// =============================================================================
