//! Frame and batch instrumentation.
//!
//! `StageTimings` records how long each pipeline stage of one frame took.
//! `ConcurrencyGauge` counts frame tasks executing right now and remembers the
//! highest count seen, which is how the worker bound is observed from outside.
//!
//! # Usage
//!
//! ```ignore
//! let gauge = ConcurrencyGauge::new();
//! {
//!   let _active = gauge.enter();
//!   // run one frame task
//! }
//! assert!(gauge.peak() <= workers);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use web_time::Instant;

use crate::error::Stage;

/// Per-stage wall time of one frame, in microseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageTimings {
  pub read_us: u64,
  pub rasterize_us: u64,
  pub extract_us: u64,
  pub write_us: u64,
}

impl StageTimings {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store the elapsed time for `stage`.
  pub fn record(&mut self, stage: Stage, elapsed_us: u64) {
    match stage {
      Stage::Read => self.read_us = elapsed_us,
      Stage::Rasterize => self.rasterize_us = elapsed_us,
      Stage::Extract => self.extract_us = elapsed_us,
      Stage::Write => self.write_us = elapsed_us,
    }
  }

  pub fn get(&self, stage: Stage) -> u64 {
    match stage {
      Stage::Read => self.read_us,
      Stage::Rasterize => self.rasterize_us,
      Stage::Extract => self.extract_us,
      Stage::Write => self.write_us,
    }
  }

  /// Sum across all stages.
  pub fn total_us(&self) -> u64 {
    self.read_us + self.rasterize_us + self.extract_us + self.write_us
  }
}

/// Run `work`, returning its result and the elapsed microseconds.
#[inline]
pub fn timed<T>(work: impl FnOnce() -> T) -> (T, u64) {
  let start = Instant::now();
  let value = work();
  (value, start.elapsed().as_micros() as u64)
}

/// Live and peak count of concurrently executing frame tasks.
#[derive(Debug, Default)]
pub struct ConcurrencyGauge {
  active: AtomicUsize,
  peak: AtomicUsize,
}

impl ConcurrencyGauge {
  pub fn new() -> Self {
    Self::default()
  }

  /// Mark one task as executing until the guard drops.
  pub fn enter(&self) -> GaugeGuard<'_> {
    let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
    self.peak.fetch_max(now, Ordering::SeqCst);
    GaugeGuard { gauge: self }
  }

  /// Tasks executing right now.
  pub fn active(&self) -> usize {
    self.active.load(Ordering::SeqCst)
  }

  /// Highest `active` value ever observed.
  pub fn peak(&self) -> usize {
    self.peak.load(Ordering::SeqCst)
  }
}

/// Decrements the gauge on drop, including during unwinding.
#[must_use = "the task stops counting as active when the guard drops"]
pub struct GaugeGuard<'a> {
  gauge: &'a ConcurrencyGauge,
}

impl Drop for GaugeGuard<'_> {
  fn drop(&mut self) {
    self.gauge.active.fetch_sub(1, Ordering::SeqCst);
  }
}

// =============================================================================
// Tests
// =============================================================================
