//! Batch configuration and results.

use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_FRAME_EXTENSION, DEFAULT_FRAME_PREFIX, DEFAULT_ISOVALUE};
use crate::density::AccumulationMode;
use crate::error::{ConfigError, FrameFailure};
use crate::extract::VertexSpace;
use crate::frame_task::{FrameConfig, FrameOutcome};
use crate::grid::GridSpec;
use crate::threading::available_parallelism;

/// File name filter for frame discovery: `<prefix>*.<extension>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePattern {
  pub prefix: String,
  pub extension: String,
}

impl FramePattern {
  pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
    Self {
      prefix: prefix.into(),
      extension: extension.into(),
    }
  }

  /// Case-sensitive match on a bare file name.
  pub fn matches(&self, file_name: &str) -> bool {
    let Some(rest) = file_name.strip_prefix(self.prefix.as_str()) else {
      return false;
    };
    rest
      .strip_suffix(self.extension.as_str())
      .and_then(|stem| stem.strip_suffix('.'))
      .is_some()
  }
}

impl Default for FramePattern {
  fn default() -> Self {
    Self::new(DEFAULT_FRAME_PREFIX, DEFAULT_FRAME_EXTENSION)
  }
}

/// Everything a batch run needs.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
  pub source_dir: PathBuf,
  pub output_dir: PathBuf,
  pub grid: GridSpec,
  pub isovalue: f32,
  /// `None` uses the machine's available parallelism.
  pub max_workers: Option<usize>,
  pub pattern: FramePattern,
  pub accumulation: AccumulationMode,
  pub vertex_space: VertexSpace,
}

impl BatchConfig {
  pub fn new(
    source_dir: impl Into<PathBuf>,
    output_dir: impl Into<PathBuf>,
    grid: GridSpec,
  ) -> Self {
    Self {
      source_dir: source_dir.into(),
      output_dir: output_dir.into(),
      grid,
      isovalue: DEFAULT_ISOVALUE,
      max_workers: None,
      pattern: FramePattern::default(),
      accumulation: AccumulationMode::default(),
      vertex_space: VertexSpace::default(),
    }
  }

  pub fn with_isovalue(mut self, isovalue: f32) -> Self {
    self.isovalue = isovalue;
    self
  }

  pub fn with_max_workers(mut self, max_workers: usize) -> Self {
    self.max_workers = Some(max_workers);
    self
  }

  pub fn with_pattern(mut self, pattern: FramePattern) -> Self {
    self.pattern = pattern;
    self
  }

  pub fn with_accumulation(mut self, accumulation: AccumulationMode) -> Self {
    self.accumulation = accumulation;
    self
  }

  pub fn with_vertex_space(mut self, vertex_space: VertexSpace) -> Self {
    self.vertex_space = vertex_space;
    self
  }

  /// Check the parts `GridSpec` does not already guarantee.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !self.isovalue.is_finite() {
      return Err(ConfigError::InvalidIsovalue(self.isovalue));
    }
    if self.max_workers == Some(0) {
      return Err(ConfigError::ZeroWorkers);
    }
    if self.pattern.extension.is_empty() {
      return Err(ConfigError::EmptyExtension);
    }
    Ok(())
  }

  /// Worker count for `frame_count` frames, clamped to `[1, frame_count]`.
  pub fn worker_count(&self, frame_count: usize) -> usize {
    self
      .max_workers
      .unwrap_or_else(available_parallelism)
      .clamp(1, frame_count.max(1))
  }

  /// Per-frame view of this configuration.
  pub fn frame_config(&self) -> FrameConfig {
    FrameConfig::new(self.grid, &self.output_dir)
      .with_isovalue(self.isovalue)
      .with_accumulation(self.accumulation)
      .with_vertex_space(self.vertex_space)
  }
}

/// Batch summary statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
  pub frames: usize,
  pub succeeded: usize,
  pub failed: usize,
  /// Most frame tasks observed executing at once.
  pub peak_concurrency: usize,
  pub workers: usize,
  pub wall_time_us: u64,
}

/// Outcomes of a batch, in discovery order.
#[derive(Debug, Default)]
pub struct BatchResult {
  pub outcomes: Vec<FrameOutcome>,
  pub stats: BatchStats,
}

impl BatchResult {
  pub fn len(&self) -> usize {
    self.outcomes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.outcomes.is_empty()
  }

  pub fn has_failures(&self) -> bool {
    self.stats.failed > 0
  }

  pub fn successes(&self) -> impl Iterator<Item = &FrameOutcome> {
    self.outcomes.iter().filter(|o| o.is_success())
  }

  pub fn failures(&self) -> impl Iterator<Item = &FrameFailure> {
    self.outcomes.iter().filter_map(FrameOutcome::failure)
  }

  /// Outcome for `frame`, if it was part of the batch.
  pub fn outcome(&self, frame: &Path) -> Option<&FrameOutcome> {
    self.outcomes.iter().find(|o| o.frame() == frame)
  }

  /// Process exit status: 0 when every frame succeeded, 1 otherwise.
  pub fn exit_code(&self) -> i32 {
    if self.has_failures() {
      1
    } else {
      0
    }
  }
}
