//! Batch dispatch.
//!
//! ```text
//! run()
//!  ├─ validate config            ──► BatchError::Config
//!  ├─ discover_frames            ──► BatchError::Discovery / NotADirectory
//!  └─ run_frames(frames)
//!      ├─ create_dir_all(output) ──► BatchError::OutputDir
//!      ├─ WorkerPool(W).run      one FrameTask per frame, gauge around each
//!      └─ BatchResult            outcomes in discovery order + BatchStats
//! ```
//!
//! Only pre-flight problems are fatal. Once dispatch starts, every frame ends
//! up as exactly one outcome.

use std::path::PathBuf;

use web_time::Instant;

use crate::batch::discovery::discover_frames;
use crate::batch::types::{BatchConfig, BatchResult, BatchStats};
use crate::error::BatchError;
use crate::extract::{IsosurfaceExtractor, MarchingCubesExtractor};
use crate::frame_task::{FrameOutcome, FrameTask};
use crate::mesh_writer::{MeshWriter, ObjWriter};
use crate::metrics::ConcurrencyGauge;
use crate::source::{PointCloudSource, VtkPointSource};
use crate::threading::WorkerPool;

/// Converts a directory of frames into meshes on a bounded worker pool.
pub struct BatchOrchestrator<S = VtkPointSource, E = MarchingCubesExtractor, W = ObjWriter> {
  config: BatchConfig,
  source: S,
  extractor: E,
  writer: W,
}

impl BatchOrchestrator {
  /// Orchestrator with the VTK reader, marching cubes and OBJ writer.
  pub fn new(config: BatchConfig) -> Self {
    Self::with_collaborators(
      config,
      VtkPointSource::new(),
      MarchingCubesExtractor::new(),
      ObjWriter::new(),
    )
  }
}

impl<S, E, W> BatchOrchestrator<S, E, W>
where
  S: PointCloudSource,
  E: IsosurfaceExtractor,
  W: MeshWriter,
{
  pub fn with_collaborators(config: BatchConfig, source: S, extractor: E, writer: W) -> Self {
    Self {
      config,
      source,
      extractor,
      writer,
    }
  }

  pub fn config(&self) -> &BatchConfig {
    &self.config
  }

  /// Discover frames in the source directory and process all of them.
  pub fn run(&self) -> Result<BatchResult, BatchError> {
    self.config.validate()?;
    let frames = discover_frames(&self.config.source_dir, &self.config.pattern)?;
    self.dispatch(frames)
  }

  /// Process an explicit list of frames, skipping discovery.
  pub fn run_frames(&self, frames: Vec<PathBuf>) -> Result<BatchResult, BatchError> {
    self.config.validate()?;
    self.dispatch(frames)
  }

  fn dispatch(&self, frames: Vec<PathBuf>) -> Result<BatchResult, BatchError> {
    let output_dir = &self.config.output_dir;
    std::fs::create_dir_all(output_dir).map_err(|source| BatchError::OutputDir {
      path: output_dir.clone(),
      source,
    })?;

    let frame_count = frames.len();
    if frame_count == 0 {
      tracing::info!("[batch] no frames to process");
      return Ok(BatchResult::default());
    }

    let workers = self.config.worker_count(frame_count);
    let pool = WorkerPool::new(workers)?;
    let gauge = ConcurrencyGauge::new();
    let frame_config = self.config.frame_config();

    tracing::info!(
      frames = frame_count,
      workers,
      resolution = self.config.grid.resolution(),
      radius = self.config.grid.influence_radius(),
      isovalue = self.config.isovalue,
      "[batch] dispatching"
    );

    let start = Instant::now();
    let outcomes: Vec<FrameOutcome> = pool.run(frames, |_index, frame| {
      let _active = gauge.enter();
      FrameTask::new(&frame_config, &self.source, &self.extractor, &self.writer).run(&frame)
    })?;
    let wall_time_us = start.elapsed().as_micros() as u64;

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    let stats = BatchStats {
      frames: frame_count,
      succeeded,
      failed: frame_count - succeeded,
      peak_concurrency: gauge.peak(),
      workers,
      wall_time_us,
    };

    tracing::info!(
      succeeded = stats.succeeded,
      failed = stats.failed,
      peak_concurrency = stats.peak_concurrency,
      wall_ms = wall_time_us / 1000,
      "[batch] complete"
    );

    Ok(BatchResult { outcomes, stats })
  }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod orchestrator_test;
