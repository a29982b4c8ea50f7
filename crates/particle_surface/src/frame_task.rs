//! Per-frame pipeline with fault isolation.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  FrameTask::run(frame)                                               │
//! │                                                                      │
//! │  read ──► rasterize ──► extract ──► write                            │
//! │   │          │             │          │                              │
//! │   │   fresh DensityField   │   <output_dir>/<stem>.<ext>             │
//! │   │    (dropped after) ────┘                                         │
//! │   ▼                                                                  │
//! │  every stage: catch_unwind + timing ──► FrameFailure { stage, .. }   │
//! │                                                                      │
//! │  FrameOutcome::Success { frame, mesh_path, stats }                   │
//! │  FrameOutcome::Failure(FrameFailure)                                 │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A task never returns an error and never unwinds into its caller. On failure
//! no mesh file is left at the target path.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_ISOVALUE;
use crate::density::{AccumulationMode, DensityField};
use crate::error::{FrameError, FrameFailure, Stage};
use crate::extract::{IsosurfaceExtractor, VertexSpace};
use crate::grid::GridSpec;
use crate::mesh_writer::MeshWriter;
use crate::metrics::{timed, StageTimings};
use crate::source::PointCloudSource;

/// Read-only parameters shared by every frame of a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameConfig {
  pub grid: GridSpec,
  pub isovalue: f32,
  pub output_dir: PathBuf,
  pub accumulation: AccumulationMode,
  pub vertex_space: VertexSpace,
}

impl FrameConfig {
  pub fn new(grid: GridSpec, output_dir: impl Into<PathBuf>) -> Self {
    Self {
      grid,
      isovalue: DEFAULT_ISOVALUE,
      output_dir: output_dir.into(),
      accumulation: AccumulationMode::default(),
      vertex_space: VertexSpace::default(),
    }
  }

  pub fn with_isovalue(mut self, isovalue: f32) -> Self {
    self.isovalue = isovalue;
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
}

/// Counters and timings for a successful frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
  pub points: usize,
  pub vertices: usize,
  pub triangles: usize,
  pub timings: StageTimings,
}

/// Result of processing one frame.
#[derive(Debug)]
pub enum FrameOutcome {
  Success {
    frame: PathBuf,
    mesh_path: PathBuf,
    stats: FrameStats,
  },
  Failure(FrameFailure),
}

impl FrameOutcome {
  pub fn frame(&self) -> &Path {
    match self {
      FrameOutcome::Success { frame, .. } => frame,
      FrameOutcome::Failure(failure) => &failure.frame,
    }
  }

  pub fn is_success(&self) -> bool {
    matches!(self, FrameOutcome::Success { .. })
  }

  pub fn mesh_path(&self) -> Option<&Path> {
    match self {
      FrameOutcome::Success { mesh_path, .. } => Some(mesh_path),
      FrameOutcome::Failure(_) => None,
    }
  }

  pub fn failure(&self) -> Option<&FrameFailure> {
    match self {
      FrameOutcome::Failure(failure) => Some(failure),
      FrameOutcome::Success { .. } => None,
    }
  }
}

/// One frame's read → rasterize → extract → write pipeline.
pub struct FrameTask<'a, S: ?Sized, E: ?Sized, W: ?Sized> {
  config: &'a FrameConfig,
  source: &'a S,
  extractor: &'a E,
  writer: &'a W,
}

impl<'a, S, E, W> FrameTask<'a, S, E, W>
where
  S: PointCloudSource + ?Sized,
  E: IsosurfaceExtractor + ?Sized,
  W: MeshWriter + ?Sized,
{
  pub fn new(config: &'a FrameConfig, source: &'a S, extractor: &'a E, writer: &'a W) -> Self {
    Self {
      config,
      source,
      extractor,
      writer,
    }
  }

  /// Target mesh path: `<output_dir>/<frame stem>.<writer extension>`.
  pub fn mesh_path(&self, frame: &Path) -> Option<PathBuf> {
    let stem = frame.file_stem()?.to_string_lossy();
    Some(
      self
        .config
        .output_dir
        .join(format!("{stem}.{}", self.writer.extension())),
    )
  }

  /// Process one frame. Errors and panics become a `Failure` outcome.
  pub fn run(&self, frame: &Path) -> FrameOutcome {
    tracing::info!("[start] {}", frame.display());

    match self.pipeline(frame) {
      Ok((mesh_path, stats)) => {
        tracing::info!(
          points = stats.points,
          triangles = stats.triangles,
          total_us = stats.timings.total_us(),
          "[done] {} -> {}",
          frame.display(),
          mesh_path.display()
        );
        FrameOutcome::Success {
          frame: frame.to_path_buf(),
          mesh_path,
          stats,
        }
      }
      Err(failure) => {
        tracing::warn!(kind = failure.error.kind(), "[error] {failure}");
        FrameOutcome::Failure(failure)
      }
    }
  }

  fn pipeline(&self, frame: &Path) -> Result<(PathBuf, FrameStats), FrameFailure> {
    let mut timings = StageTimings::new();

    let mesh_path = self.mesh_path(frame).ok_or_else(|| {
      FrameFailure::new(
        frame,
        Stage::Read,
        FrameError::Unexpected("frame path has no file name".into()),
      )
    })?;

    let points = run_stage(frame, Stage::Read, &mut timings, || {
      self.source.read(frame).map_err(FrameError::from)
    })?;

    let field = run_stage(frame, Stage::Rasterize, &mut timings, || {
      let mut field = DensityField::try_new(&self.config.grid)
        .map_err(|e| FrameError::Unexpected(format!("cannot allocate density grid: {e}")))?;
      field.accumulate_with(&points, self.config.accumulation);
      Ok(field)
    })?;

    let mut mesh = run_stage(frame, Stage::Extract, &mut timings, || {
      self
        .extractor
        .extract(&field, self.config.isovalue)
        .map_err(FrameError::from)
    })?;
    drop(field);
    self
      .config
      .vertex_space
      .apply(&mut mesh, self.config.grid.spacing());

    let written = run_stage(frame, Stage::Write, &mut timings, || {
      self.writer.write(&mesh_path, &mesh).map_err(FrameError::from)
    });
    if written.is_err() {
      // Writers may fail after creating the target.
      let _ = std::fs::remove_file(&mesh_path);
    }
    written?;

    let stats = FrameStats {
      points: points.len(),
      vertices: mesh.vertex_count(),
      triangles: mesh.triangle_count(),
      timings,
    };
    Ok((mesh_path, stats))
  }
}

/// Time one stage and convert its error or panic into a `FrameFailure`.
fn run_stage<T>(
  frame: &Path,
  stage: Stage,
  timings: &mut StageTimings,
  work: impl FnOnce() -> Result<T, FrameError>,
) -> Result<T, FrameFailure> {
  let _span = tracing::debug_span!("stage", stage = stage.as_str()).entered();
  let (result, elapsed_us) = timed(|| catch_unwind(AssertUnwindSafe(work)));
  timings.record(stage, elapsed_us);
  tracing::debug!(elapsed_us, "{} {stage}", frame.display());

  match result {
    Ok(Ok(value)) => Ok(value),
    Ok(Err(error)) => Err(FrameFailure::new(frame, stage, error)),
    Err(payload) => Err(FrameFailure::new(
      frame,
      stage,
      FrameError::Unexpected(format!("panic: {}", panic_message(payload.as_ref()))),
    )),
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "non-string panic payload".to_string()
  }
}

#[cfg(test)]
#[path = "frame_task_test.rs"]
mod frame_task_test;
