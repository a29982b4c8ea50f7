//! Error taxonomy.
//!
//! Stage errors (`SourceError`, `ExtractionError`, `WriteError`) are produced by
//! the collaborators and folded into a `FrameError` inside the frame task. Only
//! `BatchError` ever escapes the orchestrator, and only for pre-flight problems.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Invalid grid or batch configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
  #[error("grid resolution must be positive")]
  ZeroResolution,

  #[error("grid resolution {resolution} exceeds the maximum of {max}")]
  ResolutionTooLarge { resolution: usize, max: usize },

  #[error("influence radius must be positive and finite, got {0}")]
  InvalidRadius(f64),

  #[error(
    "influence radius {radius} exceeds the {reach}-cell kernel window ({limit}) at resolution \
     {resolution}"
  )]
  RadiusExceedsWindow {
    radius: f64,
    limit: f64,
    reach: i64,
    resolution: usize,
  },

  #[error("isovalue must be finite, got {0}")]
  InvalidIsovalue(f32),

  #[error("worker count must be at least 1")]
  ZeroWorkers,

  #[error("file extension must not be empty")]
  EmptyExtension,
}

/// Point cloud could not be obtained.
#[derive(Debug, Error)]
pub enum SourceError {
  #[error("{0}")]
  Read(#[from] io::Error),

  #[error("{0}")]
  Format(String),
}

impl SourceError {
  pub fn format(message: impl Into<String>) -> Self {
    SourceError::Format(message.into())
  }
}

/// Isosurface extraction failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
  #[error("grid resolution {0} is too small to contain a surface")]
  GridTooSmall(usize),

  #[error("isovalue must be finite, got {0}")]
  InvalidIsovalue(f32),

  #[error("isovalue {isovalue} lies outside the field range [{min}, {max}]")]
  NoSurface { isovalue: f32, min: f32, max: f32 },

  #[error("no triangles at isovalue {0}")]
  EmptyMesh(f32),

  #[error("marching cubes backend: {0}")]
  Backend(String),
}

/// Mesh could not be persisted.
#[derive(Debug, Error)]
pub enum WriteError {
  #[error("{0}")]
  Io(#[from] io::Error),

  #[error("triangle {triangle} references vertex {index} but the mesh has {vertex_count} vertices")]
  InvalidIndex {
    triangle: usize,
    index: u32,
    vertex_count: usize,
  },
}

/// Pipeline stage a frame failed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
  Read,
  Rasterize,
  Extract,
  Write,
}

impl Stage {
  pub fn as_str(&self) -> &'static str {
    match self {
      Stage::Read => "read",
      Stage::Rasterize => "rasterize",
      Stage::Extract => "extract",
      Stage::Write => "write",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Per-frame error taxonomy.
#[derive(Debug, Error)]
pub enum FrameError {
  #[error("read error: {0}")]
  Read(#[source] io::Error),

  #[error("format error: {0}")]
  Format(String),

  #[error("extraction error: {0}")]
  Extraction(#[from] ExtractionError),

  #[error("write error: {0}")]
  Write(#[from] WriteError),

  /// Catch-all, including panics inside a stage.
  #[error("unexpected error: {0}")]
  Unexpected(String),
}

impl FrameError {
  /// Short classification used in summaries.
  pub fn kind(&self) -> &'static str {
    match self {
      FrameError::Read(_) => "ReadError",
      FrameError::Format(_) => "FormatError",
      FrameError::Extraction(_) => "ExtractionError",
      FrameError::Write(_) => "WriteError",
      FrameError::Unexpected(_) => "UnexpectedError",
    }
  }
}

impl From<SourceError> for FrameError {
  fn from(err: SourceError) -> Self {
    match err {
      SourceError::Read(io) => FrameError::Read(io),
      SourceError::Format(message) => FrameError::Format(message),
    }
  }
}

/// A frame that did not produce a mesh.
#[derive(Debug, Error)]
#[error("{}: {stage} failed: {error}", .frame.display())]
pub struct FrameFailure {
  pub frame: PathBuf,
  pub stage: Stage,
  #[source]
  pub error: FrameError,
}

impl FrameFailure {
  pub fn new(frame: impl Into<PathBuf>, stage: Stage, error: impl Into<FrameError>) -> Self {
    Self {
      frame: frame.into(),
      stage,
      error: error.into(),
    }
  }
}

/// Fatal, pre-flight batch errors.
#[derive(Debug, Error)]
pub enum BatchError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("cannot list frames in {}: {source}", .path.display())]
  Discovery {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("source path {} is not a directory", .0.display())]
  NotADirectory(PathBuf),

  #[error("cannot create output directory {}: {source}", .path.display())]
  OutputDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("worker pool: {0}")]
  Pool(String),
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
