//! particle_surface - Particle point clouds to surface meshes
//!
//! This crate turns time-ordered particle snapshots (free-surface simulation
//! output) into triangulated surface meshes. Each frame is splatted into a
//! regular density grid with a bounded Gaussian kernel, an isosurface is
//! extracted with marching cubes, and the result is written as OBJ.
//!
//! # Features
//!
//! - **Density rasterization**: fixed 5×5×5 kernel window, sequential scatter
//!   or rayon plane-gather with identical results
//! - **Frame tasks**: read → rasterize → extract → write with per-frame fault
//!   isolation (errors and panics become reportable outcomes)
//! - **Batch orchestration**: directory discovery, bounded worker pool,
//!   outcomes reported in discovery order
//!
//! # Example
//!
//! ```ignore
//! use particle_surface::{BatchConfig, BatchOrchestrator, FramePattern, GridSpec};
//!
//! let grid = GridSpec::new(400, 0.005)?;
//! let config = BatchConfig::new("frames/", "meshes/", grid)
//!   .with_isovalue(0.5)
//!   .with_pattern(FramePattern::new("PartStructure", "vtk"));
//!
//! let result = BatchOrchestrator::new(config).run()?;
//! println!("{} of {} frames meshed", result.successes().count(), result.len());
//! ```

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use constants::{MAX_RESOLUTION, NEIGHBORHOOD_REACH, NEIGHBORHOOD_WIDTH};
pub use error::{
  BatchError, ConfigError, ExtractionError, FrameError, FrameFailure, SourceError, Stage,
  WriteError,
};
pub use types::{MeshOutput, MinMaxAABB, Point3};

// Grid parameters and the density field
pub mod grid;
pub use grid::GridSpec;

pub mod density;
pub use density::{AccumulationMode, DensityField};

// Collaborators: point source, extractor, writer
pub mod source;
pub use source::{PointCloudSource, VtkPointSource};

pub mod extract;
pub use extract::{IsosurfaceExtractor, MarchingCubesExtractor, VertexSpace};

pub mod mesh_writer;
pub use mesh_writer::{MeshWriter, ObjWriter};

// Per-frame pipeline
pub mod frame_task;
pub use frame_task::{FrameConfig, FrameOutcome, FrameStats, FrameTask};

// Bounded worker pool and instrumentation
pub mod threading;
pub use threading::WorkerPool;

pub mod metrics;
pub use metrics::{ConcurrencyGauge, StageTimings};

// Directory discovery and dispatch
pub mod batch;
pub use batch::{
  discover_frames, BatchConfig, BatchOrchestrator, BatchResult, BatchStats, FramePattern,
};

#[cfg(test)]
pub mod test_utils;
