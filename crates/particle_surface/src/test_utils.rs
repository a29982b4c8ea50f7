//! Test utilities shared by unit tests.
//!
//! Provides deterministic point fixtures, legacy VTK writers, and mock
//! collaborators for exercising the frame task and orchestrator in isolation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use glam::Vec3;

use crate::error::{SourceError, WriteError};
use crate::mesh_writer::MeshWriter;
use crate::source::PointCloudSource;
use crate::types::{MeshOutput, Point3};

// =============================================================================
// Point fixtures
// =============================================================================

/// Deterministic pseudo-random points inside `[0.05, 0.95)³`.
pub fn scattered_points(count: usize, seed: u64) -> Vec<Point3> {
  let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
  let mut next = move || {
    state = state
      .wrapping_mul(6364136223846793005)
      .wrapping_add(1442695040888963407);
    let unit = (state >> 40) as f32 / (1u64 << 24) as f32;
    0.05 + unit * 0.9
  };
  (0..count).map(|_| Vec3::new(next(), next(), next())).collect()
}

/// Points packed around a center, dense enough to exceed common isovalues.
pub fn blob_points(center: Vec3, half_extent: f32, per_axis: usize) -> Vec<Point3> {
  let step = if per_axis > 1 {
    2.0 * half_extent / (per_axis - 1) as f32
  } else {
    0.0
  };
  let mut points = Vec::with_capacity(per_axis * per_axis * per_axis);
  for x in 0..per_axis {
    for y in 0..per_axis {
      for z in 0..per_axis {
        let offset = Vec3::new(x as f32, y as f32, z as f32) * step - Vec3::splat(half_extent);
        points.push(center + offset);
      }
    }
  }
  points
}

// =============================================================================
// VTK fixtures
// =============================================================================

/// Write a legacy ASCII VTK polydata file.
pub fn write_ascii_vtk(path: &Path, points: &[Point3]) {
  let mut file = std::fs::File::create(path).unwrap();
  writeln!(file, "# vtk DataFile Version 3.0").unwrap();
  writeln!(file, "particle fixture").unwrap();
  writeln!(file, "ASCII").unwrap();
  writeln!(file, "DATASET POLYDATA").unwrap();
  writeln!(file, "POINTS {} float", points.len()).unwrap();
  for p in points {
    writeln!(file, "{} {} {}", p.x, p.y, p.z).unwrap();
  }
  writeln!(file, "VERTICES {} {}", points.len(), points.len() * 2).unwrap();
  for i in 0..points.len() {
    writeln!(file, "1 {i}").unwrap();
  }
}

/// Write a legacy BINARY VTK polydata file with big-endian doubles.
pub fn write_binary_vtk(path: &Path, points: &[Point3]) {
  let mut file = std::fs::File::create(path).unwrap();
  file
    .write_all(b"# vtk DataFile Version 3.0\nbinary fixture\nBINARY\nDATASET POLYDATA\n")
    .unwrap();
  writeln!(file, "POINTS {} double", points.len()).unwrap();
  for p in points {
    for c in p.to_array() {
      file.write_all(&(c as f64).to_be_bytes()).unwrap();
    }
  }
  file.write_all(b"\n").unwrap();
}

/// Write `count` valid frames named `<prefix>_NNNN.vtk` into `dir`.
pub fn write_frames(dir: &Path, prefix: &str, count: usize, points: &[Point3]) -> Vec<PathBuf> {
  (0..count)
    .map(|i| {
      let path = dir.join(format!("{prefix}_{i:04}.vtk"));
      write_ascii_vtk(&path, points);
      path
    })
    .collect()
}

// =============================================================================
// Mock collaborators
// =============================================================================

/// Returns the same points for every frame, optionally after a delay.
///
/// Frames whose file name contains `corrupt` fail with a format error.
pub struct FixedSource {
  pub points: Vec<Point3>,
  pub delay: Duration,
  pub reads: AtomicUsize,
}

impl FixedSource {
  pub fn new(points: Vec<Point3>) -> Self {
    Self {
      points,
      delay: Duration::ZERO,
      reads: AtomicUsize::new(0),
    }
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }
}

impl PointCloudSource for FixedSource {
  fn read(&self, frame: &Path) -> Result<Vec<Point3>, SourceError> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    if !self.delay.is_zero() {
      std::thread::sleep(self.delay);
    }
    let name = frame.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.contains("corrupt") {
      return Err(SourceError::format("corrupt fixture"));
    }
    Ok(self.points.clone())
  }
}

/// Panics on every read.
pub struct PanickingSource;

impl PointCloudSource for PanickingSource {
  fn read(&self, _frame: &Path) -> Result<Vec<Point3>, SourceError> {
    panic!("source exploded");
  }
}

/// Creates the target file, writes a partial line, then fails.
pub struct FailingWriter;

impl MeshWriter for FailingWriter {
  fn extension(&self) -> &str {
    "obj"
  }

  fn write(&self, path: &Path, _mesh: &MeshOutput) -> Result<(), WriteError> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(b"v 0 0")?;
    Err(WriteError::Io(std::io::Error::new(
      std::io::ErrorKind::Other,
      "disk full",
    )))
  }
}
