//! Isosurface extraction.
//!
//! The density field is "inside" where it is greater than the isovalue. The
//! marching cubes backend treats the lesser side as inside, so values and
//! isovalue are negated before the call.
//!
//! ```text
//! DensityField (n³, x fastest)
//!      │  negate
//!      ▼
//! mcubes::MarchingCubes  (extent = n-1, step = 1 → grid-index space)
//!      │  MeshSide::Both
//!      ▼
//! MeshOutput::weld()     (merge shared corners, drop back faces)
//! ```

use lin_alg::f32::Vec3 as McVec3;
use mcubes::{MarchingCubes, MeshSide};

use crate::density::DensityField;
use crate::error::ExtractionError;
use crate::types::MeshOutput;

/// Coordinate system of extracted vertices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertexSpace {
  /// Cell `(i, j, k)` maps to `(i, j, k)`.
  #[default]
  Grid,
  /// Grid coordinates multiplied by spacing, landing in `[0, 1)³`.
  Normalized,
}

impl VertexSpace {
  /// Move grid-space vertices into this space.
  pub fn apply(self, mesh: &mut MeshOutput, spacing: f64) {
    if self == VertexSpace::Normalized {
      mesh.scale(spacing as f32);
    }
  }
}

/// Turns a density field into a triangle mesh at an isovalue.
///
/// Output vertices are in grid-index space.
pub trait IsosurfaceExtractor: Send + Sync {
  fn extract(&self, field: &DensityField, isovalue: f32) -> Result<MeshOutput, ExtractionError>;
}

/// Marching cubes over the full grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarchingCubesExtractor;

impl MarchingCubesExtractor {
  pub fn new() -> Self {
    Self
  }
}

impl IsosurfaceExtractor for MarchingCubesExtractor {
  fn extract(&self, field: &DensityField, isovalue: f32) -> Result<MeshOutput, ExtractionError> {
    let n = field.resolution();
    if n < 2 {
      return Err(ExtractionError::GridTooSmall(n));
    }
    if !isovalue.is_finite() {
      return Err(ExtractionError::InvalidIsovalue(isovalue));
    }

    let (min, max) = field.min_max();
    if isovalue < min || isovalue > max {
      return Err(ExtractionError::NoSurface { isovalue, min, max });
    }

    let values: Vec<f32> = field.values().iter().map(|v| -v).collect();
    let extent = (n - 1) as f32;
    let mc = MarchingCubes::new(
      (n, n, n),
      (extent, extent, extent),
      (extent, extent, extent),
      McVec3::new(0.0, 0.0, 0.0),
      values,
      -isovalue,
    )
    .map_err(|err| ExtractionError::Backend(err.to_string()))?;
    let output = mc.generate(MeshSide::Both);

    let vertices = output
      .vertices
      .iter()
      .map(|v| [v.posit.x, v.posit.y, v.posit.z])
      .collect();
    let triangles = output
      .indices
      .chunks_exact(3)
      .map(|t| [t[0] as u32, t[1] as u32, t[2] as u32])
      .collect();

    let mut mesh = MeshOutput {
      vertices,
      triangles,
    };
    mesh.weld();
    if mesh.is_empty() {
      return Err(ExtractionError::EmptyMesh(isovalue));
    }

    tracing::trace!(
      resolution = n,
      isovalue,
      vertices = mesh.vertex_count(),
      triangles = mesh.triangle_count(),
      "extracted isosurface"
    );
    Ok(mesh)
  }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;
