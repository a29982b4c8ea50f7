//! Density field rasterization.
//!
//! Splats an unordered point cloud into a regular `resolution³` grid with a
//! truncated Gaussian kernel. Two accumulation strategies produce the same
//! field (up to float summation order):
//!
//! ```text
//! Sequential (scatter):                 Parallel (plane gather):
//!
//!   for each point                        bucket points by home k
//!     for each cell in 5×5×5 window         │
//!       field[cell] += w(dist²)             ▼
//!                                         par_chunks_mut(n²)  ← one z-plane
//!                                           for home k in plane ± 2
//!                                             for point in bucket
//!                                               for cell in 5×5 slice
//!                                                 plane[cell] += w(dist²)
//! ```
//!
//! The gather form never shares a cell between threads, so no atomics or
//! per-thread partial grids are needed.

use std::collections::TryReserveError;

use rayon::prelude::*;

use crate::constants::NEIGHBORHOOD_REACH;
use crate::grid::GridSpec;
use crate::types::Point3;

/// Accumulation strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccumulationMode {
  /// Single-threaded scatter in point order.
  Sequential,
  /// Rayon plane gather.
  #[default]
  Parallel,
}

/// Scalar density on a regular grid over the unit cube.
///
/// Values are non-negative and only ever grow during accumulation.
#[derive(Clone, Debug)]
pub struct DensityField {
  spec: GridSpec,
  values: Vec<f32>,
}

impl DensityField {
  /// Allocate a zeroed field.
  pub fn new(spec: &GridSpec) -> Self {
    Self {
      spec: *spec,
      values: vec![0.0; spec.cell_count()],
    }
  }

  /// Allocate a zeroed field, reporting allocation failure instead of
  /// aborting.
  pub fn try_new(spec: &GridSpec) -> Result<Self, TryReserveError> {
    let len = spec.cell_count();
    let mut values = Vec::new();
    values.try_reserve_exact(len)?;
    values.resize(len, 0.0);
    Ok(Self {
      spec: *spec,
      values,
    })
  }

  /// Allocate and populate in one step.
  pub fn from_points(spec: &GridSpec, points: &[Point3], mode: AccumulationMode) -> Self {
    let mut field = Self::new(spec);
    field.accumulate_with(points, mode);
    field
  }

  pub fn spec(&self) -> &GridSpec {
    &self.spec
  }

  pub fn resolution(&self) -> usize {
    self.spec.resolution()
  }

  /// Raw values, x fastest then y then z.
  pub fn values(&self) -> &[f32] {
    &self.values
  }

  pub fn into_values(self) -> Vec<f32> {
    self.values
  }

  /// Value at cell `(i, j, k)`, `None` outside the grid.
  pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f32> {
    let n = self.spec.resolution();
    if i < n && j < n && k < n {
      Some(self.values[self.spec.index(i, j, k)])
    } else {
      None
    }
  }

  /// Smallest and largest value in the field.
  pub fn min_max(&self) -> (f32, f32) {
    self
      .values
      .iter()
      .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
      })
  }

  /// Sum of all cell values.
  pub fn total(&self) -> f64 {
    self.values.iter().map(|&v| v as f64).sum()
  }

  /// Number of cells that received any contribution.
  pub fn nonzero_count(&self) -> usize {
    self.values.iter().filter(|&&v| v > 0.0).count()
  }

  pub fn accumulate_with(&mut self, points: &[Point3], mode: AccumulationMode) {
    match mode {
      AccumulationMode::Sequential => self.accumulate(points),
      AccumulationMode::Parallel => self.accumulate_par(points),
    }
  }

  /// Scatter every point into its 5×5×5 window, in point order.
  pub fn accumulate(&mut self, points: &[Point3]) {
    let spec = self.spec;
    for &p in points {
      let Some(home) = spec.home_cell(p) else {
        continue;
      };
      for nk in window(home[2]) {
        if !spec.in_range(nk) {
          continue;
        }
        let plane_offset = nk as usize * spec.resolution() * spec.resolution();
        let plane_len = spec.resolution() * spec.resolution();
        splat_plane(
          &mut self.values[plane_offset..plane_offset + plane_len],
          &spec,
          p,
          home,
          nk,
        );
      }
    }
  }

  /// Gather each z-plane in parallel from the points that can reach it.
  pub fn accumulate_par(&mut self, points: &[Point3]) {
    let spec = self.spec;
    let n = spec.resolution();
    let reach = NEIGHBORHOOD_REACH;

    // Bucket b holds points whose home plane is b - reach.
    let mut buckets: Vec<Vec<(Point3, [i64; 3])>> = vec![Vec::new(); n + 2 * reach as usize];
    for &p in points {
      if let Some(home) = spec.home_cell(p) {
        buckets[(home[2] + reach) as usize].push((p, home));
      }
    }

    self
      .values
      .par_chunks_mut(n * n)
      .enumerate()
      .for_each(|(k, plane)| {
        let k = k as i64;
        // Home planes k-reach..=k+reach map to buckets k..=k+2*reach.
        for bucket in &buckets[k as usize..=(k + 2 * reach) as usize] {
          for &(p, home) in bucket {
            splat_plane(plane, &spec, p, home, k);
          }
        }
      });
  }
}

/// Window of cell coordinates around a home coordinate.
#[inline(always)]
fn window(home: i64) -> std::ops::RangeInclusive<i64> {
  (home - NEIGHBORHOOD_REACH)..=(home + NEIGHBORHOOD_REACH)
}

/// Add one point's contributions to the 5×5 window slice of plane `nk`.
#[inline]
fn splat_plane(plane: &mut [f32], spec: &GridSpec, p: Point3, home: [i64; 3], nk: i64) {
  let n = spec.resolution();
  let (px, py, pz) = (p.x as f64, p.y as f64, p.z as f64);
  let gz = spec.cell_coord(nk) - pz;
  let dz2 = gz * gz;

  for ni in window(home[0]) {
    if !spec.in_range(ni) {
      continue;
    }
    let gx = spec.cell_coord(ni) - px;
    let dx2 = gx * gx;
    for nj in window(home[1]) {
      if !spec.in_range(nj) {
        continue;
      }
      let gy = spec.cell_coord(nj) - py;
      let dist2 = dx2 + gy * gy + dz2;
      if let Some(w) = spec.weight(dist2) {
        let cell = &mut plane[ni as usize + n * nj as usize];
        // Sum in f64, store f32.
        *cell = (*cell as f64 + w) as f32;
      }
    }
  }
}

#[cfg(test)]
#[path = "density_test.rs"]
mod density_test;
