//! Grid parameters for the density field.
//!
//! A `GridSpec` is immutable once built. It owns the derived kernel constants
//! (`r²`, `σ²`) so they are computed once per batch rather than per point.
//!
//! ```text
//! spacing = 1 / resolution
//! r2      = radius²
//! sigma2  = (radius / 2)²
//! weight  = exp(-dist² / (2 · sigma2))   when dist² < r2
//! ```

use crate::constants::{MAX_RESOLUTION, NEIGHBORHOOD_REACH, RADIUS_TOLERANCE};
use crate::error::ConfigError;
use crate::types::Point3;

/// Immutable density grid configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
  resolution: usize,
  spacing: f64,
  influence_radius: f64,
  r2: f64,
  sigma2: f64,
}

impl GridSpec {
  /// Build and validate a grid over the unit cube.
  ///
  /// The kernel window is fixed at `NEIGHBORHOOD_REACH` cells per side, so the
  /// radius must not exceed `NEIGHBORHOOD_REACH * spacing`.
  pub fn new(resolution: usize, influence_radius: f64) -> Result<Self, ConfigError> {
    if resolution == 0 {
      return Err(ConfigError::ZeroResolution);
    }
    if resolution > MAX_RESOLUTION {
      return Err(ConfigError::ResolutionTooLarge {
        resolution,
        max: MAX_RESOLUTION,
      });
    }
    if !influence_radius.is_finite() || influence_radius <= 0.0 {
      return Err(ConfigError::InvalidRadius(influence_radius));
    }

    let limit = Self::max_radius(resolution);
    if influence_radius > limit * (1.0 + RADIUS_TOLERANCE) {
      return Err(ConfigError::RadiusExceedsWindow {
        radius: influence_radius,
        limit,
        reach: NEIGHBORHOOD_REACH,
        resolution,
      });
    }

    let half = influence_radius / 2.0;
    Ok(Self {
      resolution,
      spacing: 1.0 / resolution as f64,
      influence_radius,
      r2: influence_radius * influence_radius,
      sigma2: half * half,
    })
  }

  /// Largest influence radius the fixed window covers at `resolution`.
  pub fn max_radius(resolution: usize) -> f64 {
    NEIGHBORHOOD_REACH as f64 / resolution.max(1) as f64
  }

  #[inline]
  pub fn resolution(&self) -> usize {
    self.resolution
  }

  #[inline]
  pub fn spacing(&self) -> f64 {
    self.spacing
  }

  #[inline]
  pub fn influence_radius(&self) -> f64 {
    self.influence_radius
  }

  /// Squared kernel cutoff.
  #[inline]
  pub fn radius_sq(&self) -> f64 {
    self.r2
  }

  /// Squared Gaussian bandwidth.
  #[inline]
  pub fn sigma_sq(&self) -> f64 {
    self.sigma2
  }

  /// Total number of cells (`resolution³`).
  pub fn cell_count(&self) -> usize {
    self.resolution * self.resolution * self.resolution
  }

  /// Linear index of an in-range cell.
  #[inline(always)]
  pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
    i + self.resolution * (j + self.resolution * k)
  }

  /// Whether a signed cell coordinate lies inside `[0, resolution)`.
  #[inline(always)]
  pub fn in_range(&self, c: i64) -> bool {
    c >= 0 && c < self.resolution as i64
  }

  /// Grid-space coordinate of cell index `c` along one axis.
  #[inline(always)]
  pub fn cell_coord(&self, c: i64) -> f64 {
    c as f64 * self.spacing
  }

  /// Kernel weight for a squared distance, `None` outside the cutoff.
  #[inline(always)]
  pub fn weight(&self, dist2: f64) -> Option<f64> {
    if dist2 < self.r2 {
      Some((-dist2 / (2.0 * self.sigma2)).exp())
    } else {
      None
    }
  }

  /// Home cell of a point: `floor(p / spacing)` per axis.
  ///
  /// Returns `None` for non-finite points and for points whose window cannot
  /// touch any cell, which also keeps the window arithmetic far from integer
  /// overflow.
  pub fn home_cell(&self, p: Point3) -> Option<[i64; 3]> {
    let lo = -NEIGHBORHOOD_REACH as f64;
    let hi = (self.resolution as i64 - 1 + NEIGHBORHOOD_REACH) as f64;
    let mut cell = [0i64; 3];
    for (axis, value) in p.to_array().into_iter().enumerate() {
      let c = (value as f64 / self.spacing).floor();
      if !(lo..=hi).contains(&c) {
        return None;
      }
      cell[axis] = c as i64;
    }
    Some(cell)
  }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
