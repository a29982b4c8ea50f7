//! Grid and kernel constants.
//!
//! # Kernel Window
//!
//! ```text
//! Every point visits a fixed window around its home cell:
//!
//!   offset:   -2    -1     0    +1    +2
//!              │     │     │     │     │
//!           ┌─────┬─────┬─────┬─────┬─────┐
//!           │     │     │ [p] │     │     │   per axis, 5³ = 125 cells
//!           └─────┴─────┴─────┴─────┴─────┘
//!                        home
//!
//! The window is NOT sized to the influence radius. A radius wider than
//! NEIGHBORHOOD_REACH cells would be silently truncated, so GridSpec rejects it.
//! ```
//!
//! # Memory Layout
//!
//! ```text
//! index = i + n * (j + n * k)
//!
//! X is minor (stride 1), Y is middle (stride n), Z is major (stride n²).
//! One z-plane is a contiguous n² slice, which is what the parallel
//! plane-gather accumulation splits on.
//! ```

/// Cells visited on each side of the home cell, per axis.
pub const NEIGHBORHOOD_REACH: i64 = 2;

/// Width of the kernel window per axis (5).
pub const NEIGHBORHOOD_WIDTH: usize = (2 * NEIGHBORHOOD_REACH + 1) as usize;

/// Cells in the full kernel window (125).
pub const NEIGHBORHOOD_CELLS: usize = NEIGHBORHOOD_WIDTH * NEIGHBORHOOD_WIDTH * NEIGHBORHOOD_WIDTH;

/// Largest accepted grid resolution (1024³ f32 = 4 GiB per frame).
pub const MAX_RESOLUTION: usize = 1024;

/// Relative slack when comparing the influence radius against the window reach,
/// so decimal inputs like `0.005` at resolution 400 are not rejected by
/// rounding.
pub const RADIUS_TOLERANCE: f64 = 1e-9;

/// Default grid resolution.
pub const DEFAULT_RESOLUTION: usize = 400;

/// Default kernel influence radius in normalized units.
pub const DEFAULT_INFLUENCE_RADIUS: f64 = 0.005;

/// Default isovalue for surface extraction.
pub const DEFAULT_ISOVALUE: f32 = 0.5;

/// Default frame filename prefix (DualSPHysics particle output).
pub const DEFAULT_FRAME_PREFIX: &str = "PartStructure";

/// Default frame file extension.
pub const DEFAULT_FRAME_EXTENSION: &str = "vtk";

/// Default mesh file extension.
pub const DEFAULT_MESH_EXTENSION: &str = "obj";

/// Worker count used when the platform cannot report its parallelism.
pub const FALLBACK_WORKERS: usize = 4;

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
