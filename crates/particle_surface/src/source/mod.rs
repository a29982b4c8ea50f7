//! Point cloud sources.
//!
//! A source turns a frame identifier into an ordered list of points. It must
//! be shareable between worker threads; each call is independent.

use std::path::Path;

use crate::error::SourceError;
use crate::types::Point3;

pub mod vtk;
pub use vtk::{parse_vtk, VtkPointSource};

/// Reads the points of one frame.
///
/// Implementations report I/O problems as `SourceError::Read` and unparsable
/// content as `SourceError::Format`.
pub trait PointCloudSource: Send + Sync {
  fn read(&self, frame: &Path) -> Result<Vec<Point3>, SourceError>;
}
