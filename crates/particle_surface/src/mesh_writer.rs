//! Mesh persistence.
//!
//! `ObjWriter` never leaves a partial mesh at the target path: it writes a
//! hidden sibling, flushes, and renames over the target. The sibling is removed
//! on any failure.
//!
//! ```text
//! out/PartStructure_0001.obj        ← target
//! out/.PartStructure_0001.obj.tmp   ← written first, then renamed
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_MESH_EXTENSION;
use crate::error::WriteError;
use crate::types::MeshOutput;

/// Persists a mesh at a path.
pub trait MeshWriter: Send + Sync {
  /// File extension (without the dot) of written meshes.
  fn extension(&self) -> &str;

  fn write(&self, path: &Path, mesh: &MeshOutput) -> Result<(), WriteError>;
}

/// Wavefront OBJ text writer.
#[derive(Clone, Debug)]
pub struct ObjWriter {
  header: bool,
}

impl Default for ObjWriter {
  fn default() -> Self {
    Self { header: true }
  }
}

impl ObjWriter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Toggle the leading `# <v> vertices, <t> triangles` comment.
  pub fn with_header(mut self, header: bool) -> Self {
    self.header = header;
    self
  }

  fn write_body(&self, out: &mut impl Write, mesh: &MeshOutput) -> std::io::Result<()> {
    if self.header {
      writeln!(
        out,
        "# {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
      )?;
    }
    for [x, y, z] in &mesh.vertices {
      writeln!(out, "v {x} {y} {z}")?;
    }
    for [a, b, c] in &mesh.triangles {
      writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    out.flush()
  }
}

impl MeshWriter for ObjWriter {
  fn extension(&self) -> &str {
    DEFAULT_MESH_EXTENSION
  }

  fn write(&self, path: &Path, mesh: &MeshOutput) -> Result<(), WriteError> {
    validate_indices(mesh)?;

    let tmp = temp_sibling(path);
    let result = File::create(&tmp)
      .and_then(|file| {
        let mut out = BufWriter::new(file);
        self.write_body(&mut out, mesh)?;
        out.into_inner().map_err(|e| e.into_error())?.sync_all()
      })
      .and_then(|()| fs::rename(&tmp, path));

    if let Err(err) = result {
      // Best effort; the original error is what matters.
      let _ = fs::remove_file(&tmp);
      return Err(err.into());
    }
    Ok(())
  }
}

/// Hidden temporary path next to `path`.
pub fn temp_sibling(path: &Path) -> PathBuf {
  let name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  path.with_file_name(format!(".{name}.tmp"))
}

fn validate_indices(mesh: &MeshOutput) -> Result<(), WriteError> {
  let vertex_count = mesh.vertex_count();
  for (triangle, tri) in mesh.triangles.iter().enumerate() {
    if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
      return Err(WriteError::InvalidIndex {
        triangle,
        index,
        vertex_count,
      });
    }
  }
  Ok(())
}

#[cfg(test)]
#[path = "mesh_writer_test.rs"]
mod mesh_writer_test;
