//! Frame discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::batch::types::FramePattern;
use crate::error::BatchError;

/// List frame files directly inside `source_dir`, sorted by file name.
///
/// Subdirectories are not searched. Symlinks to regular files count as frames.
pub fn discover_frames(source_dir: &Path, pattern: &FramePattern) -> Result<Vec<PathBuf>, BatchError> {
  let mut frames = Vec::new();

  for entry in WalkDir::new(source_dir)
    .max_depth(1)
    .follow_links(true)
    .sort_by_file_name()
  {
    let entry = match entry {
      Ok(entry) => entry,
      // Broken symlinks and similar inside the directory are skipped.
      Err(err) if err.depth() > 0 => {
        tracing::warn!("skipping unreadable entry: {err}");
        continue;
      }
      Err(source) => {
        return Err(BatchError::Discovery {
          path: source_dir.to_path_buf(),
          source,
        })
      }
    };

    if entry.depth() == 0 {
      if !entry.file_type().is_dir() {
        return Err(BatchError::NotADirectory(source_dir.to_path_buf()));
      }
      continue;
    }
    if !entry.file_type().is_file() {
      continue;
    }
    let Some(name) = entry.file_name().to_str() else {
      continue;
    };
    if pattern.matches(name) {
      frames.push(entry.into_path());
    }
  }

  tracing::info!(
    "Found {} frames matching '{}*.{}' in {}",
    frames.len(),
    pattern.prefix,
    pattern.extension,
    source_dir.display()
  );
  Ok(frames)
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod discovery_test;
