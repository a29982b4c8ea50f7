//! Legacy VTK point reader.
//!
//! Only the `POINTS` section is consumed; cells, point data and everything
//! after the coordinates are ignored.
//!
//! ```text
//! # vtk DataFile Version 3.0          ← line 1, required
//! PartStructure                       ← line 2, title
//! BINARY                              ← line 3, ASCII | BINARY
//! DATASET POLYDATA                    ← POLYDATA | UNSTRUCTURED_GRID | STRUCTURED_GRID
//! POINTS 12345 float                  ← float | double
//! <3 × n values>                      ← ASCII tokens or big-endian binary
//! ```

use std::path::Path;

use crate::error::SourceError;
use crate::source::PointCloudSource;
use crate::types::Point3;

const SUPPORTED_DATASETS: [&str; 3] = ["POLYDATA", "UNSTRUCTURED_GRID", "STRUCTURED_GRID"];

/// Reads legacy `.vtk` particle files.
#[derive(Clone, Copy, Debug, Default)]
pub struct VtkPointSource;

impl VtkPointSource {
  pub fn new() -> Self {
    Self
  }
}

impl PointCloudSource for VtkPointSource {
  fn read(&self, frame: &Path) -> Result<Vec<Point3>, SourceError> {
    let bytes = std::fs::read(frame)?;
    parse_vtk(&bytes)
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Encoding {
  Ascii,
  Binary,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ScalarType {
  Float,
  Double,
}

impl ScalarType {
  fn size(self) -> usize {
    match self {
      ScalarType::Float => 4,
      ScalarType::Double => 8,
    }
  }
}

/// Line cursor over raw file bytes; binary payloads start after a newline.
struct Cursor<'a> {
  bytes: &'a [u8],
  pos: usize,
}

impl<'a> Cursor<'a> {
  fn next_line(&mut self) -> Option<&'a str> {
    if self.pos >= self.bytes.len() {
      return None;
    }
    let rest = &self.bytes[self.pos..];
    let len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    self.pos += (len + 1).min(rest.len());
    let line = &rest[..len];
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    // Non-UTF-8 header lines are treated as empty so the caller reports them.
    Some(std::str::from_utf8(line).unwrap_or(""))
  }

  fn next_content_line(&mut self) -> Option<&'a str> {
    loop {
      let line = self.next_line()?.trim();
      if !line.is_empty() {
        return Some(line);
      }
    }
  }

  fn rest(&self) -> &'a [u8] {
    &self.bytes[self.pos.min(self.bytes.len())..]
  }
}

/// Parse the point coordinates of a legacy VTK file.
pub fn parse_vtk(bytes: &[u8]) -> Result<Vec<Point3>, SourceError> {
  let mut cursor = Cursor { bytes, pos: 0 };

  let magic = cursor
    .next_line()
    .ok_or_else(|| SourceError::format("empty file"))?;
  if !magic.trim_start().to_ascii_lowercase().starts_with("# vtk datafile") {
    return Err(SourceError::format("missing '# vtk DataFile' header"));
  }

  cursor
    .next_line()
    .ok_or_else(|| SourceError::format("missing title line"))?;

  let encoding = match cursor.next_content_line().map(str::to_ascii_uppercase).as_deref() {
    Some("ASCII") => Encoding::Ascii,
    Some("BINARY") => Encoding::Binary,
    Some(other) => return Err(SourceError::format(format!("unknown encoding '{other}'"))),
    None => return Err(SourceError::format("missing encoding line")),
  };

  let dataset = cursor
    .next_content_line()
    .ok_or_else(|| SourceError::format("missing DATASET line"))?;
  let mut tokens = dataset.split_whitespace();
  if !tokens.next().is_some_and(|t| t.eq_ignore_ascii_case("DATASET")) {
    return Err(SourceError::format(format!("expected DATASET, found '{dataset}'")));
  }
  let kind = tokens.next().unwrap_or("").to_ascii_uppercase();
  if !SUPPORTED_DATASETS.contains(&kind.as_str()) {
    return Err(SourceError::format(format!("unsupported dataset '{kind}'")));
  }

  let (count, scalar) = loop {
    let line = cursor
      .next_content_line()
      .ok_or_else(|| SourceError::format("no POINTS section"))?;
    let mut tokens = line.split_whitespace();
    if tokens.next().is_some_and(|t| t.eq_ignore_ascii_case("POINTS")) {
      break parse_points_header(tokens.next(), tokens.next())?;
    }
  };

  let coords = match encoding {
    Encoding::Ascii => read_ascii(cursor.rest(), count)?,
    Encoding::Binary => read_binary(cursor.rest(), count, scalar)?,
  };

  coords
    .chunks_exact(3)
    .enumerate()
    .map(|(i, c)| {
      if c.iter().all(|v| v.is_finite()) {
        Ok(Point3::new(c[0] as f32, c[1] as f32, c[2] as f32))
      } else {
        Err(SourceError::format(format!("non-finite coordinate at point {i}")))
      }
    })
    .collect()
}

fn parse_points_header(
  count: Option<&str>,
  scalar: Option<&str>,
) -> Result<(usize, ScalarType), SourceError> {
  let count = count
    .and_then(|c| c.parse::<usize>().ok())
    .ok_or_else(|| SourceError::format("invalid POINTS count"))?;
  let scalar = match scalar.map(str::to_ascii_lowercase).as_deref() {
    Some("float") => ScalarType::Float,
    Some("double") => ScalarType::Double,
    Some(other) => return Err(SourceError::format(format!("unsupported POINTS type '{other}'"))),
    None => return Err(SourceError::format("missing POINTS type")),
  };
  Ok((count, scalar))
}

fn read_ascii(rest: &[u8], count: usize) -> Result<Vec<f64>, SourceError> {
  let wanted = count
    .checked_mul(3)
    .ok_or_else(|| SourceError::format("POINTS count overflows"))?;
  // Each value needs at least two bytes of text; cap the reservation.
  let mut values = Vec::with_capacity(wanted.min(rest.len() / 2 + 1));

  let tokens = rest
    .split(|b| b.is_ascii_whitespace())
    .filter(|t| !t.is_empty())
    .take(wanted);
  for token in tokens {
    let value = std::str::from_utf8(token)
      .ok()
      .and_then(|t| t.parse::<f64>().ok())
      .ok_or_else(|| {
        SourceError::format(format!(
          "invalid coordinate '{}'",
          String::from_utf8_lossy(token)
        ))
      })?;
    values.push(value);
  }

  if values.len() < wanted {
    return Err(SourceError::format(format!(
      "expected {wanted} coordinates, found {}",
      values.len()
    )));
  }
  Ok(values)
}

fn read_binary(rest: &[u8], count: usize, scalar: ScalarType) -> Result<Vec<f64>, SourceError> {
  let size = scalar.size();
  let needed = count
    .checked_mul(3 * size)
    .ok_or_else(|| SourceError::format("POINTS count overflows"))?;
  if rest.len() < needed {
    return Err(SourceError::format(format!(
      "truncated binary POINTS: need {needed} bytes, found {}",
      rest.len()
    )));
  }

  let payload = &rest[..needed];
  let values = match scalar {
    ScalarType::Float => payload
      .chunks_exact(4)
      .map(|b| f32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64)
      .collect(),
    ScalarType::Double => payload
      .chunks_exact(8)
      .map(|b| f64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
      .collect(),
  };
  Ok(values)
}

#[cfg(test)]
#[path = "vtk_test.rs"]
mod vtk_test;
