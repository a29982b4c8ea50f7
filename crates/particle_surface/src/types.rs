//! Core data types shared by the rasterizer, extractor and writer.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Particle position, pre-normalized into grid space `[0, 1)³`.
pub type Point3 = glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Triangle mesh produced by isosurface extraction.
///
/// Indices are 0-based; the OBJ writer converts to 1-based on output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshOutput {
  pub vertices: Vec<[f32; 3]>,
  pub triangles: Vec<[u32; 3]>,
}

impl MeshOutput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns true if no triangles were generated.
  pub fn is_empty(&self) -> bool {
    self.triangles.is_empty()
  }

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.triangles.len()
  }

  /// Bounding box of all vertices.
  pub fn bounds(&self) -> MinMaxAABB {
    let mut bounds = MinMaxAABB::empty();
    for &vertex in &self.vertices {
      bounds.encapsulate(vertex);
    }
    bounds
  }

  /// Multiply every vertex coordinate by `factor`.
  pub fn scale(&mut self, factor: f32) {
    for vertex in &mut self.vertices {
      for c in vertex.iter_mut() {
        *c *= factor;
      }
    }
  }

  /// Merge bit-identical vertices and drop degenerate or repeated triangles.
  ///
  /// A triangle repeated with reversed winding counts as a repeat; the first
  /// occurrence keeps its orientation. Unreferenced vertices are removed.
  pub fn weld(&mut self) {
    let mut remap = Vec::with_capacity(self.vertices.len());
    let mut unique: HashMap<[u32; 3], u32> = HashMap::with_capacity(self.vertices.len());
    let mut vertices = Vec::with_capacity(self.vertices.len());

    for vertex in &self.vertices {
      let key = vertex.map(f32::to_bits);
      let index = match unique.entry(key) {
        Entry::Occupied(slot) => *slot.get(),
        Entry::Vacant(slot) => {
          let index = vertices.len() as u32;
          vertices.push(*vertex);
          *slot.insert(index)
        }
      };
      remap.push(index);
    }

    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(self.triangles.len());
    let mut triangles = Vec::with_capacity(self.triangles.len());
    for tri in &self.triangles {
      let [a, b, c] = tri.map(|i| remap[i as usize]);
      if a == b || b == c || a == c {
        continue;
      }
      let mut key = [a, b, c];
      key.sort_unstable();
      if seen.insert(key) {
        triangles.push([a, b, c]);
      }
    }

    // Compact away vertices only referenced by dropped triangles.
    let mut used = vec![u32::MAX; vertices.len()];
    let mut compact = Vec::with_capacity(vertices.len());
    for tri in &mut triangles {
      for index in tri.iter_mut() {
        let slot = &mut used[*index as usize];
        if *slot == u32::MAX {
          *slot = compact.len() as u32;
          compact.push(vertices[*index as usize]);
        }
        *index = *slot;
      }
    }

    self.vertices = compact;
    self.triangles = triangles;
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
