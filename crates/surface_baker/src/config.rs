//! Configuration for batch mesh baking.
//!
//! Settings come from three layers, highest priority first: command-line
//! flags, an optional TOML file, then built-in defaults.
//!
//! ```toml
//! iso = 0.5
//! grid_size = 400
//! radius = 0.005
//! max_workers = 8
//! prefix = "PartStructure"
//! extension = "vtk"
//! normalized_vertices = false
//! sequential_accumulation = false
//! log_level = "info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use particle_surface::constants::{
	DEFAULT_FRAME_EXTENSION, DEFAULT_FRAME_PREFIX, DEFAULT_INFLUENCE_RADIUS, DEFAULT_ISOVALUE,
	DEFAULT_RESOLUTION,
};
use particle_surface::{AccumulationMode, BatchConfig, FramePattern, GridSpec, VertexSpace};

/// Partial settings; every field is optional so layers can be merged.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Isovalue for surface extraction.
	pub iso: Option<f32>,
	/// Grid resolution per axis.
	pub grid_size: Option<usize>,
	/// Kernel influence radius in normalized units.
	pub radius: Option<f64>,
	/// Upper bound on concurrently processed frames.
	pub max_workers: Option<usize>,
	/// Frame filename prefix.
	pub prefix: Option<String>,
	/// Frame file extension, without the dot.
	pub extension: Option<String>,
	/// Write vertices in [0,1) instead of grid-index space.
	pub normalized_vertices: Option<bool>,
	/// Accumulate each frame on one thread.
	pub sequential_accumulation: Option<bool>,
	/// Log filter used when RUST_LOG is unset.
	pub log_level: Option<String>,
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		let config: Config = toml::from_str(&content)
			.with_context(|| format!("Failed to parse config TOML: {}", path.display()))?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<()> {
		if let Some(iso) = self.iso {
			if !iso.is_finite() {
				anyhow::bail!("iso must be finite, got {iso}");
			}
		}
		if self.max_workers == Some(0) {
			anyhow::bail!("max_workers must be at least 1");
		}
		if self.extension.as_deref() == Some("") {
			anyhow::bail!("extension must not be empty");
		}
		Ok(())
	}

	/// Layer `overrides` on top of `self`; set fields in `overrides` win.
	pub fn merge(self, overrides: Config) -> Config {
		Config {
			iso: overrides.iso.or(self.iso),
			grid_size: overrides.grid_size.or(self.grid_size),
			radius: overrides.radius.or(self.radius),
			max_workers: overrides.max_workers.or(self.max_workers),
			prefix: overrides.prefix.or(self.prefix),
			extension: overrides.extension.or(self.extension),
			normalized_vertices: overrides.normalized_vertices.or(self.normalized_vertices),
			sequential_accumulation: overrides
				.sequential_accumulation
				.or(self.sequential_accumulation),
			log_level: overrides.log_level.or(self.log_level),
		}
	}

	/// Fill in defaults and build the library configuration.
	pub fn into_batch_config(self, source_dir: PathBuf, output_dir: PathBuf) -> Result<BatchConfig> {
		self.validate()?;

		let resolution = self.grid_size.unwrap_or(DEFAULT_RESOLUTION);
		let radius = self.radius.unwrap_or(DEFAULT_INFLUENCE_RADIUS);
		let grid = GridSpec::new(resolution, radius)
			.with_context(|| format!("Invalid grid (grid_size {resolution}, radius {radius})"))?;

		let pattern = FramePattern::new(
			self.prefix.unwrap_or_else(|| DEFAULT_FRAME_PREFIX.to_string()),
			self.extension.unwrap_or_else(|| DEFAULT_FRAME_EXTENSION.to_string()),
		);
		let accumulation = if self.sequential_accumulation.unwrap_or(false) {
			AccumulationMode::Sequential
		} else {
			AccumulationMode::Parallel
		};
		let vertex_space = if self.normalized_vertices.unwrap_or(false) {
			VertexSpace::Normalized
		} else {
			VertexSpace::Grid
		};

		let mut config = BatchConfig::new(source_dir, output_dir, grid)
			.with_isovalue(self.iso.unwrap_or(DEFAULT_ISOVALUE))
			.with_pattern(pattern)
			.with_accumulation(accumulation)
			.with_vertex_space(vertex_space);
		if let Some(workers) = self.max_workers {
			config = config.with_max_workers(workers);
		}
		Ok(config)
	}
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
