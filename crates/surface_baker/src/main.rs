//! Particle frame to surface mesh baker.
//!
//! Converts every `<prefix>*.<extension>` particle snapshot in a directory into
//! an OBJ isosurface mesh, several frames at a time.
//!
//! Exit status:
//! - 0: every frame produced a mesh (an empty directory counts)
//! - 1: at least one frame failed
//! - 2: configuration, discovery or output directory error

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use config::Config;
use particle_surface::{BatchOrchestrator, BatchResult, FrameOutcome};

/// Batch converter from particle VTK frames to OBJ surface meshes.
#[derive(Parser, Debug)]
#[command(name = "bake_meshes")]
#[command(about = "Bakes particle snapshots into isosurface meshes")]
struct Args {
	/// Directory containing the frame files.
	source_dir: PathBuf,

	/// Directory for the generated meshes (created if missing).
	output_dir: PathBuf,

	/// Isovalue for surface extraction [default: 0.5].
	#[arg(long)]
	iso: Option<f32>,

	/// Grid resolution per axis [default: 400].
	#[arg(long)]
	grid_size: Option<usize>,

	/// Kernel influence radius, normalized units [default: 0.005].
	#[arg(long)]
	radius: Option<f64>,

	/// Frames processed at once [default: available parallelism].
	#[arg(long)]
	max_workers: Option<usize>,

	/// Frame filename prefix [default: PartStructure].
	#[arg(long)]
	prefix: Option<String>,

	/// Frame file extension [default: vtk].
	#[arg(long)]
	extension: Option<String>,

	/// Write vertices in [0,1) instead of grid-index space.
	#[arg(long)]
	normalized_vertices: bool,

	/// Accumulate each frame on a single thread.
	#[arg(long)]
	sequential_accumulation: bool,

	/// TOML file with defaults; flags given here take precedence.
	#[arg(short, long)]
	config: Option<PathBuf>,
}

impl Args {
	/// Flags as a config layer; unset flags stay `None`.
	fn overrides(&self) -> Config {
		Config {
			iso: self.iso,
			grid_size: self.grid_size,
			radius: self.radius,
			max_workers: self.max_workers,
			prefix: self.prefix.clone(),
			extension: self.extension.clone(),
			normalized_vertices: self.normalized_vertices.then_some(true),
			sequential_accumulation: self.sequential_accumulation.then_some(true),
			log_level: None,
		}
	}
}

fn main() -> ExitCode {
	let args = Args::parse();

	match run(args) {
		Ok(result) => {
			print_summary(&result);
			ExitCode::from(result.exit_code() as u8)
		}
		Err(err) => {
			eprintln!("error: {err:#}");
			ExitCode::from(2)
		}
	}
}

fn run(args: Args) -> Result<BatchResult> {
	let file = match &args.config {
		Some(path) => Config::load(path)?,
		None => Config::default(),
	};
	let settings = file.merge(args.overrides());
	init_logging(settings.log_level.as_deref().unwrap_or("info"));

	if let Some(path) = &args.config {
		tracing::info!("Loaded config from: {}", path.display());
	}

	let batch = settings.into_batch_config(args.source_dir, args.output_dir)?;
	println!(
		"Meshing {} -> {} (grid {}³, radius {}, iso {})",
		batch.source_dir.display(),
		batch.output_dir.display(),
		batch.grid.resolution(),
		batch.grid.influence_radius(),
		batch.isovalue
	);

	BatchOrchestrator::new(batch)
		.run()
		.context("Batch could not start")
}

fn init_logging(default_level: &str) {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
		)
		.with_target(false)
		.init();
}

fn print_summary(result: &BatchResult) {
	println!();
	for outcome in &result.outcomes {
		match outcome {
			FrameOutcome::Success {
				frame,
				mesh_path,
				stats,
			} => println!(
				"  ok      {} -> {} ({} triangles, {} ms)",
				frame.display(),
				mesh_path.display(),
				stats.triangles,
				stats.timings.total_us() / 1000
			),
			FrameOutcome::Failure(failure) => {
				println!("  FAILED  {failure} [{}]", failure.error.kind())
			}
		}
	}

	let stats = &result.stats;
	println!(
		"\nProcessed {} frames: {} succeeded, {} failed (peak {} of {} workers, {:.2} s)",
		stats.frames,
		stats.succeeded,
		stats.failed,
		stats.peak_concurrency,
		stats.workers,
		stats.wall_time_us as f64 / 1e6
	);
}
