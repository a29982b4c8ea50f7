use super::*;

fn paths() -> (PathBuf, PathBuf) {
	(PathBuf::from("frames"), PathBuf::from("meshes"))
}

#[test]
fn test_defaults() {
	let (source, output) = paths();
	let config = Config::default().into_batch_config(source, output).unwrap();

	assert_eq!(config.grid.resolution(), 400);
	assert_eq!(config.grid.influence_radius(), 0.005);
	assert_eq!(config.isovalue, 0.5);
	assert_eq!(config.max_workers, None);
	assert_eq!(config.pattern, FramePattern::new("PartStructure", "vtk"));
	assert_eq!(config.accumulation, AccumulationMode::Parallel);
	assert_eq!(config.vertex_space, VertexSpace::Grid);
	assert_eq!(config.source_dir, PathBuf::from("frames"));
}

#[test]
fn test_load_toml() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("bake.toml");
	std::fs::write(
		&path,
		"iso = 0.25\ngrid_size = 128\nradius = 0.01\nmax_workers = 3\nprefix = \"PartFluid\"\nnormalized_vertices = true\n",
	)
	.unwrap();

	let config = Config::load(&path).unwrap();
	assert_eq!(config.iso, Some(0.25));
	assert_eq!(config.grid_size, Some(128));
	assert_eq!(config.prefix.as_deref(), Some("PartFluid"));
	assert_eq!(config.extension, None);

	let (source, output) = paths();
	let batch = config.into_batch_config(source, output).unwrap();
	assert_eq!(batch.max_workers, Some(3));
	assert_eq!(batch.pattern.extension, "vtk");
	assert_eq!(batch.vertex_space, VertexSpace::Normalized);
}

#[test]
fn test_cli_overrides_file() {
	let file = Config {
		iso: Some(0.25),
		grid_size: Some(128),
		sequential_accumulation: Some(true),
		..Config::default()
	};
	let cli = Config {
		iso: Some(0.75),
		max_workers: Some(2),
		..Config::default()
	};

	let merged = file.merge(cli);
	assert_eq!(merged.iso, Some(0.75));
	assert_eq!(merged.grid_size, Some(128));
	assert_eq!(merged.max_workers, Some(2));
	assert_eq!(merged.sequential_accumulation, Some(true));
}

#[test]
fn test_unknown_keys_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("bake.toml");
	std::fs::write(&path, "grid = 10\n").unwrap();

	let err = Config::load(&path).unwrap_err();
	assert!(format!("{err:#}").contains("Failed to parse"));
}

#[test]
fn test_missing_file() {
	let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
	assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_invalid_values_rejected() {
	let (source, output) = paths();
	let zero_workers = Config {
		max_workers: Some(0),
		..Config::default()
	};
	assert!(zero_workers.into_batch_config(source.clone(), output.clone()).is_err());

	// Default radius does not fit the kernel window at resolution 500.
	let too_fine = Config {
		grid_size: Some(500),
		..Config::default()
	};
	let err = too_fine.into_batch_config(source, output).unwrap_err();
	assert!(format!("{err:#}").contains("grid_size 500"));
}
