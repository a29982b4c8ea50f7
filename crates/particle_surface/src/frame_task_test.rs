use glam::Vec3;

use super::*;
use crate::error::ExtractionError;
use crate::extract::MarchingCubesExtractor;
use crate::mesh_writer::ObjWriter;
use crate::source::VtkPointSource;
use crate::test_utils::{blob_points, FailingWriter, FixedSource, PanickingSource};

fn config(output_dir: &Path) -> FrameConfig {
  FrameConfig::new(GridSpec::new(16, 0.125).unwrap(), output_dir)
}

fn blob() -> Vec<Vec3> {
  blob_points(Vec3::splat(0.5), 0.15, 6)
}

fn failure(outcome: FrameOutcome) -> FrameFailure {
  match outcome {
    FrameOutcome::Failure(failure) => failure,
    FrameOutcome::Success { frame, .. } => panic!("{} unexpectedly succeeded", frame.display()),
  }
}

#[test]
fn test_success_writes_mesh_named_after_frame() {
  let dir = tempfile::tempdir().unwrap();
  let config = config(dir.path());
  let source = FixedSource::new(blob());
  let writer = ObjWriter::new();
  let task = FrameTask::new(&config, &source, &MarchingCubesExtractor, &writer);

  let outcome = task.run(Path::new("frames/PartStructure_0007.vtk"));

  let (frame, mesh_path, stats) = match outcome {
    FrameOutcome::Success {
      frame,
      mesh_path,
      stats,
    } => (frame, mesh_path, stats),
    FrameOutcome::Failure(failure) => panic!("expected success: {failure}"),
  };
  assert_eq!(frame, Path::new("frames/PartStructure_0007.vtk"));
  assert_eq!(mesh_path, dir.path().join("PartStructure_0007.obj"));
  assert!(mesh_path.exists());
  assert_eq!(stats.points, 216);
  assert!(stats.triangles > 0);
  assert!(stats.vertices > 0);

  let text = std::fs::read_to_string(&mesh_path).unwrap();
  let faces = text.lines().filter(|l| l.starts_with("f ")).count();
  assert_eq!(faces, stats.triangles);
}

#[test]
fn test_dotted_stem_keeps_full_name() {
  let dir = tempfile::tempdir().unwrap();
  let config = config(dir.path());
  let source = FixedSource::new(blob());
  let writer = ObjWriter::new();
  let task = FrameTask::new(&config, &source, &MarchingCubesExtractor, &writer);

  let outcome = task.run(Path::new("run.v2_0001.vtk"));
  assert_eq!(outcome.mesh_path(), Some(dir.path().join("run.v2_0001.obj").as_path()));
}

#[test]
fn test_format_error_fails_read_stage() {
  let dir = tempfile::tempdir().unwrap();
  let config = config(dir.path());
  let source = FixedSource::new(blob());
  let writer = ObjWriter::new();
  let task = FrameTask::new(&config, &source, &MarchingCubesExtractor, &writer);

  let failure = failure(task.run(Path::new("corrupt_0001.vtk")));

  assert_eq!(failure.stage, Stage::Read);
  assert_eq!(failure.error.kind(), "FormatError");
  assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_file_is_read_error() {
  let dir = tempfile::tempdir().unwrap();
  let config = config(dir.path());
  let writer = ObjWriter::new();
  let task = FrameTask::new(&config, &VtkPointSource, &MarchingCubesExtractor, &writer);

  let failure = failure(task.run(&dir.path().join("absent.vtk")));

  assert_eq!(failure.stage, Stage::Read);
  assert!(matches!(failure.error, FrameError::Read(_)));
  assert!(failure.to_string().contains("absent.vtk: read failed"));
}

#[test]
fn test_empty_field_fails_extract_stage() {
  let dir = tempfile::tempdir().unwrap();
  let config = config(dir.path());
  let source = FixedSource::new(Vec::new());
  let writer = ObjWriter::new();
  let task = FrameTask::new(&config, &source, &MarchingCubesExtractor, &writer);

  let failure = failure(task.run(Path::new("empty_0000.vtk")));

  assert_eq!(failure.stage, Stage::Extract);
  assert!(matches!(
    failure.error,
    FrameError::Extraction(ExtractionError::NoSurface { .. })
  ));
  assert!(!dir.path().join("empty_0000.obj").exists());
}

#[test]
fn test_panic_is_captured_as_unexpected() {
  let dir = tempfile::tempdir().unwrap();
  let config = config(dir.path());
  let writer = ObjWriter::new();
  let task = FrameTask::new(&config, &PanickingSource, &MarchingCubesExtractor, &writer);

  let failure = failure(task.run(Path::new("boom_0000.vtk")));

  assert_eq!(failure.stage, Stage::Read);
  assert_eq!(failure.error.kind(), "UnexpectedError");
  assert!(failure.error.to_string().contains("source exploded"));
}

#[test]
fn test_failed_write_leaves_no_mesh() {
  let dir = tempfile::tempdir().unwrap();
  let config = config(dir.path());
  let source = FixedSource::new(blob());
  let task = FrameTask::new(&config, &source, &MarchingCubesExtractor, &FailingWriter);

  let failure = failure(task.run(Path::new("frame_0003.vtk")));

  assert_eq!(failure.stage, Stage::Write);
  assert_eq!(failure.error.kind(), "WriteError");
  assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_normalized_vertices_stay_in_unit_cube() {
  let dir = tempfile::tempdir().unwrap();
  let config = config(dir.path()).with_vertex_space(VertexSpace::Normalized);
  let source = FixedSource::new(blob());
  let writer = ObjWriter::new();
  let task = FrameTask::new(&config, &source, &MarchingCubesExtractor, &writer);

  let outcome = task.run(Path::new("frame_0000.vtk"));
  let mesh_path = outcome.mesh_path().unwrap();

  let text = std::fs::read_to_string(mesh_path).unwrap();
  for line in text.lines().filter(|l| l.starts_with("v ")) {
    for value in line[2..].split_whitespace() {
      let value: f32 = value.parse().unwrap();
      assert!((0.0..1.0).contains(&value), "{line}");
    }
  }
}

#[test]
fn test_accumulation_modes_agree() {
  let dir = tempfile::tempdir().unwrap();
  let source = FixedSource::new(blob());
  let mut triangles = Vec::new();

  for mode in [AccumulationMode::Sequential, AccumulationMode::Parallel] {
    let config = config(dir.path()).with_accumulation(mode);
    let writer = ObjWriter::new();
    let task = FrameTask::new(&config, &source, &MarchingCubesExtractor, &writer);
    let FrameOutcome::Success { stats, .. } = task.run(Path::new("frame_0000.vtk")) else {
      panic!("{mode:?} failed");
    };
    triangles.push(stats.triangles);
  }

  // Summation order may move a vertex across the isovalue, not the whole surface.
  let (a, b) = (triangles[0] as i64, triangles[1] as i64);
  assert!((a - b).abs() <= a / 20, "{a} vs {b}");
}
