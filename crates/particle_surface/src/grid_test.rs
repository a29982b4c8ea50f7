use glam::Vec3;

use super::*;

#[test]
fn test_derived_constants() {
  let spec = GridSpec::new(10, 0.05).unwrap();

  assert_eq!(spec.resolution(), 10);
  assert!((spec.spacing() - 0.1).abs() < 1e-15);
  assert!((spec.radius_sq() - 0.0025).abs() < 1e-15);
  assert!((spec.sigma_sq() - 0.000625).abs() < 1e-15);
  assert_eq!(spec.cell_count(), 1000);
}

#[test]
fn test_rejects_zero_resolution() {
  assert_eq!(GridSpec::new(0, 0.1), Err(ConfigError::ZeroResolution));
}

#[test]
fn test_rejects_oversized_grid() {
  assert!(matches!(
    GridSpec::new(MAX_RESOLUTION + 1, 1e-4),
    Err(ConfigError::ResolutionTooLarge { .. })
  ));
}

#[test]
fn test_rejects_bad_radius() {
  assert!(matches!(GridSpec::new(10, 0.0), Err(ConfigError::InvalidRadius(_))));
  assert!(matches!(GridSpec::new(10, -0.1), Err(ConfigError::InvalidRadius(_))));
  assert!(matches!(GridSpec::new(10, f64::NAN), Err(ConfigError::InvalidRadius(_))));
}

#[test]
fn test_radius_must_fit_window() {
  // spacing 0.1 -> window reaches 0.2
  assert!(GridSpec::new(10, 0.2).is_ok());
  let err = GridSpec::new(10, 0.25).unwrap_err();
  match err {
    ConfigError::RadiusExceedsWindow { reach, resolution, .. } => {
      assert_eq!(reach, 2);
      assert_eq!(resolution, 10);
    }
    other => panic!("unexpected error {other:?}"),
  }
}

#[test]
fn test_decimal_radius_at_boundary_is_accepted() {
  // 2 / 400 == 0.005 only up to rounding.
  assert!(GridSpec::new(400, 0.005).is_ok());
  assert!(GridSpec::new(500, 0.005).is_err());
  assert!(GridSpec::new(500, 0.004).is_ok());
}

#[test]
fn test_weight_cutoff() {
  let spec = GridSpec::new(8, 0.25).unwrap();

  assert_eq!(spec.weight(0.0), Some(1.0));
  let near = spec.weight(0.01).unwrap();
  let far = spec.weight(0.04).unwrap();
  assert!(near > far && far > 0.0);
  // Cutoff is strict.
  assert_eq!(spec.weight(spec.radius_sq()), None);
}

#[test]
fn test_home_cell_floors() {
  let spec = GridSpec::new(8, 0.25).unwrap();

  assert_eq!(spec.home_cell(Vec3::new(0.5, 0.0, 0.99)), Some([4, 0, 7]));
  // Slightly below zero floors to -1, still within reach of cell 0.
  assert_eq!(spec.home_cell(Vec3::new(-0.01, 0.5, 0.5)), Some([-1, 4, 4]));
}

#[test]
fn test_home_cell_out_of_reach() {
  let spec = GridSpec::new(8, 0.25).unwrap();

  assert_eq!(spec.home_cell(Vec3::new(2.0, 0.5, 0.5)), None);
  assert_eq!(spec.home_cell(Vec3::new(0.5, -1.0, 0.5)), None);
  assert_eq!(spec.home_cell(Vec3::new(f32::NAN, 0.5, 0.5)), None);
  assert_eq!(spec.home_cell(Vec3::new(0.5, 0.5, f32::INFINITY)), None);
}

#[test]
fn test_index_layout_is_x_fastest() {
  let spec = GridSpec::new(4, 0.5).unwrap();

  assert_eq!(spec.index(0, 0, 0), 0);
  assert_eq!(spec.index(1, 0, 0), 1);
  assert_eq!(spec.index(0, 1, 0), 4);
  assert_eq!(spec.index(0, 0, 1), 16);
  assert_eq!(spec.index(3, 3, 3), 63);
}
