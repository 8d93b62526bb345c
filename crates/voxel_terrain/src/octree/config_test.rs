use super::*;

#[test]
fn test_default_config_is_valid() {
  let config = OctreeConfig::default();
  assert_eq!(config.validate(), Ok(()));
  assert_eq!(config.tree_depth(), 7, "2048 = 16 * 2^7");
  assert_eq!(config.default_value, config.clamp_high);
}

#[test]
fn test_clamp_range_moves_default() {
  let config = OctreeConfig::new(64).with_clamp_range(-50, 50);
  assert_eq!(config.default_value, 50);
  assert!(config.accepts(-50));
  assert!(config.accepts(50));
  assert!(!config.accepts(51));
  assert!(!config.accepts(-51));
}

#[test]
fn test_rejects_non_power_of_two() {
  assert_eq!(OctreeConfig::new(48).validate(), Err(OctreeError::InvalidSize(48)));
  assert_eq!(OctreeConfig::new(8).validate(), Err(OctreeError::InvalidSize(8)));
  assert_eq!(OctreeConfig::new(0).validate(), Err(OctreeError::InvalidSize(0)));
}

#[test]
fn test_single_leaf_root_is_valid() {
  let config = OctreeConfig::new(16);
  assert_eq!(config.validate(), Ok(()));
  assert_eq!(config.tree_depth(), 0);
}

#[test]
fn test_rejects_too_deep_tree() {
  let config = OctreeConfig::new(1 << 31);
  assert_eq!(
    config.validate(),
    Err(OctreeError::TooDeep {
      size: 1 << 31,
      depth: 27
    })
  );
}

#[test]
fn test_rejects_default_outside_range() {
  let config = OctreeConfig::new(64)
    .with_clamp_range(-10, 10)
    .with_default_value(20);
  assert!(matches!(
    config.validate(),
    Err(OctreeError::InvalidClampRange { .. })
  ));
}
