use glam::{IVec3, Vec3};

use super::*;
use crate::octree::{OctreeConfig, SparseVoxelOctree};

fn octree(size: u32) -> SparseVoxelOctree {
  SparseVoxelOctree::with_heap_allocator(OctreeConfig::new(size)).unwrap()
}

// ===== Batch 1: Height gradient =====

/// Gradient values follow the height formula.
#[test]
fn test_height_values() {
  let gradient = HeightGradientPopulator::new(10.0).with_falloff(4.0);
  let range = (-127, 127);
  assert_eq!(gradient.value_at(10, range), 0);
  assert_eq!(gradient.value_at(12, range), 64);
  assert_eq!(gradient.value_at(8, range), -64);
  assert_eq!(gradient.value_at(6, range), -127);
  assert_eq!(gradient.value_at(0, range), -127);
  assert_eq!(gradient.value_at(30, range), 127);
}

/// Every voxel below `depth` holds the gradient; saturated air stays sparse.
#[test]
fn test_height_gradient_populates_slices() {
  let mut tree = octree(32);
  let gradient = HeightGradientPopulator::new(10.0).with_falloff(4.0).with_depth(16);
  let report = gradient.populate(&mut tree);

  assert_eq!(report.rejected, 0);
  assert_eq!(report.written, 14 * 32 * 16);
  assert_eq!(report.touched.len(), 2);

  for z in [0, 7, 15] {
    for y in 0..32 {
      for x in [0, 17, 31] {
        let p = IVec3::new(x, y, z);
        assert_eq!(tree.get_voxel_at(p), gradient.value_at(y, (-127, 127)), "at {p}");
      }
    }
  }
  assert_eq!(tree.get_voxel_at(IVec3::new(3, 3, 16)), 127);
  assert_eq!(tree.allocated_block_count(), 2);
}

/// Depth beyond the volume is clipped.
#[test]
fn test_height_depth_clipped() {
  let mut tree = octree(16);
  let report = HeightGradientPopulator::new(4.0).with_depth(1000).populate(&mut tree);
  assert_eq!(report.rejected, 0);
  assert_eq!(report.touched.len(), 1);
  assert_eq!(tree.get_voxel_at(IVec3::new(0, 0, 15)), -127);
}

// ===== Batch 2: Sphere =====

/// Center saturates low, the shell sits at zero, outside is positive.
#[test]
fn test_sphere_values() {
  let mut tree = octree(32);
  let sphere = SpherePopulator::new(Vec3::splat(16.0), 6.0);
  let report = sphere.populate(&mut tree);

  assert_eq!(report.rejected, 0);
  assert_eq!(tree.get_voxel_at(IVec3::splat(16)), -127);
  assert_eq!(tree.get_voxel_at(IVec3::new(22, 16, 16)), 0);
  assert_eq!(tree.get_voxel_at(IVec3::new(16, 16, 23)), 21);
  assert!(tree.get_voxel_at(IVec3::new(16, 13, 16)) < 0);
  assert_eq!(tree.get_voxel_at(IVec3::new(0, 0, 0)), 127);
}

/// The written region spans the leaves around the center only.
#[test]
fn test_sphere_touches_surrounding_leaves() {
  let mut tree = octree(64);
  let report = SpherePopulator::new(Vec3::splat(16.0), 6.0).populate(&mut tree);

  assert_eq!(report.touched.len(), 8);
  let mut allocated = tree.allocated_leaf_indices();
  allocated.sort_unstable();
  assert_eq!(allocated, report.sorted_touched());
}

/// A sphere hanging over the volume edge is clipped, not rejected.
#[test]
fn test_sphere_clipped_at_edges() {
  let mut tree = octree(32);
  let report = SpherePopulator::new(Vec3::new(0.0, 0.0, 0.0), 5.0).populate(&mut tree);
  assert_eq!(report.rejected, 0);
  assert!(report.written > 0);
  assert_eq!(tree.get_voxel_at(IVec3::ZERO), -127);
}

/// Same input, same report.
#[test]
fn test_populate_is_deterministic() {
  let sphere = SpherePopulator::default();
  let a = sphere.populate(&mut octree(64));
  let b = sphere.populate(&mut octree(64));
  assert_eq!(a, b);
}

// ===== Batch 3: Report =====

/// Sentinel indices count as rejected and are not recorded as touched.
#[test]
fn test_report_records_rejections() {
  let mut report = PopulateReport::default();
  report.record(INVALID_OCTREE_INDEX);
  report.record(0x12);
  report.record(0x12);
  report.record(0x3);

  assert_eq!(report.rejected, 1);
  assert_eq!(report.written, 3);
  assert_eq!(report.sorted_touched(), vec![0x3, 0x12]);
}
