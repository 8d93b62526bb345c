use density::*;
use glam::IVec3;

use super::*;

#[test]
fn test_density_zero() {
  assert_eq!(to_storage(0.0, 4.0, -127, 127), 0);
}

#[test]
fn test_density_saturates_at_clamp_limits() {
  assert_eq!(to_storage(100.0, 4.0, -50, 50), 50);
  assert_eq!(to_storage(-100.0, 4.0, -50, 50), -50);
}

#[test]
fn test_density_roundtrip_within_quantization() {
  let distance = -1.5;
  let stored = to_storage(distance, 4.0, -127, 127);
  let recovered = to_distance(stored, 4.0, 127);
  assert!((distance - recovered).abs() < 4.0 / 127.0);
}

#[test]
fn test_chunk_mesh_default_is_clean() {
  let mesh = ChunkMesh::default();
  assert!(mesh.handle.is_none());
  assert!(!mesh.needs_regenerating);
}

#[test]
fn test_uploaded_mesh_clears_dirty_flag() {
  let mesh = ChunkMesh::uploaded(MeshHandle(3), 12, 30);
  assert_eq!(mesh.handle, Some(MeshHandle(3)));
  assert_eq!(mesh.index_count, 30);
  assert!(!mesh.needs_regenerating);
}

#[test]
fn test_chunk_key_stride() {
  let key = ChunkKey {
    id: crate::octree::NodeId::ROOT,
    bottom_left: IVec3::ZERO,
    size_in_voxels: 64,
    mip_level: 2,
  };
  assert_eq!(key.sample_stride(), 4);
}
