use std::io::Cursor;

use glam::IVec3;

use super::*;
use crate::constants::{block_coord, INVALID_OCTREE_INDEX};
use crate::octree::{NodeId, OctreeConfig, SparseVoxelOctree, TerrainNode};

fn octree(size: u32) -> SparseVoxelOctree {
  SparseVoxelOctree::with_heap_allocator(OctreeConfig::new(size)).unwrap()
}

fn written_tree() -> SparseVoxelOctree {
  let mut tree = octree(128);
  for (i, p) in [IVec3::new(1, 2, 3), IVec3::new(70, 5, 90), IVec3::new(127, 127, 127)]
    .into_iter()
    .enumerate()
  {
    tree.set_voxel_at(p, -10 * (i as i8 + 1));
  }
  tree
}

fn save(tree: &SparseVoxelOctree) -> Vec<u8> {
  let mut bytes = Vec::new();
  save_leaves(&mut bytes, &tree.allocated_leaf_indices(), tree).unwrap();
  bytes
}

// ===== Batch 1: Layout =====

/// Header then one fixed-size record per leaf, little endian.
#[test]
fn test_layout() {
  let tree = written_tree();
  let indices = tree.allocated_leaf_indices();
  let bytes = save(&tree);

  assert_eq!(bytes.len(), 8 + indices.len() * RECORD_SIZE);
  assert_eq!(&bytes[0..4], &FORMAT_VERSION.to_le_bytes());
  assert_eq!(&bytes[4..8], &(indices.len() as u32).to_le_bytes());
  assert_eq!(&bytes[8..16], &indices[0].to_le_bytes());

  let block = tree.node_voxel_data(indices[0]).unwrap();
  for (i, &voxel) in block.iter().enumerate() {
    assert_eq!(bytes[16 + i] as i8, voxel);
  }
}

/// No leaves gives a bare header.
#[test]
fn test_empty_export() {
  let tree = octree(64);
  let mut bytes = Vec::new();
  save_leaves(&mut bytes, &[], &tree).unwrap();
  assert_eq!(bytes, [0, 0, 0, 0, 0, 0, 0, 0]);

  let mut fresh = octree(64);
  assert_eq!(load_leaves(&mut Cursor::new(bytes), &mut fresh).unwrap(), 0);
  assert!(fresh.allocated_leaf_indices().is_empty());
}

// ===== Batch 2: Round trip =====

/// Loading into a fresh tree restores every sample of every exported leaf.
#[test]
fn test_round_trip_restores_samples() {
  let tree = written_tree();
  let bytes = save(&tree);

  let mut fresh = octree(128);
  let loaded = load_leaves(&mut Cursor::new(bytes), &mut fresh).unwrap();
  assert_eq!(loaded, 3);
  assert_eq!(fresh.allocated_leaf_indices(), tree.allocated_leaf_indices());

  for index in tree.allocated_leaf_indices() {
    let leaf = tree.find_node_from_index(index).unwrap();
    for i in 0..crate::constants::BLOCK_VOLUME {
      let (x, y, z) = block_coord(i);
      let p = leaf.bottom_left() + IVec3::new(x as i32, y as i32, z as i32);
      assert_eq!(fresh.get_voxel_at(p), tree.get_voxel_at(p), "at {p}");
    }
  }
}

/// Loaded paths are flagged for meshing.
#[test]
fn test_loaded_leaves_are_dirty() {
  let tree = written_tree();
  let mut fresh = octree(128);
  load_leaves(&mut Cursor::new(save(&tree)), &mut fresh).unwrap();

  for index in fresh.allocated_leaf_indices() {
    let id = NodeId::from_leaf_index(index, fresh.tree_depth()).unwrap();
    assert!(fresh.find_node(id).unwrap().needs_regenerating());
    assert!(fresh.find_node(id.parent().unwrap()).unwrap().needs_regenerating());
  }
  assert!(fresh.root_node().needs_regenerating());
}

/// Loading over existing data replaces the block contents.
#[test]
fn test_load_overwrites_existing_block() {
  let tree = written_tree();
  let bytes = save(&tree);

  let mut target = octree(128);
  target.set_voxel_at(IVec3::new(1, 2, 3), 55);
  target.set_voxel_at(IVec3::new(4, 4, 4), 66);
  load_leaves(&mut Cursor::new(bytes), &mut target).unwrap();

  assert_eq!(target.get_voxel_at(IVec3::new(1, 2, 3)), -10);
  assert_eq!(target.get_voxel_at(IVec3::new(4, 4, 4)), tree.get_voxel_at(IVec3::new(4, 4, 4)));
}

/// File wrappers round trip through disk.
#[test]
fn test_file_round_trip() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("leaves.bin");
  let tree = written_tree();

  save_to_file(&path, &tree.allocated_leaf_indices(), &tree).unwrap();
  let mut fresh = octree(128);
  assert_eq!(load_from_file(&path, &mut fresh).unwrap(), 3);
  assert_eq!(fresh.get_voxel_at(IVec3::new(70, 5, 90)), -20);
  assert_eq!(fresh.get_voxel_at(IVec3::new(127, 127, 127)), -30);
}

// ===== Batch 3: Errors =====

/// Saving an unallocated index fails before anything is written.
#[test]
fn test_save_missing_leaf() {
  let tree = written_tree();
  let mut indices = tree.allocated_leaf_indices();
  let missing = NodeId::ROOT.child(7).child(0).child(0).leaf_index();
  indices.push(missing);

  let mut bytes = Vec::new();
  let err = save_leaves(&mut bytes, &indices, &tree).unwrap_err();
  assert!(matches!(err, SerializationError::MissingLeaf(i) if i == missing));
  assert!(bytes.is_empty());
}

/// A record whose index is not a leaf path is rejected.
#[test]
fn test_load_invalid_index() {
  let mut bytes = Vec::new();
  bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
  bytes.extend_from_slice(&1u32.to_le_bytes());
  bytes.extend_from_slice(&INVALID_OCTREE_INDEX.to_le_bytes());
  bytes.extend_from_slice(&[0u8; crate::constants::BLOCK_VOLUME]);

  let mut fresh = octree(128);
  let err = load_leaves(&mut Cursor::new(bytes), &mut fresh).unwrap_err();
  assert!(matches!(err, SerializationError::MissingLeaf(INVALID_OCTREE_INDEX)));
}

/// Truncated input surfaces as an i/o error.
#[test]
fn test_load_truncated() {
  let mut bytes = save(&written_tree());
  bytes.truncate(bytes.len() - 100);

  let mut fresh = octree(128);
  let err = load_leaves(&mut Cursor::new(bytes), &mut fresh).unwrap_err();
  match err {
    SerializationError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
    other => panic!("expected i/o error, got {other:?}"),
  }
}

/// Another version still loads.
#[test]
fn test_version_mismatch_still_loads() {
  let tree = written_tree();
  let mut bytes = save(&tree);
  bytes[0..4].copy_from_slice(&7u32.to_le_bytes());

  let mut fresh = octree(128);
  assert_eq!(load_leaves(&mut Cursor::new(bytes), &mut fresh).unwrap(), 3);
  assert_eq!(fresh.get_voxel_at(IVec3::new(1, 2, 3)), -10);
}
