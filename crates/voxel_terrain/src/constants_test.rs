use super::*;

#[test]
fn test_lattice_dimensions() {
  assert_eq!(SAMPLE_SIDE, 19);
  assert_eq!(SAMPLE_VOLUME, 6859);
  assert_eq!(BLOCK_VOLUME, 4096);
}

#[test]
fn test_block_index_roundtrip() {
  for z in 0..BASE_CELL_SIZE {
    for y in 0..BASE_CELL_SIZE {
      for x in 0..BASE_CELL_SIZE {
        let idx = block_index(x, y, z);
        assert_eq!(block_coord(idx), (x, y, z), "Roundtrip failed for ({}, {}, {})", x, y, z);
      }
    }
  }
}

#[test]
fn test_block_index_is_x_innermost() {
  assert_eq!(block_index(1, 0, 0), 1);
  assert_eq!(block_index(0, 1, 0), 16);
  assert_eq!(block_index(0, 0, 1), 256);
  assert_eq!(block_index(15, 15, 15), BLOCK_VOLUME - 1);
}

#[test]
fn test_sample_index_covers_gutters() {
  assert_eq!(sample_index(-1, -1, -1), 0);
  assert_eq!(sample_index(0, 0, 0), 1 + SAMPLE_SIDE + SAMPLE_SLICE);
  assert_eq!(sample_index(17, 17, 17), SAMPLE_VOLUME - 1);
}

#[test]
fn test_max_depth_fits_index() {
  assert_eq!(MAX_TREE_DEPTH, 16);
  assert_eq!(INVALID_OCTREE_INDEX, 0xffff_ffff_ffff_ffff);
}
