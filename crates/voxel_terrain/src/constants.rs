//! Block and sample-lattice layout constants for 16³ terrain leaves.
//!
//! # Sample Lattice Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SAMPLE LATTICE (one axis)                          │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Lattice coord: -1    0     1    ...    15    16    17                  │
//! │                  │    │                       │     │                   │
//! │                  │    └──── 16 cells (0-15) ──┘     │                   │
//! │                  │                            │     │                   │
//! │                  └─ negative gutter           │     └─ positive gutter  │
//! │                     (normals at cell 0)       │        (normals at 16)  │
//! │                                               └─ far corner of cell 15  │
//! │                                                                         │
//! │  Buffer index:   0    1     2    ...    16    17    18                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A leaf stores 16³ voxels. Sampling a node for polygonization reads
//! `1 + 16 + 2 = 19` samples per axis at a stride of `size / 16`.
//!
//! # Memory Layout
//!
//! Both the dense block and the sample buffer are X innermost:
//!
//! ```text
//! block index  = x + 16 * y + 256 * z
//! sample index = (x + 1) + 19 * (y + 1) + 361 * (z + 1)
//! ```

/// Voxels per axis in a mip 0 block.
pub const BASE_CELL_SIZE: usize = 16;

/// Samples taken before the node's bottom-left corner on every axis.
pub const NEGATIVE_GUTTER: usize = 1;

/// Samples taken past the node's far side on every axis.
pub const POSITIVE_GUTTER: usize = 2;

/// Samples per axis in a node's sample lattice (19).
pub const SAMPLE_SIDE: usize = NEGATIVE_GUTTER + BASE_CELL_SIZE + POSITIVE_GUTTER;

/// Samples per lattice slice (19² = 361).
pub const SAMPLE_SLICE: usize = SAMPLE_SIDE * SAMPLE_SIDE;

/// Total samples in a node's lattice (19³ = 6859).
pub const SAMPLE_VOLUME: usize = SAMPLE_SLICE * SAMPLE_SIDE;

/// Voxels per block slice (16² = 256).
pub const BLOCK_SLICE: usize = BASE_CELL_SIZE * BASE_CELL_SIZE;

/// Voxels in a dense mip 0 block (16³ = 4096).
pub const BLOCK_VOLUME: usize = BLOCK_SLICE * BASE_CELL_SIZE;

/// Bits used per tree level in an octree path index.
pub const INDEX_BITS_PER_LEVEL: u32 = 4;

/// Deepest tree supported by a 64 bit path index.
pub const MAX_TREE_DEPTH: u32 = u64::BITS / INDEX_BITS_PER_LEVEL;

/// Returned by writes that were rejected.
pub const INVALID_OCTREE_INDEX: u64 = u64::MAX;

/// Vertices reserved up front for one polygonize result.
pub const MAX_CELL_VERTICES: usize = 5000;

/// Indices reserved up front for one polygonize result.
pub const MAX_CELL_INDICES: usize = 10000;

/// Flatten block-local coordinates (each in `0..16`).
#[inline(always)]
pub const fn block_index(x: usize, y: usize, z: usize) -> usize {
  x + y * BASE_CELL_SIZE + z * BLOCK_SLICE
}

/// Inverse of [`block_index`].
#[inline(always)]
pub const fn block_coord(index: usize) -> (usize, usize, usize) {
  (
    index % BASE_CELL_SIZE,
    (index / BASE_CELL_SIZE) % BASE_CELL_SIZE,
    index / BLOCK_SLICE,
  )
}

/// Flatten lattice coordinates (each in `-1..=17`) into a sample buffer index.
#[inline(always)]
pub const fn sample_index(x: i32, y: i32, z: i32) -> usize {
  let n = NEGATIVE_GUTTER as i32;
  (x + n) as usize + (y + n) as usize * SAMPLE_SIDE + (z + n) as usize * SAMPLE_SLICE
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
