//! Path codes naming octree nodes without pointers.
//!
//! A path stores one octant per level, 4 bits each, root level in the lowest
//! nibble:
//!
//! ```text
//! path = octant(level 0) | octant(level 1) << 4 | octant(level 2) << 8 | ...
//! ```
//!
//! A leaf's path is its [`OctreeIndex`]. Octants only use the low 3 bits of
//! a nibble, so `0xF` never appears in a valid path and the all-ones
//! sentinel cannot collide with a real leaf.

use smallvec::SmallVec;

use crate::constants::{INDEX_BITS_PER_LEVEL, MAX_TREE_DEPTH};
use crate::types::OctreeIndex;

const NIBBLE_MASK: u64 = 0xF;

/// Mask covering the first `depth` levels of a path.
#[inline]
const fn level_mask(depth: u32) -> u64 {
  if depth >= MAX_TREE_DEPTH {
    u64::MAX
  } else {
    (1u64 << (depth * INDEX_BITS_PER_LEVEL)) - 1
  }
}

/// Stable name of a node: the octants walked from the root and how many.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
  path: u64,
  depth: u32,
}

impl NodeId {
  /// The root node.
  pub const ROOT: NodeId = NodeId { path: 0, depth: 0 };

  /// Build an id from a raw path. Returns `None` if the path has octant
  /// nibbles above 7 or bits beyond `depth` levels.
  pub fn new(path: u64, depth: u32) -> Option<Self> {
    is_valid_path(path, depth).then_some(Self { path, depth })
  }

  /// Id of the leaf named by `index` in a tree of `tree_depth` levels.
  #[inline]
  pub fn from_leaf_index(index: OctreeIndex, tree_depth: u32) -> Option<Self> {
    Self::new(index, tree_depth)
  }

  /// Raw path bits.
  #[inline]
  pub fn path(self) -> u64 {
    self.path
  }

  /// Levels below the root.
  #[inline]
  pub fn depth(self) -> u32 {
    self.depth
  }

  /// Mip level of this node in a tree of `tree_depth` levels.
  #[inline]
  pub fn mip_level(self, tree_depth: u32) -> u32 {
    tree_depth - self.depth
  }

  /// Octant chosen at `level` (0 = the root's child).
  #[inline]
  pub fn octant_at(self, level: u32) -> u8 {
    debug_assert!(level < self.depth);
    ((self.path >> (level * INDEX_BITS_PER_LEVEL)) & NIBBLE_MASK) as u8
  }

  /// Octants from the root down.
  pub fn octants(self) -> SmallVec<[u8; MAX_TREE_DEPTH as usize]> {
    (0..self.depth).map(|level| self.octant_at(level)).collect()
  }

  /// Id of the child in `octant`.
  #[inline]
  pub fn child(self, octant: u8) -> NodeId {
    debug_assert!(octant < 8 && self.depth < MAX_TREE_DEPTH);
    NodeId {
      path: self.path | (octant as u64) << (self.depth * INDEX_BITS_PER_LEVEL),
      depth: self.depth + 1,
    }
  }

  /// Id of the parent, `None` for the root.
  pub fn parent(self) -> Option<NodeId> {
    let depth = self.depth.checked_sub(1)?;
    Some(NodeId {
      path: self.path & level_mask(depth),
      depth,
    })
  }

  /// Whether `self` lies strictly above `other` on its path.
  pub fn is_ancestor_of(self, other: NodeId) -> bool {
    self.depth < other.depth && other.path & level_mask(self.depth) == self.path
  }

  /// The path as a leaf index. Only meaningful for leaves.
  #[inline]
  pub fn leaf_index(self) -> OctreeIndex {
    self.path
  }
}

/// Whether `path` is a well formed path of exactly `depth` levels.
pub fn is_valid_path(path: u64, depth: u32) -> bool {
  if depth > MAX_TREE_DEPTH || path & !level_mask(depth) != 0 {
    return false;
  }
  (0..depth).all(|level| (path >> (level * INDEX_BITS_PER_LEVEL)) & NIBBLE_MASK < 8)
}

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;
