//! SparseVoxelOctree - lazily allocated storage for a very large density field.
//!
//! ```text
//!   root (mip N, 16·2^N voxels)
//!    ├── child slots 0..8 (None until written)
//!    │     └── ... one level per mip ...
//!    │           └── leaf (mip 0, 16³) ── Option<Box<VoxelBlock>>
//! ```
//!
//! Writes descend from the root choosing one octant per level and create
//! whatever is missing along the way. A write that changes a stored sample
//! flags the leaf and every ancestor for mesh regeneration. Reads never
//! allocate and fall back to the configured default value.

use std::sync::Arc;

use glam::IVec3;

use super::{
  is_valid_path, NodeId, OctreeConfig, OctreeError, OctreeNode, TerrainNode, VoxelDataSource,
};
use crate::allocator::{BlockAllocator, HeapBlockAllocator};
use crate::constants::{
  sample_index, BASE_CELL_SIZE, INVALID_OCTREE_INDEX, NEGATIVE_GUTTER, SAMPLE_SIDE,
};
use crate::geometry::{is_point_in_cube, octant_containing_point};
use crate::types::{OctreeIndex, SampleBuffer, Voxel, VoxelBlock};

/// Sparse voxel octree owning its nodes and leaf blocks.
pub struct SparseVoxelOctree {
  config: OctreeConfig,
  tree_depth: u32,
  root: OctreeNode,
  allocator: Arc<dyn BlockAllocator>,
  node_count: usize,
}

impl SparseVoxelOctree {
  /// Create an empty octree drawing blocks from `allocator`.
  pub fn new(
    config: OctreeConfig,
    allocator: Arc<dyn BlockAllocator>,
  ) -> Result<Self, OctreeError> {
    config.validate()?;
    let tree_depth = config.tree_depth();
    Ok(Self {
      config,
      tree_depth,
      root: OctreeNode::new(NodeId::ROOT, IVec3::ZERO, tree_depth),
      allocator,
      node_count: 1,
    })
  }

  /// Create an empty octree backed by the global heap.
  pub fn with_heap_allocator(config: OctreeConfig) -> Result<Self, OctreeError> {
    Self::new(config, Arc::new(HeapBlockAllocator))
  }

  /// Construction parameters.
  pub fn config(&self) -> &OctreeConfig {
    &self.config
  }

  /// Levels below the root. Equal to the root's mip level.
  pub fn tree_depth(&self) -> u32 {
    self.tree_depth
  }

  /// The root node.
  pub fn root_node(&self) -> &OctreeNode {
    &self.root
  }

  /// Allocator shared with this octree.
  pub fn allocator(&self) -> &Arc<dyn BlockAllocator> {
    &self.allocator
  }

  /// Nodes currently in the tree, root included.
  pub fn node_count(&self) -> usize {
    self.node_count
  }

  /// Leaf blocks currently allocated.
  ///
  /// Walks the tree, so blocks installed through
  /// [`TerrainNode::set_voxel_data`] are counted too.
  pub fn allocated_block_count(&self) -> usize {
    count_blocks(&self.root)
  }

  /// Whether `position` lies inside the root volume.
  #[inline]
  pub fn contains(&self, position: IVec3) -> bool {
    is_point_in_cube(position, IVec3::ZERO, self.config.size_in_voxels)
  }

  /// Store `value` at `position`.
  ///
  /// Returns the owning leaf's index, or [`INVALID_OCTREE_INDEX`] when the
  /// value is outside the clamp range or the position outside the root.
  pub fn set_voxel_at(&mut self, position: IVec3, value: Voxel) -> OctreeIndex {
    if !self.config.accepts(value) {
      return INVALID_OCTREE_INDEX;
    }
    if !self.contains(position) {
      tracing::warn!(
        %position,
        size = self.config.size_in_voxels,
        "rejected write outside the octree volume"
      );
      return INVALID_OCTREE_INDEX;
    }

    let mut ctx = WriteContext {
      allocator: &*self.allocator,
      fill: self.config.default_value,
      created_nodes: 0,
    };
    let (index, _changed) = write_voxel(&mut self.root, position, value, &mut ctx);
    self.node_count += ctx.created_nodes;
    index
  }

  /// Sample at `position`; the default value outside the root or in
  /// unwritten space.
  pub fn get_voxel_at(&self, position: IVec3) -> Voxel {
    if !self.contains(position) {
      return self.config.default_value;
    }
    self
      .leaf_containing(position)
      .and_then(|leaf| leaf.voxel_data().map(|block| block[leaf.local_block_index(position)]))
      .unwrap_or(self.config.default_value)
  }

  /// Deepest existing node on the way to `position` if it is a leaf.
  pub fn leaf_containing(&self, position: IVec3) -> Option<&OctreeNode> {
    if !self.contains(position) {
      return None;
    }
    let mut node = &self.root;
    while !node.is_leaf() {
      let half = node.size_in_voxels() / 2;
      let octant = octant_containing_point(position, node.bottom_left(), half);
      node = node.child_node(octant)?;
    }
    Some(node)
  }

  /// Fill `out` with the node's sample lattice.
  ///
  /// Samples are spaced `size / 16` apart, start one step below the node's
  /// bottom-left corner and end two steps past its far side. Iteration is Z
  /// outer, Y, then X innermost, matching [`sample_index`].
  pub fn voxels_for_node(&self, node: &dyn TerrainNode, out: &mut SampleBuffer) {
    let stride = (node.size_in_voxels() / BASE_CELL_SIZE as u32) as i32;
    let start = node.bottom_left() - IVec3::splat(stride * NEGATIVE_GUTTER as i32);

    let mut i = 0;
    for z in 0..SAMPLE_SIDE as i32 {
      for y in 0..SAMPLE_SIDE as i32 {
        for x in 0..SAMPLE_SIDE as i32 {
          out[i] = self.get_voxel_at(start + IVec3::new(x, y, z) * stride);
          i += 1;
        }
      }
    }
    debug_assert_eq!(i, sample_index(17, 17, 17) + 1);
  }

  /// Node named by `id`, if it exists.
  pub fn find_node(&self, id: NodeId) -> Option<&OctreeNode> {
    if id.depth() > self.tree_depth {
      return None;
    }
    let mut node = &self.root;
    for octant in id.octants() {
      node = node.child_node(octant)?;
    }
    Some(node)
  }

  /// Mutable node named by `id`, if it exists.
  pub fn find_node_mut(&mut self, id: NodeId) -> Option<&mut OctreeNode> {
    if id.depth() > self.tree_depth {
      return None;
    }
    walk_mut(&mut self.root, id)
  }

  /// Leaf named by `index`, if it exists.
  pub fn find_node_from_index(&self, index: OctreeIndex) -> Option<&OctreeNode> {
    self.find_node(NodeId::from_leaf_index(index, self.tree_depth)?)
  }

  /// Leaf named by `index`.
  ///
  /// With `create_if_missing` every missing node on the path is created and
  /// the whole path is flagged for regeneration.
  pub fn find_node_from_index_mut(
    &mut self,
    index: OctreeIndex,
    create_if_missing: bool,
  ) -> Option<&mut OctreeNode> {
    let id = NodeId::from_leaf_index(index, self.tree_depth)?;
    if !create_if_missing {
      return walk_mut(&mut self.root, id);
    }

    let mut created = 0;
    let mut node = &mut self.root;
    for octant in id.octants() {
      node.mark_dirty();
      node = node.child_or_insert(octant, &mut created);
    }
    node.mark_dirty();
    self.node_count += created;
    Some(node)
  }

  /// Dense block of the leaf named by `index`, if allocated.
  pub fn node_voxel_data(&self, index: OctreeIndex) -> Option<&VoxelBlock> {
    self.find_node_from_index(index)?.voxel_data()
  }

  /// Dense block of an existing leaf, allocated and default filled if absent.
  pub fn allocate_node_voxel_data(&mut self, index: OctreeIndex) -> Option<&mut VoxelBlock> {
    let id = NodeId::from_leaf_index(index, self.tree_depth)?;
    let leaf = walk_mut(&mut self.root, id)?;
    leaf.ensure_block(&*self.allocator, self.config.default_value);
    leaf.block_mut()
  }

  /// Create every child of `id` for `levels` levels, stopping at leaves.
  /// Returns the number of nodes created.
  pub fn create_children_for_first_n_mip_levels(&mut self, id: NodeId, levels: u32) -> usize {
    let Some(node) = self.find_node_mut(id) else {
      return 0;
    };
    let mut created = 0;
    populate_levels(node, levels, &mut created);
    self.node_count += created;
    created
  }

  /// Indices of every leaf holding an allocated block.
  pub fn allocated_leaf_indices(&self) -> Vec<OctreeIndex> {
    let mut out = Vec::new();
    collect_allocated_leaves(&self.root, &mut out);
    out
  }

  /// Tear down every node and block, leaving an empty root.
  ///
  /// Every block found in the tree goes back to the allocator, including
  /// blocks installed directly on a node.
  pub fn clear(&mut self) {
    let (nodes, blocks) = self.root.release_subtree(&*self.allocator);
    tracing::debug!(nodes, blocks, "octree cleared");
    self.root = OctreeNode::new(NodeId::ROOT, IVec3::ZERO, self.tree_depth);
    self.node_count = 1;
  }

  /// Tear down and re-initialise with a new root size.
  pub fn resize_and_clear(&mut self, size_in_voxels: u32) -> Result<(), OctreeError> {
    let config = self.config.clone().with_size(size_in_voxels);
    config.validate()?;
    self.clear();
    self.tree_depth = config.tree_depth();
    self.config = config;
    self.root = OctreeNode::new(NodeId::ROOT, IVec3::ZERO, self.tree_depth);
    tracing::debug!(size = size_in_voxels, depth = self.tree_depth, "octree resized");
    Ok(())
  }
}

impl Drop for SparseVoxelOctree {
  fn drop(&mut self) {
    self.root.release_subtree(&*self.allocator);
  }
}

impl std::fmt::Debug for SparseVoxelOctree {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SparseVoxelOctree")
      .field("config", &self.config)
      .field("node_count", &self.node_count)
      .field("block_count", &self.allocated_block_count())
      .finish_non_exhaustive()
  }
}

struct WriteContext<'a> {
  allocator: &'a dyn BlockAllocator,
  fill: Voxel,
  created_nodes: usize,
}

/// Descend to the leaf owning `position`, creating what is missing, and
/// store `value`. Returns the leaf index and whether the sample changed;
/// every node on a changed path is flagged dirty on the way back up.
fn write_voxel(
  node: &mut OctreeNode,
  position: IVec3,
  value: Voxel,
  ctx: &mut WriteContext,
) -> (OctreeIndex, bool) {
  if node.is_leaf() {
    node.ensure_block(ctx.allocator, ctx.fill);
    let index = node.local_block_index(position);
    let changed = match node.block_mut() {
      Some(block) if block[index] != value => {
        block[index] = value;
        true
      }
      _ => false,
    };
    if changed {
      node.mark_dirty();
    }
    return (node.id().leaf_index(), changed);
  }

  let half = node.size_in_voxels() / 2;
  let octant = octant_containing_point(position, node.bottom_left(), half);
  let child = node.child_or_insert(octant, &mut ctx.created_nodes);
  let (index, changed) = write_voxel(child, position, value, ctx);
  if changed {
    node.mark_dirty();
  }
  (index, changed)
}

fn walk_mut(root: &mut OctreeNode, id: NodeId) -> Option<&mut OctreeNode> {
  let mut node = root;
  for octant in id.octants() {
    node = node.child_node_mut(octant)?;
  }
  Some(node)
}

fn populate_levels(node: &mut OctreeNode, levels: u32, created: &mut usize) {
  if levels == 0 || node.is_leaf() {
    return;
  }
  for octant in 0..8 {
    let child = node.child_or_insert(octant, created);
    populate_levels(child, levels - 1, created);
  }
}

fn count_blocks(node: &OctreeNode) -> usize {
  if node.is_leaf() {
    return node.voxel_data().is_some() as usize;
  }
  node.children().map(|(_, child)| count_blocks(child)).sum()
}

fn collect_allocated_leaves(node: &OctreeNode, out: &mut Vec<OctreeIndex>) {
  if node.is_leaf() {
    if node.voxel_data().is_some() {
      debug_assert!(is_valid_path(node.id().path(), node.id().depth()));
      out.push(node.id().leaf_index());
    }
    return;
  }
  for (_, child) in node.children() {
    collect_allocated_leaves(child, out);
  }
}

impl VoxelDataSource for SparseVoxelOctree {
  fn size(&self) -> u32 {
    self.config.size_in_voxels
  }

  fn clamp_range(&self) -> (Voxel, Voxel) {
    (self.config.clamp_low, self.config.clamp_high)
  }

  fn default_value(&self) -> Voxel {
    self.config.default_value
  }

  fn get_voxel_at(&self, position: IVec3) -> Voxel {
    SparseVoxelOctree::get_voxel_at(self, position)
  }

  fn set_voxel_at(&mut self, position: IVec3, value: Voxel) -> OctreeIndex {
    SparseVoxelOctree::set_voxel_at(self, position, value)
  }

  fn voxels_for_node(&self, node: &dyn TerrainNode, out: &mut SampleBuffer) {
    SparseVoxelOctree::voxels_for_node(self, node, out)
  }

  fn find_node_from_index(&self, index: OctreeIndex) -> Option<&dyn TerrainNode> {
    SparseVoxelOctree::find_node_from_index(self, index).map(|n| n as &dyn TerrainNode)
  }

  fn find_node_from_index_mut(
    &mut self,
    index: OctreeIndex,
    create_if_missing: bool,
  ) -> Option<&mut dyn TerrainNode> {
    SparseVoxelOctree::find_node_from_index_mut(self, index, create_if_missing)
      .map(|n| n as &mut dyn TerrainNode)
  }

  fn node_voxel_data(&self, index: OctreeIndex) -> Option<&VoxelBlock> {
    SparseVoxelOctree::node_voxel_data(self, index)
  }

  fn allocate_node_voxel_data(&mut self, index: OctreeIndex) -> Option<&mut VoxelBlock> {
    SparseVoxelOctree::allocate_node_voxel_data(self, index)
  }

  fn root(&self) -> &dyn TerrainNode {
    &self.root
  }

  fn create_children_for_first_n_mip_levels(&mut self, id: NodeId, levels: u32) -> usize {
    SparseVoxelOctree::create_children_for_first_n_mip_levels(self, id, levels)
  }
}

#[cfg(test)]
#[path = "sparse_test.rs"]
mod sparse_test;
