//! OctreeNode - one node of the sparse voxel octree.
//!
//! Nodes own their children through fixed octant slots. A slot stays empty
//! until a write (or an explicit creation call) reaches that octant. Only mip
//! 0 nodes carry a dense block, and only once it has been written.

use glam::IVec3;

use super::NodeId;
use crate::allocator::BlockAllocator;
use crate::constants::block_index;
use crate::geometry::{child_bottom_left, is_point_in_cube, size_for_mip_level};
use crate::types::{ChunkKey, ChunkMesh, VoxelBlock};

/// Node capability consumed by LOD selection, serialization and renderers.
pub trait TerrainNode {
  /// Stable path name.
  fn id(&self) -> NodeId;

  /// Child in `octant` (bit 0 = +X, bit 1 = +Y, bit 2 = +Z), if created.
  fn child(&self, octant: u8) -> Option<&dyn TerrainNode>;

  /// Bottom-left corner in voxel units.
  fn bottom_left(&self) -> IVec3;

  /// Voxels per axis.
  fn size_in_voxels(&self) -> u32;

  /// Mip level (0 = leaf).
  fn mip_level(&self) -> u32;

  /// Current mesh state.
  fn mesh(&self) -> ChunkMesh;

  /// Replace the mesh state.
  fn set_mesh(&mut self, mesh: ChunkMesh);

  /// Dense block of a written leaf.
  fn voxel_data(&self) -> Option<&VoxelBlock>;

  /// Replace the dense block, returning the previous one. The caller owns
  /// the returned block and must hand it back to the allocator that made it.
  fn set_voxel_data(&mut self, block: Option<Box<VoxelBlock>>) -> Option<Box<VoxelBlock>>;

  /// Whether the mesh is stale.
  fn needs_regenerating(&self) -> bool {
    self.mesh().needs_regenerating
  }

  /// Whether any child slot is filled.
  fn has_children(&self) -> bool {
    (0..8).any(|octant| self.child(octant).is_some())
  }

  /// Identity handed to polygonize jobs.
  fn chunk_key(&self) -> ChunkKey {
    ChunkKey {
      id: self.id(),
      bottom_left: self.bottom_left(),
      size_in_voxels: self.size_in_voxels(),
      mip_level: self.mip_level(),
    }
  }
}

/// Octree node with owned child slots.
#[derive(Debug)]
pub struct OctreeNode {
  id: NodeId,
  bottom_left: IVec3,
  mip_level: u32,
  mesh: ChunkMesh,
  children: [Option<Box<OctreeNode>>; 8],
  voxels: Option<Box<VoxelBlock>>,
}

impl OctreeNode {
  /// Create an empty node.
  pub(crate) fn new(id: NodeId, bottom_left: IVec3, mip_level: u32) -> Self {
    Self {
      id,
      bottom_left,
      mip_level,
      mesh: ChunkMesh::default(),
      children: Default::default(),
      voxels: None,
    }
  }

  /// Whether this is a mip 0 leaf.
  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.mip_level == 0
  }

  /// Child in `octant`, if created.
  #[inline]
  pub fn child_node(&self, octant: u8) -> Option<&OctreeNode> {
    self.children[octant as usize].as_deref()
  }

  /// Mutable child in `octant`, if created.
  #[inline]
  pub fn child_node_mut(&mut self, octant: u8) -> Option<&mut OctreeNode> {
    self.children[octant as usize].as_deref_mut()
  }

  /// Created children with their octants.
  pub fn children(&self) -> impl Iterator<Item = (u8, &OctreeNode)> {
    self
      .children
      .iter()
      .enumerate()
      .filter_map(|(octant, child)| child.as_deref().map(|c| (octant as u8, c)))
  }

  /// Child in `octant`, created if missing. `created` counts new nodes.
  pub(crate) fn child_or_insert(&mut self, octant: u8, created: &mut usize) -> &mut OctreeNode {
    debug_assert!(self.mip_level > 0, "leaves have no children");
    let child_mip = self.mip_level - 1;
    let child_size = size_for_mip_level(child_mip);
    let bottom_left = child_bottom_left(self.bottom_left, child_size, octant);
    let id = self.id.child(octant);
    self.children[octant as usize].get_or_insert_with(|| {
      *created += 1;
      Box::new(OctreeNode::new(id, bottom_left, child_mip))
    })
  }

  /// Whether `point` lies inside this node.
  #[inline]
  pub fn contains(&self, point: IVec3) -> bool {
    is_point_in_cube(point, self.bottom_left, self.size_in_voxels())
  }

  /// Block index of `point` inside this leaf.
  #[inline]
  pub fn local_block_index(&self, point: IVec3) -> usize {
    debug_assert!(self.contains(point), "{point} is outside leaf at {}", self.bottom_left);
    let local = point - self.bottom_left;
    block_index(local.x as usize, local.y as usize, local.z as usize)
  }

  /// Flag the mesh stale.
  #[inline]
  pub fn mark_dirty(&mut self) {
    self.mesh.needs_regenerating = true;
  }

  #[inline]
  pub(crate) fn block_mut(&mut self) -> Option<&mut VoxelBlock> {
    self.voxels.as_deref_mut()
  }

  /// Allocate this leaf's block if missing. Returns whether it allocated.
  pub(crate) fn ensure_block(&mut self, allocator: &dyn BlockAllocator, fill: i8) -> bool {
    debug_assert!(self.is_leaf(), "only leaves carry voxel blocks");
    if self.voxels.is_some() {
      return false;
    }
    self.voxels = Some(allocator.allocate(fill));
    true
  }

  /// Tear down every descendant and block, returning blocks to `allocator`.
  /// Returns `(nodes_removed, blocks_freed)`, not counting `self` as a node.
  pub(crate) fn release_subtree(&mut self, allocator: &dyn BlockAllocator) -> (usize, usize) {
    let mut nodes = 0;
    let mut blocks = 0;
    if let Some(block) = self.voxels.take() {
      allocator.free(block);
      blocks += 1;
    }
    for slot in self.children.iter_mut() {
      if let Some(mut child) = slot.take() {
        let (n, b) = child.release_subtree(allocator);
        nodes += n + 1;
        blocks += b;
      }
    }
    (nodes, blocks)
  }
}

impl TerrainNode for OctreeNode {
  fn id(&self) -> NodeId {
    self.id
  }

  fn child(&self, octant: u8) -> Option<&dyn TerrainNode> {
    self.child_node(octant).map(|c| c as &dyn TerrainNode)
  }

  fn bottom_left(&self) -> IVec3 {
    self.bottom_left
  }

  fn size_in_voxels(&self) -> u32 {
    size_for_mip_level(self.mip_level)
  }

  fn mip_level(&self) -> u32 {
    self.mip_level
  }

  fn mesh(&self) -> ChunkMesh {
    self.mesh
  }

  fn set_mesh(&mut self, mesh: ChunkMesh) {
    self.mesh = mesh;
  }

  fn voxel_data(&self) -> Option<&VoxelBlock> {
    self.voxels.as_deref()
  }

  fn set_voxel_data(&mut self, block: Option<Box<VoxelBlock>>) -> Option<Box<VoxelBlock>> {
    std::mem::replace(&mut self.voxels, block)
  }

  fn has_children(&self) -> bool {
    self.children.iter().any(Option::is_some)
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
