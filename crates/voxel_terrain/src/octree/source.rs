//! Sample source capability: everything polygonizers, populators and the
//! serializer need from voxel storage.

use glam::IVec3;

use super::{NodeId, TerrainNode};
use crate::types::{OctreeIndex, SampleBuffer, Voxel, VoxelBlock};

/// Voxel storage addressed by world coordinates and octree indices.
///
/// Reads take `&self` and may run concurrently; writes take `&mut self` so at
/// most one writer exists at a time.
pub trait VoxelDataSource {
  /// Voxels per axis covered by the root.
  fn size(&self) -> u32;

  /// Accepted write range as `(low, high)`.
  fn clamp_range(&self) -> (Voxel, Voxel);

  /// Value read from unwritten space.
  fn default_value(&self) -> Voxel;

  /// Sample at `position`, or the default value outside written space.
  fn get_voxel_at(&self, position: IVec3) -> Voxel;

  /// Store `value` at `position`. Returns the leaf's index, or
  /// [`INVALID_OCTREE_INDEX`](crate::constants::INVALID_OCTREE_INDEX) when
  /// the write was rejected.
  fn set_voxel_at(&mut self, position: IVec3, value: Voxel) -> OctreeIndex;

  /// Fill `out` with the node's 19³ sample lattice.
  fn voxels_for_node(&self, node: &dyn TerrainNode, out: &mut SampleBuffer);

  /// Leaf named by `index`, if it exists.
  fn find_node_from_index(&self, index: OctreeIndex) -> Option<&dyn TerrainNode>;

  /// Leaf named by `index`, optionally creating the path to it.
  fn find_node_from_index_mut(
    &mut self,
    index: OctreeIndex,
    create_if_missing: bool,
  ) -> Option<&mut dyn TerrainNode>;

  /// Dense block of the leaf named by `index`, if allocated.
  fn node_voxel_data(&self, index: OctreeIndex) -> Option<&VoxelBlock>;

  /// Dense block of an existing leaf, allocated (default filled) if absent.
  fn allocate_node_voxel_data(&mut self, index: OctreeIndex) -> Option<&mut VoxelBlock>;

  /// The root node.
  fn root(&self) -> &dyn TerrainNode;

  /// Create all children of the node `id` for `levels` levels down (stopping
  /// at leaves). Returns how many nodes were created.
  fn create_children_for_first_n_mip_levels(&mut self, id: NodeId, levels: u32) -> usize;
}
