//! Core data types shared across the octree, polygonizer and pipeline.

use glam::IVec3;

use crate::constants::{BLOCK_VOLUME, SAMPLE_VOLUME};
use crate::octree::NodeId;

/// Signed density sample.
/// Negative = inside/solid, Positive = outside/air.
pub type Voxel = i8;

/// Dense 16³ block owned by a mip 0 node, indexed with
/// [`block_index`](crate::constants::block_index).
pub type VoxelBlock = [Voxel; BLOCK_VOLUME];

/// 19³ lattice of samples covering a node plus its gutters, indexed with
/// [`sample_index`](crate::constants::sample_index).
pub type SampleBuffer = [Voxel; SAMPLE_VOLUME];

/// 64 bit path code naming a leaf, 4 bits per level from the root down.
pub type OctreeIndex = u64;

/// Density conversion utilities for quantized storage.
///
/// Maps a float signed distance (in voxels) to `i8` over a configurable
/// `±range`, saturating at the clamp limits.
pub mod density {
  /// Convert a signed distance to a density within `[low, high]`.
  ///
  /// `range` is the distance that maps onto the full positive limit.
  #[inline(always)]
  pub fn to_storage(distance: f32, range: f32, low: i8, high: i8) -> i8 {
    let scaled = distance / range * high as f32;
    scaled.round().clamp(low as f32, high as f32) as i8
  }

  /// Convert a stored density back to a distance in voxels.
  #[inline(always)]
  pub fn to_distance(value: i8, range: f32, high: i8) -> f32 {
    value as f32 * range / high as f32
  }
}

/// Opaque handle issued by a [`MeshUploader`](crate::pipeline::MeshUploader)
/// for an uploaded mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Per-node mesh state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkMesh {
  /// Handle of the currently uploaded mesh, if any.
  pub handle: Option<MeshHandle>,
  /// Vertices in the uploaded mesh.
  pub vertex_count: u32,
  /// Indices in the uploaded mesh.
  pub index_count: u32,
  /// Set when voxel data below this node changed since the last upload.
  pub needs_regenerating: bool,
}

impl ChunkMesh {
  /// Mesh state after a successful upload.
  pub fn uploaded(handle: MeshHandle, vertex_count: u32, index_count: u32) -> Self {
    Self {
      handle: Some(handle),
      vertex_count,
      index_count,
      needs_regenerating: false,
    }
  }
}

/// Identity of the node a polygonize job was dispatched for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkKey {
  /// Stable path name of the node.
  pub id: NodeId,
  /// Bottom-left corner in voxel units.
  pub bottom_left: IVec3,
  /// Voxels per axis.
  pub size_in_voxels: u32,
  /// Mip level (0 = leaf).
  pub mip_level: u32,
}

impl ChunkKey {
  /// World units between adjacent lattice samples.
  #[inline]
  pub fn sample_stride(&self) -> u32 {
    self.size_in_voxels / crate::constants::BASE_CELL_SIZE as u32
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
