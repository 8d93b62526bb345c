//! Output of one polygonize job.

use glam::Vec3;

use crate::constants::{MAX_CELL_INDICES, MAX_CELL_VERTICES};
use crate::types::{ChunkKey, SampleBuffer};

/// Triangle mesh for one node plus the samples it was built from.
///
/// Positions are in world voxel units. Ownership passes to whoever waits on
/// the job; dropping it releases everything at once.
#[derive(Clone, Debug)]
pub struct PolygonizeResult {
  /// Node the job was dispatched for.
  pub chunk: ChunkKey,
  pub positions: Vec<Vec3>,
  /// Unit normals pointing toward positive density.
  pub normals: Vec<Vec3>,
  /// Three per triangle, counter-clockwise seen from outside.
  pub indices: Vec<u32>,
  /// Gutter-inclusive samples the mesh was extracted from.
  pub voxels: Box<SampleBuffer>,
}

impl PolygonizeResult {
  /// Empty result with buffers reserved for a typical block.
  pub fn with_capacity(chunk: ChunkKey, voxels: Box<SampleBuffer>) -> Self {
    Self {
      chunk,
      positions: Vec::with_capacity(MAX_CELL_VERTICES),
      normals: Vec::with_capacity(MAX_CELL_VERTICES),
      indices: Vec::with_capacity(MAX_CELL_INDICES),
      voxels,
    }
  }

  #[inline]
  pub fn outputted_vertices(&self) -> usize {
    self.positions.len()
  }

  #[inline]
  pub fn outputted_indices(&self) -> usize {
    self.indices.len()
  }

  #[inline]
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// True when no surface crossed the block.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.indices.is_empty()
  }
}
