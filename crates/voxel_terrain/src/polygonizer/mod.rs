//! Transvoxel-style isosurface extraction for octree nodes.
//!
//! A node is sampled synchronously into a private lattice copy, then the
//! copy is meshed on a worker thread. Jobs never touch octree memory.
//!
//! ```text
//!   voxels_for_node ──► Box<[i8; 19³]> ──► pool.submit ──► polygonize_samples
//!   (caller thread)                                         (worker thread)
//!                                                                │
//!                                     JobHandle<PolygonizeResult> ◄┘
//! ```
//!
//! # Module Structure
//!
//! - [`tables`]: case code -> class -> triangles, vertex reuse codes
//! - [`fixed`]: Q8.8 interpolation and fixed-point normalization
//! - [`extract`]: the per-node cell loop with the reuse deck
//! - [`result`]: `PolygonizeResult`
//!
//! Seams between neighbors of different size are not stitched.

pub mod extract;
pub mod fixed;
pub mod result;
pub mod tables;

use std::sync::Arc;

pub use extract::polygonize_samples;
pub use result::PolygonizeResult;

use crate::constants::SAMPLE_VOLUME;
use crate::octree::{TerrainNode, VoxelDataSource};
use crate::threading::{
  CancellationToken, GlobalRayonPool, JobHandle, PoolBuildError, RayonWorkerPool, SubmitExt,
  WorkerPool, WorkerPoolConfig,
};
use crate::types::SampleBuffer;

/// Turns one node's samples into a mesh.
pub trait Polygonizer: Send + Sync {
  /// Sample `node` now and mesh it on a worker, observing `token`.
  fn polygonize_node_with_token(
    &self,
    node: &dyn TerrainNode,
    source: &dyn VoxelDataSource,
    token: CancellationToken,
  ) -> JobHandle<PolygonizeResult>;

  /// Sample and mesh `node` on the calling thread.
  fn polygonize_cell_sync(
    &self,
    node: &dyn TerrainNode,
    source: &dyn VoxelDataSource,
  ) -> PolygonizeResult;

  /// Sample `node` now and mesh it on a worker.
  fn polygonize_node_async(
    &self,
    node: &dyn TerrainNode,
    source: &dyn VoxelDataSource,
  ) -> JobHandle<PolygonizeResult> {
    self.polygonize_node_with_token(node, source, CancellationToken::new())
  }
}

/// Copy a node's lattice out of `source`.
pub fn sample_node(node: &dyn TerrainNode, source: &dyn VoxelDataSource) -> Box<SampleBuffer> {
  let mut voxels = Box::new([0i8; SAMPLE_VOLUME]);
  source.voxels_for_node(node, &mut voxels);
  voxels
}

/// Regular-cell polygonizer dispatching onto an injected pool.
#[derive(Clone)]
pub struct TransvoxelPolygonizer {
  pool: Arc<dyn WorkerPool>,
}

impl TransvoxelPolygonizer {
  pub fn new(pool: Arc<dyn WorkerPool>) -> Self {
    Self { pool }
  }

  /// Polygonizer with its own dedicated pool.
  pub fn from_config(config: &WorkerPoolConfig) -> Result<Self, PoolBuildError> {
    Ok(Self::new(Arc::new(RayonWorkerPool::new(config)?)))
  }

  pub fn pool(&self) -> &Arc<dyn WorkerPool> {
    &self.pool
  }
}

impl Default for TransvoxelPolygonizer {
  fn default() -> Self {
    Self::new(Arc::new(GlobalRayonPool))
  }
}

impl std::fmt::Debug for TransvoxelPolygonizer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TransvoxelPolygonizer")
      .field("workers", &self.pool.worker_count())
      .finish()
  }
}

impl Polygonizer for TransvoxelPolygonizer {
  fn polygonize_node_with_token(
    &self,
    node: &dyn TerrainNode,
    source: &dyn VoxelDataSource,
    token: CancellationToken,
  ) -> JobHandle<PolygonizeResult> {
    let chunk = node.chunk_key();
    let voxels = sample_node(node, source);
    self.pool.submit(token, move || polygonize_samples(voxels, chunk))
  }

  fn polygonize_cell_sync(
    &self,
    node: &dyn TerrainNode,
    source: &dyn VoxelDataSource,
  ) -> PolygonizeResult {
    polygonize_samples(sample_node(node, source), node.chunk_key())
  }
}
