//! Per-frame coordinator: select, polygonize, wait, upload.
//!
//! ```text
//! ┌──────────────┐   dirty    ┌─────────────┐  JobHandle  ┌────────────┐
//! │ LOD selection├───────────►│ polygonizer ├────────────►│  barrier   │
//! │ (frustum +   │  callback  │ (sample now,│             │ wait() all │
//! │  area)       │            │  mesh async)│             └─────┬──────┘
//! └──────┬───────┘            └─────────────┘                   │
//!        │ render set                                           ▼
//!        │                                  ┌───────────────────────────────┐
//!        └─────────────────────────────────►│ upload, store handle on node, │
//!                                           │ clear dirty flag, drop result │
//!                                           └───────────────────────────────┘
//! ```
//!
//! The frame returns only after every job it dispatched resolved, so frame
//! latency is bounded by the slowest job of that frame.

use std::collections::HashMap;

use glam::Vec3;
use web_time::Instant;

use crate::lod::{select_chunks_to_render, CameraSnapshot, Frustum, LodConfig};
use crate::octree::{NodeId, SparseVoxelOctree, TerrainNode};
use crate::polygonizer::{PolygonizeResult, Polygonizer};
use crate::threading::JobHandle;
use crate::types::{ChunkMesh, MeshHandle};

/// Receives finished meshes (GPU upload in a renderer).
pub trait MeshUploader {
  /// Take the mesh data and return a handle naming it.
  fn upload(&mut self, result: &PolygonizeResult) -> MeshHandle;

  /// A node's previous mesh was replaced by a newer upload.
  fn release(&mut self, _handle: MeshHandle) {}
}

/// Mesh buffers as uploaded.
#[derive(Clone, Debug, Default)]
pub struct StoredMesh {
  pub handle: MeshHandle,
  pub mip_level: u32,
  pub positions: Vec<Vec3>,
  pub normals: Vec<Vec3>,
  pub indices: Vec<u32>,
}

/// Headless uploader keeping the latest mesh per node in memory.
#[derive(Debug, Default)]
pub struct InMemoryMeshStore {
  meshes: HashMap<NodeId, StoredMesh>,
  owners: HashMap<MeshHandle, NodeId>,
  next_handle: u64,
  uploads: u64,
  releases: u64,
}

impl InMemoryMeshStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Latest mesh uploaded for `id`.
  pub fn get(&self, id: NodeId) -> Option<&StoredMesh> {
    self.meshes.get(&id)
  }

  /// Node owning `handle`, if it is still live.
  pub fn owner(&self, handle: MeshHandle) -> Option<NodeId> {
    self.owners.get(&handle).copied()
  }

  pub fn len(&self) -> usize {
    self.meshes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.meshes.is_empty()
  }

  /// Uploads since creation.
  pub fn upload_count(&self) -> u64 {
    self.uploads
  }

  /// Releases since creation.
  pub fn release_count(&self) -> u64 {
    self.releases
  }
}

impl MeshUploader for InMemoryMeshStore {
  fn upload(&mut self, result: &PolygonizeResult) -> MeshHandle {
    self.next_handle += 1;
    self.uploads += 1;
    let handle = MeshHandle(self.next_handle);
    let id = result.chunk.id;

    self.owners.insert(handle, id);
    self.meshes.insert(
      id,
      StoredMesh {
        handle,
        mip_level: result.chunk.mip_level,
        positions: result.positions.clone(),
        normals: result.normals.clone(),
        indices: result.indices.clone(),
      },
    );
    handle
  }

  fn release(&mut self, handle: MeshHandle) {
    self.releases += 1;
    self.owners.remove(&handle);
  }
}

/// Counters and timings for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
  /// Nodes in the render set.
  pub rendered: usize,
  /// Polygonize jobs started.
  pub dispatched: usize,
  /// Results uploaded (and dirty flags cleared).
  pub uploaded: usize,
  /// Jobs that resolved without a result. Their nodes stay dirty.
  pub failed: usize,
  /// Vertices across uploaded results.
  pub vertices: u64,
  /// Indices across uploaded results.
  pub indices: u64,
  /// LOD selection plus dispatch, microseconds.
  pub select_us: u64,
  /// Waiting on jobs plus upload, microseconds.
  pub polygonize_us: u64,
}

/// One mesh installed on a node during a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshUpload {
  pub id: NodeId,
  pub mip_level: u32,
  /// Mesh state now on the node.
  pub mesh: ChunkMesh,
  /// Uploaded mesh it replaced, if the node had one.
  pub replaced: Option<ChunkMesh>,
}

/// What to draw this frame.
#[derive(Clone, Debug, Default)]
pub struct RenderFrame {
  /// Render set in traversal order.
  pub nodes: Vec<NodeId>,
  /// Meshes installed this frame, in upload order.
  pub uploads: Vec<MeshUpload>,
  pub stats: FrameStats,
}

impl SparseVoxelOctree {
  /// Select the render set for `camera`, regenerate every stale node in it
  /// and block until all of them are uploaded.
  ///
  /// Each dispatched node receives its new [`MeshHandle`] and counts and has
  /// its dirty flag cleared. A failed job leaves its node dirty so the next
  /// frame retries it.
  #[tracing::instrument(skip_all, name = "octree::get_chunks_to_render")]
  pub fn get_chunks_to_render(
    &mut self,
    camera: &CameraSnapshot,
    lod: &LodConfig,
    polygonizer: &dyn Polygonizer,
    uploader: &mut dyn MeshUploader,
  ) -> RenderFrame {
    let mut stats = FrameStats::default();
    let frustum = Frustum::from_camera(camera);
    let view_projection = camera.view_projection();

    let select_start = Instant::now();
    let mut jobs: Vec<(NodeId, JobHandle<PolygonizeResult>)> = Vec::new();
    let nodes = {
      let _span = tracing::info_span!("select_and_dispatch").entered();
      let source: &SparseVoxelOctree = self;
      select_chunks_to_render(
        &frustum,
        &view_projection,
        source.root_node(),
        lod,
        &mut |node: &dyn TerrainNode| {
          jobs.push((node.id(), polygonizer.polygonize_node_async(node, source)));
        },
      )
    };
    stats.rendered = nodes.len();
    stats.dispatched = jobs.len();
    stats.select_us = select_start.elapsed().as_micros() as u64;

    let wait_start = Instant::now();
    let mut uploads = Vec::with_capacity(jobs.len());
    {
      let _span = tracing::info_span!("await_and_upload", jobs = jobs.len()).entered();
      for (id, job) in jobs {
        let result = match job.wait() {
          Ok(result) => result,
          Err(err) => {
            stats.failed += 1;
            tracing::warn!(node = ?id, %err, "polygonize job failed, node stays dirty");
            continue;
          }
        };

        let handle = uploader.upload(&result);
        let vertex_count = result.outputted_vertices() as u32;
        let index_count = result.outputted_indices() as u32;
        stats.uploaded += 1;
        stats.vertices += vertex_count as u64;
        stats.indices += index_count as u64;

        if let Some(node) = self.find_node_mut(id) {
          let previous = node.mesh();
          let mesh = ChunkMesh::uploaded(handle, vertex_count, index_count);
          node.set_mesh(mesh);
          if let Some(previous_handle) = previous.handle {
            uploader.release(previous_handle);
          }
          uploads.push(MeshUpload {
            id,
            mip_level: node.mip_level(),
            mesh,
            replaced: previous.handle.map(|_| previous),
          });
        }
      }
    }
    stats.polygonize_us = wait_start.elapsed().as_micros() as u64;

    tracing::debug!(
      rendered = stats.rendered,
      dispatched = stats.dispatched,
      uploaded = stats.uploaded,
      failed = stats.failed,
      select_us = stats.select_us,
      polygonize_us = stats.polygonize_us,
      "frame complete"
    );

    RenderFrame {
      nodes,
      uploads,
      stats,
    }
  }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
