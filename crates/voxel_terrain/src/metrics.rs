//! Frame and mesh statistics for the terrain pipeline.
//!
//! Feature-gated and runtime-toggled; every `record_*` call is a no-op
//! unless the `metrics` feature is on and [`COLLECT_METRICS`] is set.
//!
//! # Usage
//!
//! ```ignore
//! use voxel_terrain::metrics::{TerrainMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let frame = tree.get_chunks_to_render(&camera, &lod, &polygonizer, &mut store);
//! metrics.record_frame(&frame, tree.tree_depth());
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::constants::MAX_TREE_DEPTH;
use crate::pipeline::{FrameStats, RenderFrame};


/// Buckets per mip-indexed counter.
pub const MIP_BUCKETS: usize = MAX_TREE_DEPTH as usize;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Whether metrics are collected (compile-time feature and runtime toggle).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Fixed-capacity history, oldest evicted first.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a value, evicting the oldest at capacity.
    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    /// Most recent value.
    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl<T: Copy + Default + std::ops::Add<Output = T>> RollingWindow<T> {
    pub fn sum(&self) -> T {
        self.buffer.iter().copied().fold(T::default(), |acc, x| acc + x)
    }
}

impl RollingWindow<u64> {
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.sum() as f64 / self.buffer.len() as f64
        }
    }

    pub fn min_max(&self) -> Option<(u64, u64)> {
        let min = self.buffer.iter().min()?;
        let max = self.buffer.iter().max()?;
        Some((*min, *max))
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(128) // ~2 seconds at 60fps
    }
}

/// Pipeline statistics accumulated across frames.
#[derive(Debug, Clone)]
pub struct TerrainMetrics {
    // Last render set
    /// Rendered nodes per mip level in the last recorded frame.
    pub rendered_per_mip: [u32; MIP_BUCKETS],
    /// Size of the last render set.
    pub rendered_nodes: u32,

    // Live meshes
    /// Uploaded meshes still alive, per mip level.
    pub meshes_per_mip: [u32; MIP_BUCKETS],
    pub vertices_per_mip: [u64; MIP_BUCKETS],
    pub indices_per_mip: [u64; MIP_BUCKETS],

    // Timing
    /// LOD selection plus dispatch, microseconds.
    pub select_timings: RollingWindow<u64>,
    /// Barrier wait plus upload, microseconds.
    pub polygonize_timings: RollingWindow<u64>,
    pub last_frame: FrameStats,

    // Cumulative
    pub frames: u64,
    pub total_dispatched: u64,
    pub total_uploaded: u64,
    pub total_failed: u64,
}

impl Default for TerrainMetrics {
    fn default() -> Self {
        Self {
            rendered_per_mip: [0; MIP_BUCKETS],
            rendered_nodes: 0,
            meshes_per_mip: [0; MIP_BUCKETS],
            vertices_per_mip: [0; MIP_BUCKETS],
            indices_per_mip: [0; MIP_BUCKETS],
            select_timings: RollingWindow::default(),
            polygonize_timings: RollingWindow::default(),
            last_frame: FrameStats::default(),
            frames: 0,
            total_dispatched: 0,
            total_uploaded: 0,
            total_failed: 0,
        }
    }
}

#[inline]
fn bucket(mip: u32) -> usize {
    (mip as usize).min(MIP_BUCKETS - 1)
}

impl TerrainMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything except the cumulative counters.
    pub fn reset(&mut self) {
        self.rendered_per_mip.fill(0);
        self.rendered_nodes = 0;
        self.meshes_per_mip.fill(0);
        self.vertices_per_mip.fill(0);
        self.indices_per_mip.fill(0);
        self.select_timings.clear();
        self.polygonize_timings.clear();
        self.last_frame = FrameStats::default();
    }

    /// Record one frame of a tree `tree_depth` levels deep.
    ///
    /// Live mesh totals follow the frame's uploads: each replaced mesh is
    /// removed and each new one added.
    pub fn record_frame(&mut self, frame: &RenderFrame, tree_depth: u32) {
        if !is_enabled() {
            return;
        }

        self.rendered_per_mip.fill(0);
        for id in &frame.nodes {
            self.rendered_per_mip[bucket(id.mip_level(tree_depth))] += 1;
        }
        self.rendered_nodes = frame.nodes.len() as u32;

        for upload in &frame.uploads {
            if let Some(old) = upload.replaced {
                self.remove_mesh(upload.mip_level, old.vertex_count, old.index_count);
            }
            let mesh = upload.mesh;
            self.record_mesh(upload.mip_level, mesh.vertex_count, mesh.index_count);
        }

        let stats = frame.stats;
        self.select_timings.push(stats.select_us);
        self.polygonize_timings.push(stats.polygonize_us);
        self.last_frame = stats;

        self.frames += 1;
        self.total_dispatched += stats.dispatched as u64;
        self.total_uploaded += stats.uploaded as u64;
        self.total_failed += stats.failed as u64;
    }

    /// A mesh of `mip` became live. [`Self::record_frame`] calls this for
    /// every upload; call it directly only for meshes installed elsewhere.
    pub fn record_mesh(&mut self, mip: u32, vertex_count: u32, index_count: u32) {
        if !is_enabled() {
            return;
        }
        let b = bucket(mip);
        self.meshes_per_mip[b] += 1;
        self.vertices_per_mip[b] += vertex_count as u64;
        self.indices_per_mip[b] += index_count as u64;
    }

    /// A live mesh of `mip` was replaced or dropped. Replacements are
    /// handled by [`Self::record_frame`]; call this when a renderer drops a
    /// mesh on its own.
    pub fn remove_mesh(&mut self, mip: u32, vertex_count: u32, index_count: u32) {
        if !is_enabled() {
            return;
        }
        let b = bucket(mip);
        self.meshes_per_mip[b] = self.meshes_per_mip[b].saturating_sub(1);
        self.vertices_per_mip[b] = self.vertices_per_mip[b].saturating_sub(vertex_count as u64);
        self.indices_per_mip[b] = self.indices_per_mip[b].saturating_sub(index_count as u64);
    }

    pub fn total_meshes(&self) -> u32 {
        self.meshes_per_mip.iter().sum()
    }

    pub fn total_vertices(&self) -> u64 {
        self.vertices_per_mip.iter().sum()
    }

    pub fn total_indices(&self) -> u64 {
        self.indices_per_mip.iter().sum()
    }

    pub fn total_triangles(&self) -> u64 {
        self.total_indices() / 3
    }

    pub fn avg_select_us(&self) -> f64 {
        self.select_timings.average()
    }

    pub fn avg_polygonize_us(&self) -> f64 {
        self.polygonize_timings.average()
    }

    /// Approximate mesh memory: two `Vec3` per vertex, one `u32` per index.
    pub fn mesh_memory_bytes(&self) -> u64 {
        self.total_vertices() * 24 + self.total_indices() * 4
    }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use super::*;
    use crate::octree::NodeId;
    use crate::pipeline::MeshUpload;
    use crate::types::{ChunkMesh, MeshHandle};

    #[test]
    fn test_rolling_window() {
        let mut window = RollingWindow::new(3);
        assert!(window.is_empty());
        assert_eq!(window.min_max(), None);

        window.push(10u64);
        window.push(20);
        window.push(30);
        assert_eq!(window.len(), 3);
        assert_eq!(window.sum(), 60);
        assert_eq!(window.average(), 20.0);

        // Oldest evicted
        window.push(40);
        assert_eq!(window.len(), 3);
        assert_eq!(window.sum(), 90);
        assert_eq!(window.min_max(), Some((20, 40)));
        assert_eq!(window.last(), Some(&40));
    }

    #[test]
    fn test_zero_capacity_window_stays_empty() {
        let mut window = RollingWindow::new(0);
        window.push(5u64);
        assert!(window.is_empty());
    }

    #[test]
    fn test_record_frame() {
        let mut metrics = TerrainMetrics::new();
        let leaf = NodeId::ROOT.child(1).child(2);
        let frame = RenderFrame {
            nodes: vec![NodeId::ROOT.child(0), leaf, NodeId::ROOT.child(1).child(3)],
            uploads: Vec::new(),
            stats: FrameStats {
                rendered: 3,
                dispatched: 2,
                uploaded: 1,
                failed: 1,
                select_us: 100,
                polygonize_us: 300,
                ..FrameStats::default()
            },
        };

        metrics.record_frame(&frame, 2);
        metrics.record_frame(&frame, 2);

        assert_eq!(metrics.rendered_per_mip[0], 2);
        assert_eq!(metrics.rendered_per_mip[1], 1);
        assert_eq!(metrics.rendered_nodes, 3);
        assert_eq!(metrics.frames, 2);
        assert_eq!(metrics.total_dispatched, 4);
        assert_eq!(metrics.total_failed, 2);
        assert_eq!(metrics.avg_polygonize_us(), 300.0);
        assert_eq!(metrics.last_frame.uploaded, 1);
    }

    #[test]
    fn test_record_frame_tracks_live_meshes() {
        let mut metrics = TerrainMetrics::new();
        let leaf = NodeId::ROOT.child(1).child(2);
        let first = RenderFrame {
            nodes: vec![leaf],
            uploads: vec![MeshUpload {
                id: leaf,
                mip_level: 0,
                mesh: ChunkMesh::uploaded(MeshHandle(1), 100, 300),
                replaced: None,
            }],
            stats: FrameStats::default(),
        };
        metrics.record_frame(&first, 2);
        assert_eq!(metrics.meshes_per_mip[0], 1);
        assert_eq!(metrics.total_vertices(), 100);

        let second = RenderFrame {
            uploads: vec![MeshUpload {
                id: leaf,
                mip_level: 0,
                mesh: ChunkMesh::uploaded(MeshHandle(2), 40, 60),
                replaced: Some(ChunkMesh::uploaded(MeshHandle(1), 100, 300)),
            }],
            ..first.clone()
        };
        metrics.record_frame(&second, 2);
        assert_eq!(metrics.total_meshes(), 1);
        assert_eq!(metrics.total_vertices(), 40);
        assert_eq!(metrics.total_indices(), 60);
    }

    #[test]
    fn test_mesh_totals() {
        let mut metrics = TerrainMetrics::new();
        metrics.record_mesh(0, 1000, 3000);
        metrics.record_mesh(1, 500, 1500);
        metrics.record_mesh(0, 800, 2400);

        assert_eq!(metrics.meshes_per_mip[0], 2);
        assert_eq!(metrics.total_meshes(), 3);
        assert_eq!(metrics.total_vertices(), 2300);
        assert_eq!(metrics.total_triangles(), 2300);

        metrics.remove_mesh(0, 1000, 3000);
        assert_eq!(metrics.meshes_per_mip[0], 1);
        assert_eq!(metrics.total_indices(), 3900);

        metrics.reset();
        assert_eq!(metrics.total_meshes(), 0);
        assert_eq!(metrics.frames, 0);
    }
}
