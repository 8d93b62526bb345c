//! voxel_terrain - Sparse voxel terrain with LOD selection and Transvoxel meshing
//!
//! This crate stores a very large signed density field in a sparse octree of
//! 16³ leaf blocks, picks the nodes to draw each frame from a camera, and
//! extracts isosurface meshes for them on a worker pool.
//!
//! # Features
//!
//! - **Sparse Voxel Octree**: lazily created nodes and blocks, dirty
//!   propagation on every changing write, stable 64 bit leaf indices
//! - **LOD Selection**: bounding sphere frustum culling plus a projected
//!   viewport-area heuristic
//! - **Transvoxel-style Polygonizer**: regular-cell extraction in Q8.8 fixed
//!   point with a two slice vertex reuse deck
//! - **Frame Barrier**: one call selects, dispatches, waits and uploads
//! - **Leaf Export**: versioned little-endian leaf block files
//!
//! # Example
//!
//! ```ignore
//! use voxel_terrain::{
//!   CameraSnapshot, InMemoryMeshStore, LodConfig, OctreeConfig, SparseVoxelOctree,
//!   TransvoxelPolygonizer,
//! };
//!
//! let mut tree = SparseVoxelOctree::with_heap_allocator(OctreeConfig::new(2048))?;
//! tree.set_voxel_at(IVec3::new(10, 10, 10), -42);
//!
//! let camera = CameraSnapshot::look_at(Vec3::new(0.0, 200.0, 0.0), Vec3::splat(512.0), Vec3::Y);
//! let polygonizer = TransvoxelPolygonizer::default();
//! let mut store = InMemoryMeshStore::new();
//!
//! let frame = tree.get_chunks_to_render(&camera, &LodConfig::default(), &polygonizer, &mut store);
//! println!("{} nodes, {} uploads", frame.nodes.len(), frame.stats.uploaded);
//! ```

pub mod allocator;
pub mod constants;
pub mod geometry;
pub mod types;

// Re-export commonly used items
pub use allocator::{BlockAllocator, HeapBlockAllocator, TrackingBlockAllocator};
pub use constants::{block_index, sample_index, BASE_CELL_SIZE, INVALID_OCTREE_INDEX};
pub use types::{ChunkKey, ChunkMesh, MeshHandle, OctreeIndex, SampleBuffer, Voxel, VoxelBlock};

// Worker pool and job handles
pub mod threading;
pub use threading::{
  CancellationToken, GlobalRayonPool, JobError, JobHandle, RayonWorkerPool, SubmitExt, WorkerPool,
  WorkerPoolConfig,
};

// Sparse voxel storage
pub mod octree;
pub use octree::{
  NodeId, OctreeConfig, OctreeError, OctreeNode, SparseVoxelOctree, TerrainNode, VoxelDataSource,
};

// Frustum culling and LOD selection
pub mod lod;
pub use lod::{select_chunks_to_render, CameraSnapshot, Frustum, LodConfig};

// Isosurface extraction
pub mod polygonizer;
pub use polygonizer::{PolygonizeResult, Polygonizer, TransvoxelPolygonizer};

// Per-frame coordinator
pub mod pipeline;
pub use pipeline::{FrameStats, InMemoryMeshStore, MeshUpload, MeshUploader, RenderFrame};

// Leaf export and import
pub mod serialization;
pub use serialization::SerializationError;

// Procedural fill
pub mod populator;
pub use populator::{HeightGradientPopulator, PopulateReport, SpherePopulator, VoxelPopulator};

// Metrics (feature "metrics" plus runtime toggle)
pub mod metrics;
