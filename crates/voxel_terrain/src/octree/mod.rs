//! Sparse voxel octree storing the density field.
//!
//! Only the paths that were written exist; everything else reads as the
//! configured default value.
//!
//! # Mip Convention
//!
//! Mip 0 = leaf (16³ dense block), higher mip = coarser.
//!
//! ```text
//! Node Size = BASE_CELL_SIZE * 2^mip
//!           = 16 * 2^mip voxels per axis
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: `OctreeConfig` - root size, clamp range, default value
//! - [`index`]: `NodeId` - path codes naming nodes without pointers
//! - [`node`]: `OctreeNode` and the `TerrainNode` capability
//! - [`source`]: `VoxelDataSource` - the sample source capability
//! - [`sparse`]: `SparseVoxelOctree` - storage, lookups and teardown

pub mod config;
pub mod index;
pub mod node;
pub mod source;
pub mod sparse;

// Re-exports
pub use config::{OctreeConfig, OctreeError};
pub use index::{is_valid_path, NodeId};
pub use node::{OctreeNode, TerrainNode};
pub use source::VoxelDataSource;
pub use sparse::SparseVoxelOctree;
