//! OctreeConfig - volume size and voxel clamp range of a sparse octree.

use thiserror::Error;

use crate::constants::{BASE_CELL_SIZE, MAX_TREE_DEPTH};
use crate::geometry::{is_power_of_two, mip_level_for_size};
use crate::types::Voxel;

/// Invalid octree construction parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OctreeError {
  /// Root size is not a power-of-two multiple of the leaf size.
  #[error("octree size {0} must be a power of two and at least {BASE_CELL_SIZE}")]
  InvalidSize(u32),
  /// Root size needs more levels than a path index can encode.
  #[error("octree size {size} needs {depth} levels, at most {MAX_TREE_DEPTH} are supported")]
  TooDeep { size: u32, depth: u32 },
  /// Clamp range is empty or the default value lies outside it.
  #[error("invalid clamp range [{low}, {high}] for default value {default}")]
  InvalidClampRange { low: Voxel, high: Voxel, default: Voxel },
}

/// Configuration for a sparse voxel octree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OctreeConfig {
  /// Voxels per axis covered by the root.
  pub size_in_voxels: u32,

  /// Largest value a write may store.
  pub clamp_high: Voxel,

  /// Smallest value a write may store.
  pub clamp_low: Voxel,

  /// Value read from unwritten space and used to fill new blocks.
  pub default_value: Voxel,
}

impl OctreeConfig {
  /// Config for a root of `size_in_voxels` with the default range.
  pub fn new(size_in_voxels: u32) -> Self {
    Self {
      size_in_voxels,
      ..Self::default()
    }
  }

  /// Set the clamp range. The default value follows `high`, as unwritten
  /// space reads as fully outside the surface.
  pub fn with_clamp_range(mut self, low: Voxel, high: Voxel) -> Self {
    self.clamp_low = low;
    self.clamp_high = high;
    self.default_value = high;
    self
  }

  /// Override the default value.
  pub fn with_default_value(mut self, default_value: Voxel) -> Self {
    self.default_value = default_value;
    self
  }

  /// Set the root size.
  pub fn with_size(mut self, size_in_voxels: u32) -> Self {
    self.size_in_voxels = size_in_voxels;
    self
  }

  /// Levels below the root (the root's mip level).
  #[inline]
  pub fn tree_depth(&self) -> u32 {
    mip_level_for_size(self.size_in_voxels)
  }

  /// Whether `value` may be written.
  #[inline]
  pub fn accepts(&self, value: Voxel) -> bool {
    value >= self.clamp_low && value <= self.clamp_high
  }

  /// Check construction parameters.
  pub fn validate(&self) -> Result<(), OctreeError> {
    let size = self.size_in_voxels;
    if !is_power_of_two(size) || size < BASE_CELL_SIZE as u32 {
      return Err(OctreeError::InvalidSize(size));
    }
    let depth = self.tree_depth();
    if depth > MAX_TREE_DEPTH {
      return Err(OctreeError::TooDeep { size, depth });
    }
    if self.clamp_low > self.clamp_high || !self.accepts(self.default_value) {
      return Err(OctreeError::InvalidClampRange {
        low: self.clamp_low,
        high: self.clamp_high,
        default: self.default_value,
      });
    }
    Ok(())
  }
}

impl Default for OctreeConfig {
  fn default() -> Self {
    Self {
      size_in_voxels: 2048,
      clamp_high: 127,
      clamp_low: -127,
      default_value: 127,
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
