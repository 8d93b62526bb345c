//! Procedural writers that fill a sample source with simple shapes.
//!
//! These are deterministic and easy to verify, useful for tests, benches
//! and seeding a volume before export. Each pass reports which leaves it
//! touched so the caller can export exactly those.

use std::collections::HashSet;

use glam::{IVec3, Vec3};

use crate::constants::INVALID_OCTREE_INDEX;
use crate::octree::VoxelDataSource;
use crate::types::{density, OctreeIndex, Voxel};

/// Outcome of one populate pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulateReport {
  /// Leaves that received at least one write.
  pub touched: HashSet<OctreeIndex>,
  /// Accepted writes.
  pub written: usize,
  /// Writes the target refused.
  pub rejected: usize,
}

impl PopulateReport {
  /// Touched leaves in ascending index order.
  pub fn sorted_touched(&self) -> Vec<OctreeIndex> {
    let mut out: Vec<_> = self.touched.iter().copied().collect();
    out.sort_unstable();
    out
  }

  fn record(&mut self, index: OctreeIndex) {
    if index == INVALID_OCTREE_INDEX {
      self.rejected += 1;
    } else {
      self.written += 1;
      self.touched.insert(index);
    }
  }
}

/// Writes a density field into a sample source.
pub trait VoxelPopulator {
  fn populate(&self, target: &mut dyn VoxelDataSource) -> PopulateReport;
}

/// Store `value` unless it equals the default over space that already
/// reads as the default, which keeps untouched space unallocated.
fn write(target: &mut dyn VoxelDataSource, p: IVec3, value: Voxel, report: &mut PopulateReport) {
  let default = target.default_value();
  if value == default && target.get_voxel_at(p) == default {
    return;
  }
  report.record(target.set_voxel_at(p, value));
}

/// Ground surface varying along Y.
///
/// `value = (y - surface_height) / falloff * high`, clamped to the
/// target's range, for every `x`, `y` and `z < depth`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightGradientPopulator {
  pub surface_height: f32,
  /// Distance over which the density goes from zero to saturation.
  pub falloff: f32,
  /// Number of Z slices written, from 0.
  pub depth: u32,
}

impl Default for HeightGradientPopulator {
  fn default() -> Self {
    Self {
      surface_height: 8.0,
      falloff: 4.0,
      depth: 16,
    }
  }
}

impl HeightGradientPopulator {
  pub fn new(surface_height: f32) -> Self {
    Self {
      surface_height,
      ..Self::default()
    }
  }

  pub fn with_falloff(mut self, falloff: f32) -> Self {
    self.falloff = falloff;
    self
  }

  pub fn with_depth(mut self, depth: u32) -> Self {
    self.depth = depth;
    self
  }

  /// Density at height `y` for clamp range `(low, high)`.
  pub fn value_at(&self, y: i32, (low, high): (Voxel, Voxel)) -> Voxel {
    density::to_storage(y as f32 - self.surface_height, self.falloff, low, high)
  }
}

impl VoxelPopulator for HeightGradientPopulator {
  fn populate(&self, target: &mut dyn VoxelDataSource) -> PopulateReport {
    let _span = tracing::info_span!("populate_height_gradient", depth = self.depth).entered();
    let size = target.size() as i32;
    let range = target.clamp_range();
    let depth = (self.depth as i32).min(size);
    let mut report = PopulateReport::default();

    for z in 0..depth {
      for y in 0..size {
        let value = self.value_at(y, range);
        for x in 0..size {
          write(target, IVec3::new(x, y, z), value, &mut report);
        }
      }
    }

    tracing::debug!(
      written = report.written,
      leaves = report.touched.len(),
      "height gradient populated"
    );
    report
  }
}

/// Solid sphere: negative inside, positive outside.
///
/// Signed distance is divided by `radius` and scaled to the clamp range,
/// so the center saturates at the low limit. Only the sphere's bounding
/// box plus one voxel is written.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpherePopulator {
  pub center: Vec3,
  pub radius: f32,
}

impl Default for SpherePopulator {
  fn default() -> Self {
    Self {
      center: Vec3::splat(32.0),
      radius: 12.0,
    }
  }
}

impl SpherePopulator {
  pub fn new(center: Vec3, radius: f32) -> Self {
    Self { center, radius }
  }

  /// Density at `p` for clamp range `(low, high)`.
  pub fn value_at(&self, p: IVec3, (low, high): (Voxel, Voxel)) -> Voxel {
    let distance = (p.as_vec3() - self.center).length() - self.radius;
    density::to_storage(distance, self.radius.max(f32::EPSILON), low, high)
  }
}

impl VoxelPopulator for SpherePopulator {
  fn populate(&self, target: &mut dyn VoxelDataSource) -> PopulateReport {
    let _span = tracing::info_span!("populate_sphere", radius = self.radius).entered();
    let range = target.clamp_range();
    let size = target.size() as i32;
    let extent = Vec3::splat(self.radius + 1.0);
    let min = (self.center - extent).floor().as_ivec3().max(IVec3::ZERO);
    let max = (self.center + extent).ceil().as_ivec3().min(IVec3::splat(size - 1));
    let mut report = PopulateReport::default();

    for z in min.z..=max.z {
      for y in min.y..=max.y {
        for x in min.x..=max.x {
          let p = IVec3::new(x, y, z);
          write(target, p, self.value_at(p, range), &mut report);
        }
      }
    }

    tracing::debug!(
      written = report.written,
      leaves = report.touched.len(),
      "sphere populated"
    );
    report
  }
}

#[cfg(test)]
#[path = "populator_test.rs"]
mod populator_test;
