//! Frustum culling and viewport-area LOD selection over the node tree.
//!
//! ```text
//!  for each existing child:
//!    sphere outside frustum ───────────────► skip subtree
//!    area < threshold && area > 0 ─────────► render
//!    mip 0 or no children ─────────────────► render
//!    otherwise ────────────────────────────► recurse
//! ```
//!
//! A non-positive or NaN area (corners behind the eye) recurses rather than
//! culls; the frustum test already removed what is fully behind. A node
//! holding the camera therefore always descends to its leaves.

use glam::{IVec3, Mat4, Vec3};

use super::Frustum;
use crate::octree::{NodeId, TerrainNode};

/// LOD selection settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodConfig {
  /// Nodes projecting to less than this NDC area (full screen = 4.0) are
  /// rendered without descending further.
  pub min_viewport_area: f32,
}

impl Default for LodConfig {
  fn default() -> Self {
    Self {
      min_viewport_area: 1.0,
    }
  }
}

impl LodConfig {
  pub fn with_min_viewport_area(mut self, min_viewport_area: f32) -> Self {
    self.min_viewport_area = min_viewport_area;
    self
  }
}

/// Bounding sphere of a cube: AABB center, radius to a corner.
#[inline]
pub fn bounding_sphere(bottom_left: IVec3, size: u32) -> (Vec3, f32) {
  let bl = bottom_left.as_vec3();
  let center = bl + Vec3::splat(size as f32 * 0.5);
  (center, (center - bl).length())
}

/// Area of the NDC bounding rectangle of a cube's eight projected corners.
///
/// NaN when a corner lies at or behind the eye plane, where the perspective
/// divide has no meaningful footprint. Selection recurses on NaN.
pub fn viewport_area_heuristic(view_projection: &Mat4, bottom_left: IVec3, size: u32) -> f32 {
  let bl = bottom_left.as_vec3();
  let size = size as f32;
  let mut min = glam::Vec2::splat(f32::INFINITY);
  let mut max = glam::Vec2::splat(f32::NEG_INFINITY);

  for corner in 0..8u32 {
    let offset = Vec3::new(
      (corner & 1) as f32,
      ((corner >> 1) & 1) as f32,
      ((corner >> 2) & 1) as f32,
    );
    let clip = *view_projection * (bl + offset * size).extend(1.0);
    if clip.w <= 0.0 {
      return f32::NAN;
    }
    let ndc = clip.truncate().truncate() / clip.w;
    min = min.min(ndc);
    max = max.max(ndc);
  }

  let extent = max - min;
  extent.x * extent.y
}

struct Selection<'a, 'f> {
  frustum: &'a Frustum,
  view_projection: &'a Mat4,
  threshold: f32,
  on_regenerate: &'a mut (dyn FnMut(&dyn TerrainNode) + 'f),
  out: Vec<NodeId>,
}

impl Selection<'_, '_> {
  fn consider(&mut self, node: &dyn TerrainNode) {
    let (center, radius) = bounding_sphere(node.bottom_left(), node.size_in_voxels());
    if !self.frustum.contains_sphere(center, radius) {
      return;
    }

    let area =
      viewport_area_heuristic(self.view_projection, node.bottom_left(), node.size_in_voxels());
    let small_enough = area < self.threshold && area > 0.0;
    if small_enough || node.mip_level() == 0 || !node.has_children() {
      self.out.push(node.id());
      if node.needs_regenerating() {
        (self.on_regenerate)(node);
      }
    } else {
      self.visit_children(node);
    }
  }

  fn visit_children(&mut self, node: &dyn TerrainNode) {
    for octant in 0..8 {
      if let Some(child) = node.child(octant) {
        self.consider(child);
      }
    }
  }
}

/// Pick the nodes to render this frame.
///
/// Starts with the children of `root` (or `root` itself when it is a leaf).
/// Each returned node appears once, and no returned node is an ancestor of
/// another. `on_regenerate` is called for every returned node whose mesh
/// is stale, in traversal order.
#[tracing::instrument(skip_all, name = "lod::select")]
pub fn select_chunks_to_render(
  frustum: &Frustum,
  view_projection: &Mat4,
  root: &dyn TerrainNode,
  config: &LodConfig,
  on_regenerate: &mut dyn FnMut(&dyn TerrainNode),
) -> Vec<NodeId> {
  let mut selection = Selection {
    frustum,
    view_projection,
    threshold: config.min_viewport_area,
    on_regenerate,
    out: Vec::new(),
  };

  if root.mip_level() == 0 {
    selection.consider(root);
  } else {
    selection.visit_children(root);
  }

  tracing::debug!(rendered = selection.out.len(), "lod selection complete");
  selection.out
}
