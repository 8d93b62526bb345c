//! Camera snapshot handed to each LOD pass.

use glam::{Mat4, Vec3};

/// Immutable camera state for one frame.
///
/// `forward` and `up` are kept unit length and orthogonal by the
/// constructors; right-handed, `right = forward × up`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSnapshot {
  pub position: Vec3,
  pub forward: Vec3,
  pub up: Vec3,
  /// Vertical field of view.
  pub fov_y_radians: f32,
  /// Width / height.
  pub aspect_ratio: f32,
  pub z_near: f32,
  pub z_far: f32,
}

impl Default for CameraSnapshot {
  fn default() -> Self {
    Self {
      position: Vec3::ZERO,
      forward: Vec3::NEG_Z,
      up: Vec3::Y,
      fov_y_radians: 60f32.to_radians(),
      aspect_ratio: 16.0 / 9.0,
      z_near: 0.1,
      z_far: 10_000.0,
    }
  }
}

impl CameraSnapshot {
  /// Camera at `position` looking toward `target`.
  ///
  /// `up` only needs to be roughly up; it is re-orthogonalized. Falls back
  /// to `-Z` when `target == position`.
  pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
    let forward = (target - position).try_normalize().unwrap_or(Vec3::NEG_Z);
    let right = forward
      .cross(up)
      .try_normalize()
      .unwrap_or_else(|| forward.any_orthonormal_vector());
    Self {
      position,
      forward,
      up: right.cross(forward),
      ..Self::default()
    }
  }

  pub fn with_fov_y(mut self, fov_y_radians: f32) -> Self {
    self.fov_y_radians = fov_y_radians;
    self
  }

  pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
    self.aspect_ratio = aspect_ratio;
    self
  }

  pub fn with_clip_planes(mut self, z_near: f32, z_far: f32) -> Self {
    self.z_near = z_near;
    self.z_far = z_far;
    self
  }

  #[inline]
  pub fn right(&self) -> Vec3 {
    self.forward.cross(self.up).normalize()
  }

  /// World to view space.
  pub fn view_matrix(&self) -> Mat4 {
    Mat4::look_to_rh(self.position, self.forward, self.up)
  }

  /// View to clip space, OpenGL depth range.
  pub fn projection_matrix(&self) -> Mat4 {
    Mat4::perspective_rh_gl(self.fov_y_radians, self.aspect_ratio, self.z_near, self.z_far)
  }

  pub fn view_projection(&self) -> Mat4 {
    self.projection_matrix() * self.view_matrix()
  }
}
