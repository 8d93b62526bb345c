//! View frustum for sphere culling.

use glam::{Mat4, Vec3, Vec4};

use super::CameraSnapshot;

/// Plane through `normal · p = distance`, normal pointing into the frustum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
  pub normal: Vec3,
  pub distance: f32,
}

impl Plane {
  /// Plane through `point` facing `normal` (normalized here).
  pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
    let normal = normal.normalize_or_zero();
    Self {
      normal,
      distance: normal.dot(point),
    }
  }

  /// Signed distance (positive = inside).
  #[inline]
  pub fn signed_distance(&self, point: Vec3) -> f32 {
    self.normal.dot(point) - self.distance
  }

  /// `a·x + b·y + c·z + w >= 0`, normalized.
  fn from_coefficients(plane: Vec4) -> Self {
    let normal = plane.truncate();
    let len = normal.length();
    Self {
      normal: normal / len,
      distance: -plane.w / len,
    }
  }
}

/// Six inward-facing planes: near, far, left, right, top, bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
  pub planes: [Plane; 6],
}

impl Frustum {
  /// Build the planes from the camera basis.
  ///
  /// ```text
  ///        far·forward ± right·half_h ± up·half_v
  ///             ╲          │          ╱
  ///              ╲         │         ╱
  ///               ╲  near plane     ╱
  ///                ╲───────┼───────╱
  ///                  ╲     │     ╱
  ///                        ● position
  /// ```
  pub fn from_camera(camera: &CameraSnapshot) -> Self {
    let forward = camera.forward;
    let up = camera.up;
    let right = camera.right();
    let half_v = camera.z_far * (camera.fov_y_radians * 0.5).tan();
    let half_h = half_v * camera.aspect_ratio;
    let far = camera.z_far * forward;
    let eye = camera.position;

    Self {
      planes: [
        Plane::from_point_normal(eye + camera.z_near * forward, forward),
        Plane::from_point_normal(eye + far, -forward),
        Plane::from_point_normal(eye, (far - right * half_h).cross(up)),
        Plane::from_point_normal(eye, up.cross(far + right * half_h)),
        Plane::from_point_normal(eye, (far + up * half_v).cross(right)),
        Plane::from_point_normal(eye, right.cross(far - up * half_v)),
      ],
    }
  }

  /// Extract the planes from a view-projection matrix (Gribb-Hartmann),
  /// OpenGL clip range.
  pub fn from_view_projection(view_projection: &Mat4) -> Self {
    let row0 = view_projection.row(0);
    let row1 = view_projection.row(1);
    let row2 = view_projection.row(2);
    let row3 = view_projection.row(3);

    Self {
      planes: [
        Plane::from_coefficients(row3 + row2),
        Plane::from_coefficients(row3 - row2),
        Plane::from_coefficients(row3 + row0),
        Plane::from_coefficients(row3 - row0),
        Plane::from_coefficients(row3 - row1),
        Plane::from_coefficients(row3 + row1),
      ],
    }
  }

  /// Sphere at least partly inside every plane.
  pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
    self
      .planes
      .iter()
      .all(|plane| plane.signed_distance(center) > -radius)
  }

  /// Point inside every plane.
  pub fn contains_point(&self, point: Vec3) -> bool {
    self.planes.iter().all(|plane| plane.signed_distance(point) >= 0.0)
  }

  /// Conservative box test: false only if the box is fully outside a plane.
  pub fn intersects_aabb(&self, min: Vec3, max: Vec3) -> bool {
    self.planes.iter().all(|plane| {
      let p = Vec3::select(plane.normal.cmpge(Vec3::ZERO), max, min);
      plane.signed_distance(p) >= 0.0
    })
  }
}
