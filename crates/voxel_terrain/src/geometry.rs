//! Pure spatial helpers shared by the octree, LOD selection and polygonizer.
//!
//! Mip 0 is the finest level. A node at mip `m` spans `16 * 2^m` voxels per
//! axis:
//!
//! ```text
//! size_for_mip_level(m) = BASE_CELL_SIZE << m
//! mip_level_for_size(s) = log2(s / BASE_CELL_SIZE)
//! ```

use glam::IVec3;

use crate::constants::BASE_CELL_SIZE;

/// True when `value` is a non-zero power of two.
#[inline]
pub const fn is_power_of_two(value: u32) -> bool {
  value != 0 && (value & (value - 1)) == 0
}

/// Mip level of a node spanning `size_in_voxels` per axis.
///
/// `size_in_voxels` must be a power-of-two multiple of 16.
#[inline]
pub fn mip_level_for_size(size_in_voxels: u32) -> u32 {
  debug_assert!(is_power_of_two(size_in_voxels) && size_in_voxels >= BASE_CELL_SIZE as u32);
  (size_in_voxels / BASE_CELL_SIZE as u32).trailing_zeros()
}

/// Voxels per axis covered by a node at `mip_level`.
#[inline]
pub const fn size_for_mip_level(mip_level: u32) -> u32 {
  (BASE_CELL_SIZE as u32) << mip_level
}

/// Point-in-cube test, inclusive on the bottom-left faces and exclusive on the
/// far faces so that sibling cubes never both contain a point.
#[inline]
pub fn is_point_in_cube(point: IVec3, bottom_left: IVec3, size: u32) -> bool {
  let far = bottom_left + IVec3::splat(size as i32);
  point.cmpge(bottom_left).all() && point.cmplt(far).all()
}

/// Octant of a node (bottom-left corner, half size) that contains `point`.
///
/// Bit layout: bit 0 = +X half, bit 1 = +Y half, bit 2 = +Z half.
#[inline]
pub fn octant_containing_point(point: IVec3, bottom_left: IVec3, half_size: u32) -> u8 {
  let mid = bottom_left + IVec3::splat(half_size as i32);
  (point.x >= mid.x) as u8 | ((point.y >= mid.y) as u8) << 1 | ((point.z >= mid.z) as u8) << 2
}

/// Bottom-left corner of the child in `octant`.
#[inline]
pub fn child_bottom_left(parent_bottom_left: IVec3, child_size: u32, octant: u8) -> IVec3 {
  let offset = IVec3::new(
    (octant & 1) as i32,
    ((octant >> 1) & 1) as i32,
    ((octant >> 2) & 1) as i32,
  );
  parent_bottom_left + offset * child_size as i32
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;
