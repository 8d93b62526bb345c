//! Fixed-point helpers for vertex interpolation.
//!
//! Positions and normals are carried in Q8.8 (`256 == 1.0`) until the whole
//! block is extracted, then converted to `f32` once.
//!
//! ```text
//!   d0 (corner 0)          d1 (corner 1)
//!      ●───────────×────────────●
//!      P0          ▲            P1
//!                  │
//!        t = (d1 << 8) / (d1 - d0)
//!        pos = t·P0 + (256 - t)·P1        (Q8.8)
//! ```

use glam::IVec3;

/// `1.0` in Q8.8.
pub const Q8_ONE: i32 = 1 << 8;

/// `1.0` in Q16.16.
pub const Q16_ONE: u32 = 1 << 16;

const RSQRT_ITERATIONS: u32 = 5;

/// Weight of corner 0 along an edge, in `0..=256`.
///
/// The corners must straddle the surface (`d0 < 0 <= d1` or the reverse),
/// which keeps the divisor non-zero.
#[inline(always)]
pub fn interpolation_t(d0: i32, d1: i32) -> i32 {
  debug_assert!(d1 != d0, "edge endpoints must differ");
  (d1 << 8) / (d1 - d0)
}

/// `t·a + (256 - t)·b`, the Q8.8 blend of two integer values.
#[inline(always)]
pub fn lerp_q8(t: i32, a: i32, b: i32) -> i32 {
  t * a + (Q8_ONE - t) * b
}

/// Component-wise [`lerp_q8`].
#[inline(always)]
pub fn lerp_q8_ivec3(t: i32, a: IVec3, b: IVec3) -> IVec3 {
  a * t + b * (Q8_ONE - t)
}

/// Blend two Q8.8 vectors, keeping the result in Q8.8.
#[inline(always)]
pub fn blend_q8_ivec3(t: i32, a: IVec3, b: IVec3) -> IVec3 {
  lerp_q8_ivec3(t, a, b) >> 8
}

/// Reciprocal square root of an integer, in Q16.16.
///
/// Newton-Raphson on `y' = y·(3 - x·y²) / 2`, seeded with a power of two
/// within a factor of √2 of the answer. Returns 0 for `x == 0`.
pub fn rsqrt_q16(x: u32) -> u32 {
  if x == 0 {
    return 0;
  }

  let log2 = 31 - x.leading_zeros();
  let mut y = (Q16_ONE >> ((log2 + 1) / 2)) as u64;
  let x = x as u64;
  let three = 3u64 << 32;

  for _ in 0..RSQRT_ITERATIONS {
    // x·y² is Q32; the product with y is Q48, shifted back to Q16 and halved.
    let xyy = x * y * y;
    y = (y * three.saturating_sub(xyy)) >> 33;
  }

  y as u32
}

/// Scale an integer vector to unit length in Q8.8.
///
/// The zero vector stays zero.
pub fn normalize_q8(v: IVec3) -> IVec3 {
  let length_squared = v.x * v.x + v.y * v.y + v.z * v.z;
  if length_squared == 0 {
    return IVec3::ZERO;
  }
  let inv = rsqrt_q16(length_squared as u32) as i32;
  (v * inv) >> 8
}

#[cfg(test)]
#[path = "fixed_test.rs"]
mod fixed_test;
