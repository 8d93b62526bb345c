//! Synchronous regular-cell extraction for one node.
//!
//! # Processing Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  INPUT  samples: [i8; 19³]  (node lattice, gutter -1..=17)      │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  PASS 1: for each of the 16³ cells (Z outer, Y, X inner)        │
//! │    8 corner signs -> case code; skip 0 and 255                  │
//! │    per table vertex: reuse from the deck or interpolate (Q8.8)  │
//! │    emit class triangles through the local->global index map     │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  PASS 2: Q8.8 -> f32, scale by size/16, offset by bottom-left   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Reuse Deck
//!
//! Each cell owns the three edges through its corner 7 (slots 1-3) and the
//! lattice point at corner 7 itself (slot 0). The deck keeps those indices
//! for the current and previous Z slice; a vertex on any other edge is
//! fetched from the neighbor at `-X`, `-Y`, `-Z` (or a combination) that
//! owns it. Neighbors outside the block do not exist, so boundary cells
//! interpolate their own copy.
//!
//! A vertex with `t == 0` or `t == 256` sits exactly on a lattice point and
//! goes through slot 0 of the cell owning that point, whichever edge it came
//! from. Slot 0 is cleared for every cell, uniform or not, because its owner
//! may emit nothing. Triangles collapsed by such a shared vertex are dropped.

use glam::{IVec3, Vec3};

use super::fixed::{blend_q8_ivec3, interpolation_t, lerp_q8_ivec3, normalize_q8};
use super::result::PolygonizeResult;
use super::tables::{
  vertex_corner0, vertex_corner1, vertex_reuse_direction, vertex_reuse_slot, OWNED_BY_CELL,
  REGULAR_CELL_CLASS, REGULAR_CELL_DATA, REGULAR_VERTEX_DATA,
};
use crate::constants::{sample_index, BASE_CELL_SIZE};
use crate::types::{ChunkKey, SampleBuffer};

const CELLS: usize = BASE_CELL_SIZE;
const DECK_SLOTS: usize = 4;
const CORNER_SLOT: usize = 0;
const NO_VERTEX: u32 = u32::MAX;

/// Owned vertex indices of two consecutive Z slices.
struct ReuseDeck {
  slots: Vec<[u32; DECK_SLOTS]>,
}

impl ReuseDeck {
  fn new() -> Self {
    Self {
      slots: vec![[NO_VERTEX; DECK_SLOTS]; 2 * CELLS * CELLS],
    }
  }

  #[inline(always)]
  fn cell(x: usize, y: usize, z: usize) -> usize {
    (z & 1) * CELLS * CELLS + y * CELLS + x
  }

  #[inline(always)]
  fn get(&self, x: usize, y: usize, z: usize, slot: usize) -> u32 {
    self.slots[Self::cell(x, y, z)][slot]
  }

  #[inline(always)]
  fn set(&mut self, x: usize, y: usize, z: usize, slot: usize, vertex: u32) {
    self.slots[Self::cell(x, y, z)][slot] = vertex;
  }
}

/// Corner offset within a cell for corner index `c` (binary ZYX).
#[inline(always)]
fn corner_offset(c: usize) -> IVec3 {
  IVec3::new((c & 1) as i32, ((c >> 1) & 1) as i32, ((c >> 2) & 1) as i32)
}

#[inline(always)]
fn sample_at(samples: &SampleBuffer, p: IVec3) -> i32 {
  samples[sample_index(p.x, p.y, p.z)] as i32
}

/// Interpolate a new vertex between lattice points `p0` and `p1`.
fn push_vertex(
  positions: &mut Vec<IVec3>,
  normals: &mut Vec<IVec3>,
  samples: &SampleBuffer,
  t: i32,
  p0: IVec3,
  p1: IVec3,
) -> u32 {
  let index = positions.len() as u32;
  positions.push(lerp_q8_ivec3(t, p0, p1));
  normals.push(blend_q8_ivec3(t, corner_normal(samples, p0), corner_normal(samples, p1)));
  index
}

/// Central-difference gradient at a lattice point, unit length in Q8.8.
#[inline]
fn corner_normal(samples: &SampleBuffer, p: IVec3) -> IVec3 {
  let g = IVec3::new(
    sample_at(samples, p + IVec3::X) - sample_at(samples, p - IVec3::X),
    sample_at(samples, p + IVec3::Y) - sample_at(samples, p - IVec3::Y),
    sample_at(samples, p + IVec3::Z) - sample_at(samples, p - IVec3::Z),
  );
  normalize_q8(g)
}

/// Extract the isosurface of one node's lattice.
///
/// Cells with a uniform sign contribute nothing; a block without any sign
/// change yields an empty result. `voxels` moves into the result.
#[tracing::instrument(skip_all, name = "polygonizer::extract", fields(mip = chunk.mip_level))]
pub fn polygonize_samples(voxels: Box<SampleBuffer>, chunk: ChunkKey) -> PolygonizeResult {
  let mut result = PolygonizeResult::with_capacity(chunk, voxels);
  let mut fixed_positions: Vec<IVec3> = Vec::with_capacity(result.positions.capacity());
  let mut fixed_normals: Vec<IVec3> = Vec::with_capacity(result.normals.capacity());
  let mut deck = ReuseDeck::new();

  let samples: &SampleBuffer = &result.voxels;
  let mut local = [0u32; 12];
  let mut density = [0i32; 8];

  for z in 0..CELLS {
    for y in 0..CELLS {
      for x in 0..CELLS {
        let origin = IVec3::new(x as i32, y as i32, z as i32);
        deck.set(x, y, z, CORNER_SLOT, NO_VERTEX);

        let mut case = 0usize;
        for (c, d) in density.iter_mut().enumerate() {
          *d = sample_at(samples, origin + corner_offset(c));
          if *d < 0 {
            case |= 1 << c;
          }
        }
        if case == 0 || case == 255 {
          continue;
        }

        let data = &REGULAR_CELL_DATA[REGULAR_CELL_CLASS[case] as usize];
        let valid = (x > 0) as u8 | ((y > 0) as u8) << 1 | ((z > 0) as u8) << 2;

        for (v, &code) in REGULAR_VERTEX_DATA[case][..data.vertex_count()].iter().enumerate() {
          let c0 = vertex_corner0(code);
          let c1 = vertex_corner1(code);
          let p0 = origin + corner_offset(c0);
          let p1 = origin + corner_offset(c1);
          let t = interpolation_t(density[c0], density[c1]);

          if t & 0xFF == 0 {
            // On a lattice point: owned by the cell whose corner 7 it is.
            let corner = if t == 0 { c1 } else { c0 };
            let owner = !(corner as u8) & 7;
            local[v] = if owner & valid == owner {
              let ox = x - (owner & 1) as usize;
              let oy = y - ((owner >> 1) & 1) as usize;
              let oz = z - ((owner >> 2) & 1) as usize;
              match deck.get(ox, oy, oz, CORNER_SLOT) {
                NO_VERTEX => {
                  let index =
                    push_vertex(&mut fixed_positions, &mut fixed_normals, samples, t, p0, p1);
                  deck.set(ox, oy, oz, CORNER_SLOT, index);
                  index
                }
                index => index,
              }
            } else {
              push_vertex(&mut fixed_positions, &mut fixed_normals, samples, t, p0, p1)
            };
            continue;
          }

          let direction = vertex_reuse_direction(code);
          let slot = vertex_reuse_slot(code);

          let reused = if direction != OWNED_BY_CELL && direction & valid == direction {
            let nx = x - (direction & 1) as usize;
            let ny = y - ((direction >> 1) & 1) as usize;
            let nz = z - ((direction >> 2) & 1) as usize;
            Some(deck.get(nx, ny, nz, slot)).filter(|&i| i != NO_VERTEX)
          } else {
            None
          };

          local[v] = match reused {
            Some(index) => index,
            None => {
              let index =
                push_vertex(&mut fixed_positions, &mut fixed_normals, samples, t, p0, p1);
              if direction == OWNED_BY_CELL {
                deck.set(x, y, z, slot, index);
              }
              index
            }
          };
        }

        for tri in data.indices().chunks_exact(3) {
          let [a, b, c] = [0, 1, 2].map(|k| local[tri[k] as usize]);
          if a != b && b != c && a != c {
            result.indices.extend_from_slice(&[a, b, c]);
          }
        }
      }
    }
  }

  let stride = chunk.sample_stride() as f32 / 256.0;
  let origin = chunk.bottom_left.as_vec3();

  let _span =
    tracing::info_span!("polygonizer::to_float", vertices = fixed_positions.len()).entered();
  result
    .positions
    .extend(fixed_positions.iter().map(|p| origin + p.as_vec3() * stride));
  result.normals.extend(fixed_normals.iter().map(|n| {
    let normal = n.as_vec3().normalize_or_zero();
    if normal == Vec3::ZERO {
      Vec3::Y
    } else {
      normal
    }
  }));
  result
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;
