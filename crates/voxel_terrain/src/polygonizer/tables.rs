//! Regular-cell case tables, generated at compile time.
//!
//! A cell's 8 corner signs form an 8-bit case code (bit `i` set when corner
//! `i` is negative). Each case maps to:
//! - an equivalence class in [`REGULAR_CELL_CLASS`], whose
//!   [`RegularCellData`] gives the vertex count, triangle count and local
//!   triangle indices;
//! - a row of [`REGULAR_VERTEX_DATA`] describing where each local vertex
//!   lies and which neighboring cell may already own it.
//!
//! # Cube Topology
//!
//! ```text
//!       6──────7         Corners (binary ZYX):
//!      /│     /│           0=(0,0,0)  1=(1,0,0)  2=(0,1,0)  3=(1,1,0)
//!     4─┼────5 │           4=(0,0,1)  5=(1,0,1)  6=(0,1,1)  7=(1,1,1)
//!     │ 2────┼─3
//!     │/     │/          +Y
//!     0──────1            │  +Z
//!                         │ /
//!                         └───+X
//! ```
//!
//! # Vertex Data Encoding
//!
//! ```text
//!  15      12 11       8 7        4 3        0
//! ┌──────────┬──────────┬──────────┬──────────┐
//! │ direction│   slot   │ corner 0 │ corner 1 │
//! └──────────┴──────────┴──────────┴──────────┘
//!
//! direction: bit 0 = owner at -X, bit 1 = -Y, bit 2 = -Z
//!            8 = the vertex is owned by this cell
//! slot:      1 = Y edge, 2 = X edge, 3 = Z edge (owner's edge through corner 7)
//! ```
//!
//! # Generation
//!
//! Crossing edges (endpoints of opposite sign) are linked face by face: a
//! face with two crossings joins them; a face with four (the ambiguous
//! checkerboard) joins the two crossings around each negative corner. The
//! links form closed loops. Each loop is oriented with a Newell normal so
//! that it winds counter-clockwise seen from the positive side, then split
//! into triangles by ear clipping. No diagonal joins two vertices on the same
//! face, so face edges of the mesh are shared by exactly two cells.

/// Edge endpoint corner indices, lower corner first.
pub const EDGE_CORNERS: [[u8; 2]; 12] = [
  [0, 1], // Edge 0:  X axis at Y=0, Z=0
  [0, 2], // Edge 1:  Y axis at X=0, Z=0
  [0, 4], // Edge 2:  Z axis at X=0, Y=0
  [1, 3], // Edge 3:  Y axis at X=1, Z=0
  [1, 5], // Edge 4:  Z axis at X=1, Y=0
  [2, 3], // Edge 5:  X axis at Y=1, Z=0
  [2, 6], // Edge 6:  Z axis at X=0, Y=1
  [3, 7], // Edge 7:  Z axis at X=1, Y=1
  [4, 5], // Edge 8:  X axis at Y=0, Z=1
  [4, 6], // Edge 9:  Y axis at X=0, Z=1
  [5, 7], // Edge 10: Y axis at X=1, Z=1
  [6, 7], // Edge 11: X axis at Y=1, Z=1
];

/// Reuse slot per edge axis (X, Y, Z).
pub const REUSE_SLOT_FOR_AXIS: [u8; 3] = [2, 1, 3];

/// Direction nibble of a vertex owned by the current cell.
pub const OWNED_BY_CELL: u8 = 8;

/// Most vertices a regular cell can emit (one per edge).
pub const MAX_CELL_VERTEX_COUNT: usize = 12;

/// Room for the most triangles a case can emit.
pub const MAX_CELL_TRIANGLE_INDICES: usize = 30;

const NO_EDGE: u8 = 0xFF;

/// Triangulation shared by every case in one equivalence class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegularCellData {
  /// High nibble = vertex count, low nibble = triangle count.
  pub geometry_counts: u8,
  /// Local vertex indices, three per triangle.
  pub vertex_index: [u8; MAX_CELL_TRIANGLE_INDICES],
}

impl RegularCellData {
  const EMPTY: Self = Self {
    geometry_counts: 0,
    vertex_index: [0; MAX_CELL_TRIANGLE_INDICES],
  };

  /// Vertices emitted by the class.
  #[inline(always)]
  pub const fn vertex_count(&self) -> usize {
    (self.geometry_counts >> 4) as usize
  }

  /// Triangles emitted by the class.
  #[inline(always)]
  pub const fn triangle_count(&self) -> usize {
    (self.geometry_counts & 0x0F) as usize
  }

  /// Local indices actually used, three per triangle.
  #[inline]
  pub fn indices(&self) -> &[u8] {
    &self.vertex_index[..self.triangle_count() * 3]
  }
}

/// Case code to equivalence class.
pub static REGULAR_CELL_CLASS: [u8; 256] = generate_cell_class();

/// Number of distinct equivalence classes.
pub const REGULAR_CLASS_COUNT: usize = count_classes();

/// Triangulation per equivalence class.
pub static REGULAR_CELL_DATA: [RegularCellData; REGULAR_CLASS_COUNT] = generate_cell_data();

/// Per case, one encoded entry per local vertex (see module docs).
pub static REGULAR_VERTEX_DATA: [[u16; MAX_CELL_VERTEX_COUNT]; 256] = generate_vertex_data();

/// Corner 0 of an encoded vertex.
#[inline(always)]
pub const fn vertex_corner0(data: u16) -> usize {
  ((data >> 4) & 0x0F) as usize
}

/// Corner 1 of an encoded vertex.
#[inline(always)]
pub const fn vertex_corner1(data: u16) -> usize {
  (data & 0x0F) as usize
}

/// Reuse slot of an encoded vertex.
#[inline(always)]
pub const fn vertex_reuse_slot(data: u16) -> usize {
  ((data >> 8) & 0x0F) as usize
}

/// Reuse direction nibble of an encoded vertex.
#[inline(always)]
pub const fn vertex_reuse_direction(data: u16) -> u8 {
  ((data >> 12) & 0x0F) as u8
}

// =============================================================================
// Compile-time generation
// =============================================================================

const fn corner_bit(corner: u8, axis: u8) -> u8 {
  (corner >> axis) & 1
}

const fn is_negative(case: u8, corner: u8) -> bool {
  (case >> corner) & 1 == 1
}

const fn edge_crosses(case: u8, edge: usize) -> bool {
  is_negative(case, EDGE_CORNERS[edge][0]) != is_negative(case, EDGE_CORNERS[edge][1])
}

const fn edge_axis(edge: usize) -> u8 {
  match EDGE_CORNERS[edge][0] ^ EDGE_CORNERS[edge][1] {
    1 => 0,
    2 => 1,
    _ => 2,
  }
}

/// Corner position doubled so that edge midpoints stay integral.
const fn corner_position2(corner: u8) -> [i32; 3] {
  [
    corner_bit(corner, 0) as i32 * 2,
    corner_bit(corner, 1) as i32 * 2,
    corner_bit(corner, 2) as i32 * 2,
  ]
}

/// Edge midpoint in doubled coordinates.
const fn edge_midpoint2(edge: usize) -> [i32; 3] {
  let a = corner_position2(EDGE_CORNERS[edge][0]);
  let b = corner_position2(EDGE_CORNERS[edge][1]);
  [(a[0] + b[0]) / 2, (a[1] + b[1]) / 2, (a[2] + b[2]) / 2]
}

/// Whether two edges lie on a common cube face.
const fn edges_share_face(a: usize, b: usize) -> bool {
  let [a0, a1] = EDGE_CORNERS[a];
  let [b0, b1] = EDGE_CORNERS[b];
  let mut axis = 0u8;
  while axis < 3 {
    let side = corner_bit(a0, axis);
    if corner_bit(a1, axis) == side
      && corner_bit(b0, axis) == side
      && corner_bit(b1, axis) == side
    {
      return true;
    }
    axis += 1;
  }
  false
}

const fn link(mut links: [[u8; 2]; 12], a: u8, b: u8) -> [[u8; 2]; 12] {
  let (ai, bi) = (a as usize, b as usize);
  if links[ai][0] == NO_EDGE {
    links[ai][0] = b;
  } else {
    links[ai][1] = b;
  }
  if links[bi][0] == NO_EDGE {
    links[bi][0] = a;
  } else {
    links[bi][1] = a;
  }
  links
}

/// Pair up crossing edges across the six cube faces.
const fn link_face_crossings(case: u8) -> [[u8; 2]; 12] {
  let mut links = [[NO_EDGE; 2]; 12];
  let mut face = 0u8;

  while face < 6 {
    let axis = face / 2;
    let side = face % 2;

    let mut crossing = [NO_EDGE; 4];
    let mut count = 0;
    let mut edge = 0;
    while edge < 12 {
      let [c0, c1] = EDGE_CORNERS[edge];
      if corner_bit(c0, axis) == side && corner_bit(c1, axis) == side && edge_crosses(case, edge) {
        crossing[count] = edge as u8;
        count += 1;
      }
      edge += 1;
    }

    if count == 2 {
      links = link(links, crossing[0], crossing[1]);
    } else if count == 4 {
      // Separate the negative corners: join the two crossings around each.
      let mut corner = 0u8;
      while corner < 8 {
        if corner_bit(corner, axis) == side && is_negative(case, corner) {
          let mut pair = [NO_EDGE; 2];
          let mut found = 0;
          let mut i = 0;
          while i < 4 {
            let [c0, c1] = EDGE_CORNERS[crossing[i] as usize];
            if c0 == corner || c1 == corner {
              pair[found] = crossing[i];
              found += 1;
            }
            i += 1;
          }
          links = link(links, pair[0], pair[1]);
        }
        corner += 1;
      }
    }
    face += 1;
  }

  links
}

/// Per-case triangulation before class deduplication.
#[derive(Clone, Copy)]
struct CaseGeometry {
  vertex_edges: [u8; MAX_CELL_VERTEX_COUNT],
  vertex_count: u8,
  indices: [u8; MAX_CELL_TRIANGLE_INDICES],
  triangle_count: u8,
}

const fn triangulate_case(case: u8) -> CaseGeometry {
  // Local vertex numbering follows ascending edge order.
  let mut local = [NO_EDGE; 12];
  let mut vertex_edges = [NO_EDGE; MAX_CELL_VERTEX_COUNT];
  let mut vertex_count = 0u8;
  let mut edge = 0;
  while edge < 12 {
    if edge_crosses(case, edge) {
      local[edge] = vertex_count;
      vertex_edges[vertex_count as usize] = edge as u8;
      vertex_count += 1;
    }
    edge += 1;
  }

  let links = link_face_crossings(case);
  let mut visited = [false; 12];
  let mut indices = [0u8; MAX_CELL_TRIANGLE_INDICES];
  let mut index_count = 0;

  let mut start = 0;
  while start < 12 {
    if local[start] != NO_EDGE && !visited[start] {
      // Walk one loop.
      let mut polygon = [NO_EDGE; 12];
      let mut len = 0;
      let mut prev = NO_EDGE;
      let mut cur = start as u8;
      loop {
        visited[cur as usize] = true;
        polygon[len] = cur;
        len += 1;
        let l = links[cur as usize];
        let next = if l[0] != prev { l[0] } else { l[1] };
        prev = cur;
        cur = next;
        if cur == start as u8 {
          break;
        }
      }

      // Newell normal of the loop against the negative-to-positive direction.
      let mut normal = [0i32; 3];
      let mut outward = [0i32; 3];
      let mut i = 0;
      while i < len {
        let a = edge_midpoint2(polygon[i] as usize);
        let b = edge_midpoint2(polygon[(i + 1) % len] as usize);
        normal[0] += (a[1] - b[1]) * (a[2] + b[2]);
        normal[1] += (a[2] - b[2]) * (a[0] + b[0]);
        normal[2] += (a[0] - b[0]) * (a[1] + b[1]);

        let [c0, c1] = EDGE_CORNERS[polygon[i] as usize];
        let (inside, outside) = if is_negative(case, c0) { (c0, c1) } else { (c1, c0) };
        let p_in = corner_position2(inside);
        let p_out = corner_position2(outside);
        outward[0] += p_out[0] - p_in[0];
        outward[1] += p_out[1] - p_in[1];
        outward[2] += p_out[2] - p_in[2];
        i += 1;
      }
      let flip = normal[0] * outward[0] + normal[1] * outward[1] + normal[2] * outward[2] < 0;

      // Clip ears whose closing diagonal leaves the cell faces. A diagonal
      // lying on a face would also be emitted by the neighbor sharing it.
      while len >= 3 {
        let mut ear = 1;
        if len > 3 {
          let mut i = 0;
          while i < len {
            let prev = polygon[(i + len - 1) % len];
            let next = polygon[(i + 1) % len];
            if !edges_share_face(prev as usize, next as usize) {
              ear = i;
              break;
            }
            i += 1;
          }
        }
        let a = polygon[(ear + len - 1) % len];
        let (b, c) = if flip {
          (polygon[(ear + 1) % len], polygon[ear])
        } else {
          (polygon[ear], polygon[(ear + 1) % len])
        };
        indices[index_count] = local[a as usize];
        indices[index_count + 1] = local[b as usize];
        indices[index_count + 2] = local[c as usize];
        index_count += 3;

        let mut j = ear;
        while j + 1 < len {
          polygon[j] = polygon[j + 1];
          j += 1;
        }
        len -= 1;
      }
    }
    start += 1;
  }

  CaseGeometry {
    vertex_edges,
    vertex_count,
    indices,
    triangle_count: (index_count / 3) as u8,
  }
}

const fn cell_data(geometry: &CaseGeometry) -> RegularCellData {
  RegularCellData {
    geometry_counts: geometry.vertex_count << 4 | geometry.triangle_count,
    vertex_index: geometry.indices,
  }
}

const fn same_cell_data(a: &RegularCellData, b: &RegularCellData) -> bool {
  if a.geometry_counts != b.geometry_counts {
    return false;
  }
  let used = (a.geometry_counts & 0x0F) as usize * 3;
  let mut i = 0;
  while i < used {
    if a.vertex_index[i] != b.vertex_index[i] {
      return false;
    }
    i += 1;
  }
  true
}

/// Deduplicate all 256 cases. Returns the class table, the class data
/// (first `count` entries valid) and `count`.
const fn classify() -> ([u8; 256], [RegularCellData; 256], usize) {
  let mut class_of = [0u8; 256];
  let mut classes = [RegularCellData::EMPTY; 256];
  let mut count = 0;

  let mut case = 0;
  while case < 256 {
    let data = cell_data(&triangulate_case(case as u8));
    let mut found = count;
    let mut c = 0;
    while c < count {
      if same_cell_data(&classes[c], &data) {
        found = c;
        break;
      }
      c += 1;
    }
    if found == count {
      classes[count] = data;
      count += 1;
    }
    class_of[case] = found as u8;
    case += 1;
  }

  (class_of, classes, count)
}

const fn count_classes() -> usize {
  classify().2
}

const fn generate_cell_class() -> [u8; 256] {
  classify().0
}

const fn generate_cell_data() -> [RegularCellData; REGULAR_CLASS_COUNT] {
  let all = classify().1;
  let mut out = [RegularCellData::EMPTY; REGULAR_CLASS_COUNT];
  let mut i = 0;
  while i < REGULAR_CLASS_COUNT {
    out[i] = all[i];
    i += 1;
  }
  out
}

/// Reuse direction and slot for an edge.
///
/// The owner is the neighbor whose corner 7 is this edge's upper endpoint:
/// one step back along every other axis on which the edge sits at 0.
const fn reuse_code(edge: usize) -> u8 {
  let axis = edge_axis(edge);
  let c0 = EDGE_CORNERS[edge][0];
  let mut direction = 0u8;
  let mut other = 0u8;
  while other < 3 {
    if other != axis && corner_bit(c0, other) == 0 {
      direction |= 1 << other;
    }
    other += 1;
  }
  if direction == 0 {
    direction = OWNED_BY_CELL;
  }
  direction << 4 | REUSE_SLOT_FOR_AXIS[axis as usize]
}

const fn generate_vertex_data() -> [[u16; MAX_CELL_VERTEX_COUNT]; 256] {
  let mut table = [[0u16; MAX_CELL_VERTEX_COUNT]; 256];
  let mut case = 0;
  while case < 256 {
    let geometry = triangulate_case(case as u8);
    let mut v = 0;
    while v < geometry.vertex_count as usize {
      let edge = geometry.vertex_edges[v] as usize;
      let [c0, c1] = EDGE_CORNERS[edge];
      table[case][v] = (reuse_code(edge) as u16) << 8 | (c0 as u16) << 4 | c1 as u16;
      v += 1;
    }
    case += 1;
  }
  table
}

#[cfg(test)]
#[path = "tables_test.rs"]
mod tables_test;
