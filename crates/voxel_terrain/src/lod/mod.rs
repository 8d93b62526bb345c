//! Level-of-detail selection: which nodes to draw this frame.
//!
//! A node is culled with its whole subtree when its bounding sphere falls
//! outside the frustum. A visible node whose projected NDC rectangle is
//! small enough is drawn as is; larger ones hand over to their children.
//!
//! # Module Structure
//!
//! - [`camera`]: `CameraSnapshot` - per-frame camera parameters
//! - [`frustum`]: `Plane`, `Frustum` - six-plane culling volume
//! - [`selection`]: `LodConfig`, the viewport-area heuristic and traversal

pub mod camera;
pub mod frustum;
pub mod selection;

pub use camera::CameraSnapshot;
pub use frustum::{Frustum, Plane};
pub use selection::{bounding_sphere, select_chunks_to_render, viewport_area_heuristic, LodConfig};
