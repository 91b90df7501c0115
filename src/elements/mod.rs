//! Plain data types shared across the mesh: vertex records, bounding
//! boxes, caller-facing polylines, and constraint definitions.

pub mod bounding_box;
pub mod constraint;
pub mod polyline;
pub mod vertex;

pub use bounding_box::BoundingBox;
pub use constraint::{Constraint, ConstraintId, ConstraintKind, ConstraintSpec};
pub use polyline::Polyline;
pub use vertex::{VertexId, VertexMergerGroup, VertexRecord, VertexSlot, VertexStatus};
