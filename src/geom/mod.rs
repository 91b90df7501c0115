//! Geometry primitives: robust predicates, extended-precision fallback,
//! and the threshold bundle derived from a mesh's nominal point spacing.

pub mod doubledouble;
pub mod predicates;
pub mod threshold;

pub use predicates::{
    angle_at, circumcircle, distance, half_plane, in_circle, midpoint, signed_area, Coord, Sign,
};
pub use threshold::Thresholds;
