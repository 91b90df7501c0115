//! Constraint definitions: the tagged variant over linear / region
//! constraints mandated in place of runtime-type branching.

use crate::elements::polyline::Polyline;
use crate::elements::vertex::VertexId;

/// Index into the mesh's constraint table; packed into edge flags
/// alongside the constraint-kind bits, so it must fit in 13 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(pub u16);

impl ConstraintId {
    pub const MAX_VALUE: u16 = 8190;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// An open polyline: appears as a chain of constrained edges.
    Linear,
    /// A closed polygon: its border is constrained, and its interior
    /// edges carry the region's index after flood fill.
    Region,
}

/// A constraint as given by the caller, before its vertices have been
/// inserted into the mesh.
#[derive(Debug, Clone)]
pub struct ConstraintSpec {
    pub kind: ConstraintKind,
    pub polyline: Polyline,
}

impl ConstraintSpec {
    pub fn linear(polyline: Polyline) -> Option<Self> {
        if polyline.closed {
            return None;
        }
        Some(ConstraintSpec {
            kind: ConstraintKind::Linear,
            polyline,
        })
    }

    pub fn region(polyline: Polyline) -> Option<Self> {
        if !polyline.closed {
            return None;
        }
        Some(ConstraintSpec {
            kind: ConstraintKind::Region,
            polyline,
        })
    }
}

/// A constraint as recorded in the mesh's canonical constraint table,
/// after its vertices have resolved to `VertexId`s (possibly merger
/// groups).
#[derive(Debug, Clone)]
pub struct Constraint {
    pub id: ConstraintId,
    pub kind: ConstraintKind,
    pub vertices: Vec<VertexId>,
}

impl Constraint {
    /// Ordered vertex pairs forming this constraint's segments.
    pub fn segments(&self) -> Vec<(VertexId, VertexId)> {
        let n = self.vertices.len();
        let edge_count = match self.kind {
            ConstraintKind::Region => n,
            ConstraintKind::Linear => n - 1,
        };
        (0..edge_count)
            .map(|i| (self.vertices[i], self.vertices[(i + 1) % n]))
            .collect()
    }

    pub fn is_region(&self) -> bool {
        matches!(self.kind, ConstraintKind::Region)
    }
}
