//! Vertex records and the vertex/merger-group sum type.
//!
//! Edges never hold a vertex by value or by reference; they hold a
//! [`VertexId`], a stable handle into the mesh's append-only vertex
//! store. The "vertex at infinity" that marks a ghost edge is modeled
//! as a reserved sentinel id (`VertexId::GHOST`) rather than as a
//! distinct vertex object, so every predicate that touches a vertex
//! slot must check `is_ghost()` before dereferencing.

use crate::config::VertexMergerRule;
use crate::geom::Coord;

/// A stable handle into the vertex store. `VertexId::GHOST` marks the
/// "vertex at infinity" used at the open end of ghost edges; it is never
/// present in the vertex store and never resolves to a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub u32);

impl VertexId {
    pub const GHOST: VertexId = VertexId(u32::MAX);

    pub fn is_ghost(self) -> bool {
        self == VertexId::GHOST
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_ghost() {
            write!(f, "ghost")
        } else {
            write!(f, "v{}", self.0)
        }
    }
}

/// Flags carried per vertex record, distinguishing provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexStatus {
    /// Set on vertices created by the engine itself (midpoint splits,
    /// circumcenters) rather than supplied by the caller.
    pub synthetic: bool,
    /// Set on vertices that originated from a constraint's vertex list.
    pub constraint_origin: bool,
}

/// A single, caller-supplied vertex: coordinates plus an opaque
/// caller index used only for identity and labeling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub caller_index: i64,
    pub status: VertexStatus,
}

impl VertexRecord {
    pub fn new(x: f64, y: f64, z: f64, caller_index: i64) -> Self {
        VertexRecord {
            x,
            y,
            z,
            caller_index,
            status: VertexStatus::default(),
        }
    }

    pub fn synthetic(x: f64, y: f64, z: f64) -> Self {
        VertexRecord {
            x,
            y,
            z,
            caller_index: -1,
            status: VertexStatus {
                synthetic: true,
                ..VertexStatus::default()
            },
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// A transparent stand-in for a set of vertices whose coordinates
/// coincide within `vertexTolerance`. Resolves to a single representative
/// `z` according to `rule`; `x`/`y` are those of the first member (the
/// insertion order winner).
#[derive(Debug, Clone, PartialEq)]
pub struct VertexMergerGroup {
    pub x: f64,
    pub y: f64,
    pub rule: VertexMergerRule,
    /// `(caller_index, z)` for every member, in insertion order.
    pub members: Vec<(i64, f64)>,
    pub status: VertexStatus,
}

impl VertexMergerGroup {
    pub fn new(first: VertexRecord, rule: VertexMergerRule) -> Self {
        VertexMergerGroup {
            x: first.x,
            y: first.y,
            rule,
            members: vec![(first.caller_index, first.z)],
            status: first.status,
        }
    }

    pub fn absorb(&mut self, other: VertexRecord) {
        self.members.push((other.caller_index, other.z));
        self.status.synthetic = self.status.synthetic || other.status.synthetic;
        self.status.constraint_origin = self.status.constraint_origin || other.status.constraint_origin;
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }

    /// Resolves the group's members to a single representative z.
    pub fn resolved_z(&self) -> f64 {
        match self.rule {
            VertexMergerRule::First => self.members.first().map(|(_, z)| *z).unwrap_or(0.0),
            VertexMergerRule::Last => self.members.last().map(|(_, z)| *z).unwrap_or(0.0),
            VertexMergerRule::Min => self
                .members
                .iter()
                .map(|(_, z)| *z)
                .fold(f64::INFINITY, f64::min),
            VertexMergerRule::Max => self
                .members
                .iter()
                .map(|(_, z)| *z)
                .fold(f64::NEG_INFINITY, f64::max),
            VertexMergerRule::Mean => {
                let sum: f64 = self.members.iter().map(|(_, z)| *z).sum();
                sum / self.members.len() as f64
            }
            VertexMergerRule::MedianZ => {
                let mut zs: Vec<f64> = self.members.iter().map(|(_, z)| *z).collect();
                zs.sort_by(|a, b| a.partial_cmp(b).unwrap());
                zs[zs.len() / 2]
            }
        }
    }
}

/// The sum type stored per `VertexId` slot in the vertex store: either
/// an ordinary vertex, or a group absorbing several coincident vertices.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexSlot {
    Single(VertexRecord),
    Merged(VertexMergerGroup),
}

impl VertexSlot {
    pub fn coord(&self) -> Coord {
        match self {
            VertexSlot::Single(v) => v.coord(),
            VertexSlot::Merged(g) => g.coord(),
        }
    }

    pub fn status(&self) -> VertexStatus {
        match self {
            VertexSlot::Single(v) => v.status,
            VertexSlot::Merged(g) => g.status,
        }
    }

    pub fn is_merger(&self) -> bool {
        matches!(self, VertexSlot::Merged(_))
    }

    pub fn merger_size(&self) -> usize {
        match self {
            VertexSlot::Single(_) => 1,
            VertexSlot::Merged(g) => g.len(),
        }
    }

    pub fn z(&self) -> f64 {
        match self {
            VertexSlot::Single(v) => v.z,
            VertexSlot::Merged(g) => g.resolved_z(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghost_id_is_sentinel_and_never_equals_a_real_id() {
        assert!(VertexId::GHOST.is_ghost());
        assert!(!VertexId(0).is_ghost());
        assert_ne!(VertexId::GHOST, VertexId(0));
    }

    #[test]
    fn merger_group_absorbs_and_resolves_mean() {
        let a = VertexRecord::new(0.0, 0.0, 1.0, 1);
        let b = VertexRecord::new(1e-13, 1e-13, 3.0, 2);
        let mut group = VertexMergerGroup::new(a, VertexMergerRule::Mean);
        group.absorb(b);
        assert_eq!(group.len(), 2);
        assert_eq!(group.resolved_z(), 2.0);
    }

    #[test]
    fn merger_group_first_rule_keeps_original_z() {
        let a = VertexRecord::new(0.0, 0.0, 5.0, 1);
        let b = VertexRecord::new(0.0, 0.0, 99.0, 2);
        let mut group = VertexMergerGroup::new(a, VertexMergerRule::First);
        group.absorb(b);
        assert_eq!(group.resolved_z(), 5.0);
    }

    #[test]
    fn synthetic_vertex_is_flagged() {
        let v = VertexRecord::synthetic(1.0, 1.0, 0.0);
        assert!(v.status.synthetic);
        assert_eq!(v.caller_index, -1);
    }
}
