//! Arena of directed edges, allocated and freed in pairs.
//!
//! An edge arena addressed by integer handle, rather than a
//! reference-counted adjacency graph: cache-friendly iteration, trivial
//! serialization, and no reference counting.

use crate::elements::vertex::VertexId;
use crate::elements::ConstraintId;
use crate::mesh::handle::EdgeId;

/// Constraint-related flags carried by a directed edge. Both directions
/// of a pair see the same flags; they describe the undirected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeFlags {
    pub region_border: bool,
    pub region_interior: bool,
    pub line_member: bool,
    pub constraint_id: Option<ConstraintId>,
}

impl EdgeFlags {
    pub fn is_constrained(&self) -> bool {
        self.region_border || self.line_member
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectedEdge {
    /// Start vertex of this directed edge, or `VertexId::GHOST`.
    pub origin: VertexId,
    /// Next edge around the triangle, CCW.
    pub forward: EdgeId,
    /// Previous edge around the triangle (== forward.forward for a
    /// 3-cycle, stored explicitly to avoid a double hop).
    pub reverse: EdgeId,
    pub flags: EdgeFlags,
}

/// Arena of directed-edge pairs. `allocate` always hands out both
/// directions of a new undirected edge; `deallocate` frees both at once.
#[derive(Debug, Clone, Default)]
pub struct EdgePool {
    slots: Vec<Option<DirectedEdge>>,
    freelist: Vec<u32>,
    live_pairs: usize,
}

impl EdgePool {
    pub fn new() -> Self {
        EdgePool::default()
    }

    pub fn with_capacity(pairs: usize) -> Self {
        EdgePool {
            slots: Vec::with_capacity(pairs * 2),
            freelist: Vec::new(),
            live_pairs: 0,
        }
    }

    /// Allocates a fresh undirected edge a->b. Returns the a->b id; the
    /// dual (b->a) is `id.dual()`. `forward`/`reverse` are left pointing
    /// at the edge itself until the caller splices it into a triangle.
    pub fn allocate(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        let base = if let Some(base) = self.freelist.pop() {
            base
        } else {
            let base = (self.slots.len() / 2) as u32;
            self.slots.push(None);
            self.slots.push(None);
            base
        };
        let fwd = EdgeId::from_base(base, 0);
        let rev = EdgeId::from_base(base, 1);
        self.slots[fwd.index()] = Some(DirectedEdge {
            origin: a,
            forward: fwd,
            reverse: fwd,
            flags: EdgeFlags::default(),
        });
        self.slots[rev.index()] = Some(DirectedEdge {
            origin: b,
            forward: rev,
            reverse: rev,
            flags: EdgeFlags::default(),
        });
        self.live_pairs += 1;
        fwd
    }

    pub fn deallocate(&mut self, id: EdgeId) {
        let base = id.base_index();
        let fwd = EdgeId::from_base(base, 0);
        let rev = EdgeId::from_base(base, 1);
        if self.slots[fwd.index()].take().is_some() {
            self.live_pairs -= 1;
        }
        self.slots[rev.index()].take();
        self.freelist.push(base);
    }

    pub fn get(&self, id: EdgeId) -> &DirectedEdge {
        self.slots[id.index()]
            .as_ref()
            .expect("dangling edge handle")
    }

    pub fn get_mut(&mut self, id: EdgeId) -> &mut DirectedEdge {
        self.slots[id.index()]
            .as_mut()
            .expect("dangling edge handle")
    }

    pub fn try_get(&self, id: EdgeId) -> Option<&DirectedEdge> {
        self.slots.get(id.index()).and_then(|s| s.as_ref())
    }

    pub fn dual(&self, id: EdgeId) -> &DirectedEdge {
        self.get(id.dual())
    }

    /// Links `e.forward = next`, `next.reverse = e` without touching the
    /// other endpoint of either edge.
    pub fn link(&mut self, e: EdgeId, next: EdgeId) {
        self.get_mut(e).forward = next;
        self.get_mut(next).reverse = e;
    }

    /// Splits the undirected edge `id` at vertex `m`: `a->b` becomes
    /// `a->m` (reusing `id`) plus a freshly allocated `m->b`. Both faces
    /// must be re-stitched by the caller (this only rewires the pair
    /// itself, not the triangles on either side); flags are copied onto
    /// the new half unchanged, matching the source half's metadata.
    pub fn split_edge(&mut self, id: EdgeId, m: VertexId) -> EdgeId {
        let dual = id.dual();
        let b = self.get(dual).origin;
        let flags = self.get(id).flags;
        let new_id = self.allocate(m, b);
        self.get_mut(new_id).flags = flags;
        self.get_mut(new_id.dual()).flags = flags;
        self.get_mut(dual).origin = m;
        new_id
    }

    pub fn count(&self) -> usize {
        self.live_pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, &DirectedEdge)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|e| (EdgeId(i as u32), e)))
    }

    pub fn preallocate(&mut self, additional_pairs: usize) {
        self.slots.reserve(additional_pairs * 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_yields_paired_dual() {
        let mut pool = EdgePool::new();
        let e = pool.allocate(VertexId(0), VertexId(1));
        assert_eq!(pool.get(e).origin, VertexId(0));
        assert_eq!(pool.get(e.dual()).origin, VertexId(1));
        assert_eq!(e.dual().dual(), e);
    }

    #[test]
    fn deallocate_then_allocate_reuses_base_index() {
        let mut pool = EdgePool::new();
        let e1 = pool.allocate(VertexId(0), VertexId(1));
        let base = e1.base_index();
        pool.deallocate(e1);
        assert_eq!(pool.count(), 0);
        let e2 = pool.allocate(VertexId(2), VertexId(3));
        assert_eq!(e2.base_index(), base);
    }

    #[test]
    fn split_edge_preserves_flags_on_new_half() {
        let mut pool = EdgePool::new();
        let e = pool.allocate(VertexId(0), VertexId(1));
        pool.get_mut(e).flags.line_member = true;
        pool.get_mut(e.dual()).flags.line_member = true;
        let new_half = pool.split_edge(e, VertexId(2));
        assert!(pool.get(new_half).flags.line_member);
        assert_eq!(pool.get(e.dual()).origin, VertexId(2));
    }
}
