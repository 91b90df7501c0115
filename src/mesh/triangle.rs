//! A triangle is never stored: it is always the triple of edges
//! `(e, e.forward, e.forward.forward)`. `TriangleView` is a read-only
//! snapshot built on demand by iteration and navigation, never held
//! across a mutation.

use crate::elements::vertex::VertexId;
use crate::mesh::handle::EdgeId;
use crate::mesh::pool::EdgePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleView {
    /// One of the triangle's three directed edges; the other two are
    /// `edge.forward` and `edge.forward.forward`.
    pub edge: EdgeId,
    pub a: VertexId,
    pub b: VertexId,
    pub c: VertexId,
}

impl TriangleView {
    pub fn at(pool: &EdgePool, e: EdgeId) -> Self {
        let e2 = pool.get(e).forward;
        let e3 = pool.get(e2).forward;
        TriangleView {
            edge: e,
            a: pool.get(e).origin,
            b: pool.get(e2).origin,
            c: pool.get(e3).origin,
        }
    }

    /// A ghost triangle has the sentinel "vertex at infinity" as one of
    /// its three corners; it represents the exterior of the convex hull.
    pub fn is_ghost(&self) -> bool {
        self.a.is_ghost() || self.b.is_ghost() || self.c.is_ghost()
    }
}

/// Visits every distinct triangle in the pool exactly once, regardless
/// of which of its three edges the iterator happens to land on first:
/// a triangle is reported only at the lowest-id edge of its cycle.
pub fn iter_triangles(pool: &EdgePool) -> impl Iterator<Item = TriangleView> + '_ {
    pool.iter().filter_map(move |(id, edge)| {
        if edge.forward == id {
            return None; // a lone allocated pair, not yet spliced into a triangle
        }
        let e2 = edge.forward;
        let e3 = pool.get(e2).forward;
        if pool.get(e3).forward != id {
            return None; // malformed circuit; integrity checker reports this
        }
        if id < e2 && id < e3 {
            Some(TriangleView {
                edge: id,
                a: edge.origin,
                b: pool.get(e2).origin,
                c: pool.get(e3).origin,
            })
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::vertex::VertexRecord;
    use crate::mesh::bootstrap::bootstrap;
    use crate::mesh::vertex_store::VertexStore;
    use crate::config::MeshConfig;
    use crate::geom::Thresholds;

    #[test]
    fn counts_one_interior_and_three_ghost_triangles_after_bootstrap() {
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(1.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(0.0, 1.0, 0.0, 2));
        let thresholds = Thresholds::from(&MeshConfig::default());
        bootstrap(&mut pool, &vstore, &[a, b, c], &thresholds).unwrap();

        let all: Vec<_> = iter_triangles(&pool).collect();
        assert_eq!(all.len(), 4);
        assert_eq!(all.iter().filter(|t| !t.is_ghost()).count(), 1);
        assert_eq!(all.iter().filter(|t| t.is_ghost()).count(), 3);
    }
}
