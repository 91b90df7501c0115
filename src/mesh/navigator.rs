//! Read-only coordinate-based queries over a settled mesh: nearest
//! edge/vertex, containing triangle, hull membership. Safe to use from
//! many threads concurrently as long as no thread is mutating the mesh
//! (see the crate's concurrency model).

use std::cell::RefCell;

use rand::rngs::StdRng;

use crate::elements::vertex::VertexId;
use crate::geom::{distance, Coord, Thresholds};
use crate::mesh::handle::EdgeId;
use crate::mesh::pool::EdgePool;
use crate::mesh::triangle::TriangleView;
use crate::mesh::vertex_store::VertexStore;
use crate::mesh::walker;

/// Borrowed view into a mesh, seeded at the mesh's cached anchor edge.
/// The walker's RNG lives behind a `RefCell` so navigation methods can
/// take `&self`: tie-breaking does not depend on the sequence of calls,
/// only on the starting edge and target point.
pub struct Navigator<'a> {
    pool: &'a EdgePool,
    vstore: &'a VertexStore,
    thresholds: &'a Thresholds,
    anchor: EdgeId,
    rng: RefCell<StdRng>,
}

impl<'a> Navigator<'a> {
    pub(crate) fn new(
        pool: &'a EdgePool,
        vstore: &'a VertexStore,
        thresholds: &'a Thresholds,
        anchor: EdgeId,
        rng: StdRng,
    ) -> Self {
        Navigator {
            pool,
            vstore,
            thresholds,
            anchor,
            rng: RefCell::new(rng),
        }
    }

    /// An edge of the triangle containing `(x, y)` (a ghost edge if the
    /// point lies outside the convex hull).
    pub fn neighbor_edge(&self, x: f64, y: f64) -> EdgeId {
        walker::locate(
            self.pool,
            self.vstore,
            self.thresholds,
            self.anchor,
            Coord::new(x, y),
            &mut self.rng.borrow_mut(),
        )
    }

    /// The non-ghost triangle containing `(x, y)`, or `None` if the
    /// point lies outside the convex hull.
    pub fn containing_triangle(&self, x: f64, y: f64) -> Option<TriangleView> {
        let t = TriangleView::at(self.pool, self.neighbor_edge(x, y));
        if t.is_ghost() {
            None
        } else {
            Some(t)
        }
    }

    pub fn is_point_inside_tin(&self, x: f64, y: f64) -> bool {
        self.containing_triangle(x, y).is_some()
    }

    /// The vertex of the containing triangle (or, outside the hull, of
    /// the nearest boundary triangle) closest to `(x, y)`.
    pub fn nearest_vertex(&self, x: f64, y: f64) -> Option<VertexId> {
        self.vstore.nearest(Coord::new(x, y))
    }

    /// The edge of the located triangle closest to `(x, y)`, measured to
    /// each edge's midpoint; a cheap, locally-accurate approximation
    /// that avoids a full scan of the mesh.
    pub fn nearest_edge(&self, x: f64, y: f64) -> EdgeId {
        let p = Coord::new(x, y);
        let start = self.neighbor_edge(x, y);
        let e2 = self.pool.get(start).forward;
        let e3 = self.pool.get(e2).forward;
        [start, e2, e3]
            .into_iter()
            .filter(|&e| {
                !self.pool.get(e).origin.is_ghost() && !self.pool.get(e.dual()).origin.is_ghost()
            })
            .min_by(|&e, &f| {
                edge_point_distance(self.pool, self.vstore, e, p)
                    .partial_cmp(&edge_point_distance(self.pool, self.vstore, f, p))
                    .unwrap()
            })
            .unwrap_or(start)
    }
}

fn edge_point_distance(pool: &EdgePool, vstore: &VertexStore, e: EdgeId, p: Coord) -> f64 {
    let a = vstore.coord(pool.get(e).origin);
    let b = vstore.coord(pool.get(e.dual()).origin);
    let mid = crate::geom::midpoint(a, b);
    distance(mid, p)
}
