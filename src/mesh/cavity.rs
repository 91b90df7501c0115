//! Shared ear-clipping polygon closer used by both vertex removal and
//! constraint cavity fill: repeatedly picks the lowest-scored ear from a
//! cyclic boundary until only a single triangle remains.

use crate::elements::vertex::VertexId;
use crate::mesh::handle::EdgeId;
use crate::mesh::pool::EdgePool;

/// Closes the simple polygon described by `ring` (vertices, CCW) and
/// `boundary` (the directed edge `ring[i] -> ring[i+1]`, already
/// allocated), calling `score` for each candidate ear at index `i`
/// (lower is closed first). Mutates `ring`/`boundary` down to the final
/// triangle and returns every newly allocated diagonal, in closing
/// order.
pub fn close_polygon(
    pool: &mut EdgePool,
    ring: &mut Vec<VertexId>,
    boundary: &mut Vec<EdgeId>,
    mut score: impl FnMut(&[VertexId], usize) -> f64,
) -> Vec<EdgeId> {
    let mut new_edges = Vec::new();

    while ring.len() > 3 {
        let n = ring.len();
        let (mut best_i, mut best_score) = (0usize, f64::INFINITY);
        for i in 0..n {
            let s = score(ring, i);
            if s < best_score {
                best_score = s;
                best_i = i;
            }
        }
        if best_score == f64::INFINITY {
            if let Some(i) = (0..n).find(|&i| ring[(i + n - 1) % n].is_ghost()) {
                best_i = i;
            }
        }

        let prev_i = (best_i + n - 1) % n;
        let next_i = (best_i + 1) % n;
        let prev_edge = boundary[prev_i];
        let next_edge = boundary[best_i];
        let a = ring[prev_i];
        let c = ring[next_i];

        let new_edge = pool.allocate(a, c);
        pool.link(prev_edge, next_edge);
        pool.link(next_edge, new_edge.dual());
        pool.link(new_edge.dual(), prev_edge);
        new_edges.push(new_edge);

        ring.remove(best_i);
        boundary.remove(best_i);
        let new_prev_i = if best_i == 0 { boundary.len() - 1 } else { prev_i };
        boundary[new_prev_i] = new_edge;
    }

    if boundary.len() == 3 {
        pool.link(boundary[0], boundary[1]);
        pool.link(boundary[1], boundary[2]);
        pool.link(boundary[2], boundary[0]);
    }

    new_edges
}

/// Iteratively restores the Delaunay property around a worklist of
/// candidate edges, flipping any unconstrained edge whose quadrilateral
/// fails in-circle. An explicit worklist rather than recursion, so
/// near-degenerate inputs can't blow the stack; returns the number of
/// flips, for diagnostics.
pub fn restore_delaunay(
    pool: &mut EdgePool,
    vstore: &crate::mesh::vertex_store::VertexStore,
    thresholds: &crate::geom::Thresholds,
    seed: Vec<EdgeId>,
) -> usize {
    let mut worklist = seed;
    let mut flips = 0usize;
    let mut guard = 0usize;

    while let Some(e) = worklist.pop() {
        guard += 1;
        if guard > 1_000_000 {
            break; // pathological-input backstop
        }
        if pool.try_get(e).is_none() || pool.get(e).flags.is_constrained() {
            continue;
        }
        let bv = pool.get(e).forward;
        let va = pool.get(bv).forward;
        let dual = e.dual();
        let ad = pool.get(dual).forward;
        let db = pool.get(ad).forward;

        let a = pool.get(e).origin;
        let b = pool.get(dual).origin;
        let v = pool.get(va).origin;
        let d = pool.get(db).origin;
        if a.is_ghost() || b.is_ghost() || v.is_ghost() || d.is_ghost() {
            continue;
        }

        let value = crate::geom::in_circle(
            vstore.coord(a),
            vstore.coord(b),
            vstore.coord(v),
            vstore.coord(d),
            thresholds.in_circle,
        );
        if value == crate::geom::Sign::Positive {
            let (new_ad, new_db) = super::insertion::flip(pool, e);
            worklist.push(new_ad);
            worklist.push(new_db);
            flips += 1;
        }
    }
    flips
}
