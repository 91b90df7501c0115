//! Vertex removal via Devillers' ears: open the cavity left by deleting
//! a vertex's spokes, then repeatedly close the safest-looking ear
//! until a single triangle remains.

use crate::elements::vertex::VertexId;
use crate::geom::{in_circle, Coord, Thresholds};
use crate::mesh::cavity::close_polygon;
use crate::mesh::handle::EdgeId;
use crate::mesh::pool::EdgePool;
use crate::mesh::vertex_store::VertexStore;

fn destination(pool: &EdgePool, e: EdgeId) -> VertexId {
    pool.get(e.dual()).origin
}

/// Pinwheels around `v` starting at `incident` (which must have origin
/// `v`), returning the spokes in CCW order.
pub fn spokes_around(pool: &EdgePool, incident: EdgeId) -> Vec<EdgeId> {
    let mut spokes = vec![incident];
    let mut current = incident;
    loop {
        let next = pool.get(pool.get(current).forward).forward.dual();
        if next == incident {
            break;
        }
        spokes.push(next);
        current = next;
        if spokes.len() > 10_000 {
            break; // pathological mesh guard
        }
    }
    spokes
}

/// Score for closing the ear at ring position `i`: the in-circle value
/// of the candidate triangle against the removed vertex's old
/// coordinate. Lower is safer to close first; ghost ring vertices are
/// pinned to `f64::INFINITY` so they are deferred to the end.
fn ear_score(
    ring: &[VertexId],
    vstore: &VertexStore,
    thresholds: &Thresholds,
    removed: Coord,
    i: usize,
) -> f64 {
    let n = ring.len();
    let prev = ring[(i + n - 1) % n];
    let cur = ring[i];
    let next = ring[(i + 1) % n];
    if prev.is_ghost() || cur.is_ghost() || next.is_ghost() {
        return f64::INFINITY;
    }
    let value = in_circle(
        vstore.coord(prev),
        vstore.coord(cur),
        vstore.coord(next),
        removed,
        thresholds.in_circle,
    );
    match value {
        crate::geom::Sign::Positive => 1.0,
        crate::geom::Sign::Zero => 0.0,
        crate::geom::Sign::Negative => -1.0,
    }
}

/// Removes `v`, whose spokes are given by `incident`. Deallocates the
/// spokes and re-closes the opened polygon; returns the newly allocated
/// diagonal edges, for integrity bookkeeping.
pub fn remove_vertex(
    pool: &mut EdgePool,
    vstore: &VertexStore,
    thresholds: &Thresholds,
    v: VertexId,
    incident: EdgeId,
) -> Vec<EdgeId> {
    let removed_coord = vstore.coord(v);
    let spokes = spokes_around(pool, incident);

    let mut ring: Vec<VertexId> = spokes.iter().map(|&s| destination(pool, s)).collect();
    let mut boundary: Vec<EdgeId> = spokes.iter().map(|&s| pool.get(s).forward).collect();

    for &s in &spokes {
        pool.deallocate(s);
    }

    close_polygon(pool, &mut ring, &mut boundary, |ring, i| {
        ear_score(ring, vstore, thresholds, removed_coord, i)
    })
}
