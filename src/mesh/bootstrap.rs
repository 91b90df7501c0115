//! Builds the starting ring: one non-degenerate interior triangle
//! surrounded by three ghost triangles sharing the vertex at infinity.

use crate::elements::vertex::VertexId;
use crate::geom::{signed_area, Thresholds};
use crate::mesh::handle::EdgeId;
use crate::mesh::pool::EdgePool;
use crate::mesh::vertex_store::VertexStore;

/// Picks three vertices from `candidates` (indices into `vstore`) with
/// the largest triangle area among a bounded random sample, and splices
/// the initial ring. Returns the anchor edge `A->B` of the interior
/// triangle, or `None` if every sampled triple was degenerate (all
/// candidates collinear within `half_plane` threshold).
pub fn bootstrap(
    pool: &mut EdgePool,
    vstore: &VertexStore,
    candidates: &[VertexId],
    thresholds: &Thresholds,
) -> Option<EdgeId> {
    if candidates.len() < 3 {
        return None;
    }

    let mut best: Option<(f64, VertexId, VertexId, VertexId)> = None;
    // Bounded sample: every triple for small pending lists, otherwise a
    // capped scan anchored at the first point (adequate since bootstrap
    // candidates are typically the first handful of offered vertices).
    let sample_limit = candidates.len().min(32);
    for i in 0..sample_limit {
        for j in (i + 1)..sample_limit {
            for k in (j + 1)..sample_limit {
                let (a, b, c) = (candidates[i], candidates[j], candidates[k]);
                let area = signed_area(vstore.coord(a), vstore.coord(b), vstore.coord(c)).abs();
                if best.as_ref().map(|(best_area, ..)| area > *best_area).unwrap_or(true) {
                    best = Some((area, a, b, c));
                }
            }
        }
    }

    let (area, a, b, c) = best?;
    if area <= thresholds.half_plane {
        return None;
    }

    // Orient CCW.
    let (a, b, c) = if signed_area(vstore.coord(a), vstore.coord(b), vstore.coord(c)) > 0.0 {
        (a, b, c)
    } else {
        (a, c, b)
    };

    let ghost = VertexId::GHOST;

    let ab = pool.allocate(a, b);
    let bc = pool.allocate(b, c);
    let ca = pool.allocate(c, a);
    pool.link(ab, bc);
    pool.link(bc, ca);
    pool.link(ca, ab);

    let ag = pool.allocate(a, ghost);
    let bg = pool.allocate(b, ghost);
    let cg = pool.allocate(c, ghost);

    let ba = ab.dual();
    let cb = bc.dual();
    let ac = ca.dual();

    // Ghost triangle across AB: B->A, A->G, G->B.
    pool.link(ba, ag);
    pool.link(ag, bg.dual());
    pool.link(bg.dual(), ba);

    // Ghost triangle across BC: C->B, B->G, G->C.
    pool.link(cb, bg);
    pool.link(bg, cg.dual());
    pool.link(cg.dual(), cb);

    // Ghost triangle across CA: A->C, C->G, G->A.
    pool.link(ac, cg);
    pool.link(cg, ag.dual());
    pool.link(ag.dual(), ac);

    Some(ab)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeshConfig;
    use crate::elements::vertex::VertexRecord;

    fn thresholds() -> Thresholds {
        Thresholds::from(&MeshConfig::default())
    }

    #[test]
    fn bootstrap_succeeds_on_non_collinear_triangle() {
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(1.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(0.0, 1.0, 0.0, 2));
        let anchor = bootstrap(&mut pool, &vstore, &[a, b, c], &thresholds());
        assert!(anchor.is_some());
        let anchor = anchor.unwrap();
        // Triangle circuit closes after three forward hops.
        let e1 = pool.get(anchor).forward;
        let e2 = pool.get(e1).forward;
        assert_eq!(pool.get(e2).forward, anchor);
    }

    #[test]
    fn bootstrap_fails_on_collinear_points() {
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(1.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(2.0, 0.0, 0.0, 2));
        assert!(bootstrap(&mut pool, &vstore, &[a, b, c], &thresholds()).is_none());
    }

    #[test]
    fn bootstrap_builds_three_ghost_triangles() {
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(1.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(0.0, 1.0, 0.0, 2));
        let anchor = bootstrap(&mut pool, &vstore, &[a, b, c], &thresholds()).unwrap();
        let ghost_triangles = pool
            .iter()
            .filter(|(_, e)| e.origin.is_ghost())
            .count();
        assert_eq!(ghost_triangles, 3);
        let _ = anchor;
    }
}
