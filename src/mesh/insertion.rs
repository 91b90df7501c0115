//! Bowyer-Watson insertion, implemented as point-in-triangle splitting
//! followed by iterative edge-flip legalization (an equivalent, easier
//! to express over the arena, formulation of cavity retriangulation).

use crate::elements::vertex::VertexId;
use crate::geom::{half_plane, in_circle, Sign, Thresholds};
use crate::mesh::handle::EdgeId;
use crate::mesh::pool::EdgePool;
use crate::mesh::vertex_store::VertexStore;

fn destination(pool: &EdgePool, e: EdgeId) -> VertexId {
    pool.get(e.dual()).origin
}

/// Splits the triangle enclosing `enclosing` into three by inserting
/// `v` at its centroid. Returns the directed edge `V -> A` (A being the
/// enclosing edge's origin, the "pivot" the caller rotates around) plus
/// the three new outer edges that must be legalized.
pub fn insert_into_triangle(pool: &mut EdgePool, enclosing: EdgeId, v: VertexId) -> (EdgeId, [EdgeId; 3]) {
    let ab = enclosing;
    let bc = pool.get(ab).forward;
    let ca = pool.get(bc).forward;
    debug_assert_eq!(pool.get(ca).forward, ab);

    let a = pool.get(ab).origin;
    let b = pool.get(bc).origin;
    let c = pool.get(ca).origin;

    let av = pool.allocate(a, v);
    let bv = pool.allocate(b, v);
    let cv = pool.allocate(c, v);

    // Triangle A,B,V: AB -> BV -> VA
    pool.link(ab, bv);
    pool.link(bv, av.dual());
    pool.link(av.dual(), ab);

    // Triangle B,C,V: BC -> CV -> VB
    pool.link(bc, cv);
    pool.link(cv, bv.dual());
    pool.link(bv.dual(), bc);

    // Triangle C,A,V: CA -> AV -> VC
    pool.link(ca, av);
    pool.link(av, cv.dual());
    pool.link(cv.dual(), ca);

    (av.dual(), [ab, bc, ca])
}

/// Whether the far vertex `d` across edge `(a,b)` from apex `v` violates
/// the Delaunay criterion of triangle `(a,b,v)`, ghost-aware.
fn needs_flip(
    pool: &EdgePool,
    vstore: &VertexStore,
    thresholds: &Thresholds,
    a: VertexId,
    b: VertexId,
    v: VertexId,
    d: VertexId,
) -> bool {
    if d.is_ghost() {
        // The far triangle is a ghost fan: d is "at infinity" behind ab.
        // v only threatens the Delaunay property if it lies beyond ab
        // on the ghost's exterior side.
        let (ca, cb, cv) = (vstore.coord(a), vstore.coord(b), vstore.coord(v));
        return half_plane(ca, cb, cv, thresholds.half_plane) == Sign::Negative;
    }
    if v.is_ghost() {
        return false;
    }
    let (ca, cb, cv, cd) = (
        vstore.coord(a),
        vstore.coord(b),
        vstore.coord(v),
        vstore.coord(d),
    );
    in_circle(ca, cb, cv, cd, thresholds.in_circle) == Sign::Positive
}

/// Flips the shared edge `e` (a->b), rewiring the two adjacent triangles
/// around the new diagonal. Returns the two new outer edges that need
/// to be re-legalized.
pub(crate) fn flip(pool: &mut EdgePool, e: EdgeId) -> (EdgeId, EdgeId) {
    let dual = e.dual();
    let bv = pool.get(e).forward; // B->V
    let va = pool.get(bv).forward; // V->A, closes tri1
    let ad = pool.get(dual).forward; // A->D
    let db = pool.get(ad).forward; // D->B, closes tri2

    let v = pool.get(va).origin;
    let d = pool.get(db).origin;

    pool.get_mut(e).origin = d; // e becomes D->V
    pool.get_mut(dual).origin = v; // dual becomes V->D

    pool.link(va, ad);
    pool.link(ad, e);
    pool.link(e, va);

    pool.link(dual, db);
    pool.link(db, bv);
    pool.link(bv, dual);

    (ad, db)
}

/// Legalizes the mesh around a newly inserted vertex `v`, given the
/// three outer edges of its splitting triangles as the initial worklist.
/// Constrained edges are never flipped (the post-constraints insertion
/// variant). Returns the number of flips performed, for diagnostics.
pub fn legalize(
    pool: &mut EdgePool,
    vstore: &VertexStore,
    thresholds: &Thresholds,
    v: VertexId,
    seed_edges: [EdgeId; 3],
    respect_constraints: bool,
) -> usize {
    let mut worklist: Vec<EdgeId> = seed_edges.to_vec();
    let mut flips = 0usize;

    while let Some(e) = worklist.pop() {
        if pool.try_get(e).is_none() {
            continue; // already consumed by an earlier flip this round
        }
        if respect_constraints && pool.get(e).flags.is_constrained() {
            continue;
        }
        let a = pool.get(e).origin;
        let b = destination(pool, e);
        // A seed edge can itself border the ghost vertex when the split
        // triangle was a ghost fan (inserting a point outside the hull):
        // both triangles across such an edge touch the sentinel, so there
        // is no real quadrilateral to test. Same skip as restore_delaunay.
        if a.is_ghost() || b.is_ghost() {
            continue;
        }
        // The apex on this side of e, reached via e.forward.forward,
        // should be v (or a ghost if e no longer borders v's fan); skip
        // otherwise, which happens once the frontier has moved past it.
        let apex_edge = pool.get(pool.get(e).forward).forward;
        let apex = pool.get(apex_edge).origin;
        if apex != v {
            continue;
        }
        let far_edge = pool.get(pool.get(e.dual()).forward).forward;
        let d = pool.get(far_edge).origin;

        if needs_flip(pool, vstore, thresholds, a, b, apex, d) {
            let (ad, db) = flip(pool, e);
            worklist.push(ad);
            worklist.push(db);
            flips += 1;
        }
    }
    flips
}

/// Splits the undirected edge `ab` (and its dual) by inserting `m` on
/// the segment, subdividing each of its two adjacent triangles `(a,b,x)`
/// and `(b,a,y)` into two. The base pair's flags (constraint metadata)
/// are preserved on both resulting halves by `EdgePool::split_edge`.
/// Returns the four untouched outer edges `[xa, bx, yb, ay]`, which the
/// caller should feed to a Delaunay-restoration worklist.
pub fn split_edge(pool: &mut EdgePool, ab: EdgeId, m: VertexId) -> [EdgeId; 4] {
    let ba = ab.dual();

    let bx = pool.get(ab).forward; // b -> x
    let xa = pool.get(bx).forward; // x -> a
    let x = pool.get(xa).origin;

    let ay = pool.get(ba).forward; // a -> y
    let yb = pool.get(ay).forward; // y -> b
    let y = pool.get(yb).origin;

    // Rewires ab into a->m (reusing its id) and allocates a fresh m->b;
    // ba's origin becomes m, so ab/ba now read as a->m / m->a.
    let mb = pool.split_edge(ab, m);
    let am = ab;
    let ma = ba;
    let bm = mb.dual();

    // (a,b,x) -> (a,m,x) + (m,b,x)
    let mx = pool.allocate(m, x);
    pool.link(am, mx);
    pool.link(mx, xa);
    pool.link(xa, am);
    pool.link(mb, bx);
    pool.link(bx, mx.dual());
    pool.link(mx.dual(), mb);

    // (b,a,y) -> (b,m,y) + (m,a,y)
    let my = pool.allocate(m, y);
    pool.link(bm, my);
    pool.link(my, yb);
    pool.link(yb, bm);
    pool.link(ma, ay);
    pool.link(ay, my.dual());
    pool.link(my.dual(), ma);

    [xa, bx, yb, ay]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeshConfig;
    use crate::elements::vertex::VertexRecord;
    use crate::mesh::bootstrap::bootstrap;

    fn thresholds() -> Thresholds {
        Thresholds::from(&MeshConfig::default())
    }

    #[test]
    fn insert_into_triangle_triples_triangle_count() {
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(4.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(0.0, 4.0, 0.0, 2));
        let anchor = bootstrap(&mut pool, &vstore, &[a, b, c], &thresholds()).unwrap();

        let v = vstore.push(VertexRecord::new(1.0, 1.0, 0.0, 3));
        let (pivot, seeds) = insert_into_triangle(&mut pool, anchor, v);
        assert_eq!(pool.get(pivot).origin, v);
        for e in seeds {
            assert!(pool.try_get(e).is_some());
        }
    }

    #[test]
    fn legalize_flips_diagonal_of_non_delaunay_quad() {
        // Two triangles sharing an edge that fails in-circle: a thin
        // quad where the shared diagonal should flip to the short one.
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(1.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(0.0, 1.0, 0.0, 2));
        let anchor = bootstrap(&mut pool, &vstore, &[a, b, c], &thresholds()).unwrap();
        let v = vstore.push(VertexRecord::new(0.9, 0.9, 0.0, 3));
        let (_pivot, seeds) = insert_into_triangle(&mut pool, anchor, v);
        let flips = legalize(&mut pool, &vstore, &thresholds(), v, seeds, false);
        assert!(flips >= 1, "expected the non-Delaunay diagonal to flip");
    }

    #[test]
    fn split_edge_subdivides_both_adjacent_triangles() {
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(2.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(1.0, 2.0, 0.0, 2));
        let anchor = bootstrap(&mut pool, &vstore, &[a, b, c], &thresholds()).unwrap();

        let before_total = pool.count();
        let before_real = crate::mesh::triangle::iter_triangles(&pool)
            .filter(|t| !t.is_ghost())
            .count();

        let m = vstore.push(VertexRecord::new(1.0, 0.0, 0.0, 3));
        let outer = split_edge(&mut pool, anchor, m);
        for e in outer {
            assert!(pool.try_get(e).is_some());
        }

        let after_real = crate::mesh::triangle::iter_triangles(&pool)
            .filter(|t| !t.is_ghost())
            .count();
        assert_eq!(after_real, before_real + 1);
        // Splitting an edge allocates exactly three new undirected pairs:
        // m->b, m->x and m->y (x the real apex, y the ghost sentinel).
        assert_eq!(pool.count(), before_total + 3);
    }
}
