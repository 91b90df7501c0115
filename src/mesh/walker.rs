//! Stochastic point-location walk: given a starting edge and a query
//! point, returns an edge of the triangle that contains it.

use rand::Rng;

use crate::elements::vertex::VertexId;
use crate::geom::{half_plane, Coord, Sign, Thresholds};
use crate::mesh::handle::EdgeId;
use crate::mesh::pool::EdgePool;
use crate::mesh::vertex_store::VertexStore;

/// Safety valve against cycling on degenerate/near-collinear meshes:
/// once this many hops have been taken, fall back to a linear scan.
const MAX_WALK_STEPS: usize = 1_000;

fn destination(pool: &EdgePool, e: EdgeId) -> VertexId {
    pool.get(e.dual()).origin
}

fn triangle_edges(pool: &EdgePool, e: EdgeId) -> [EdgeId; 3] {
    let e1 = pool.get(e).forward;
    let e2 = pool.get(e1).forward;
    [e, e1, e2]
}

fn coord_of(vstore: &VertexStore, id: VertexId) -> Option<Coord> {
    if id.is_ghost() {
        None
    } else {
        Some(vstore.coord(id))
    }
}

/// Walks from `start` toward `target`, returning an edge of the
/// enclosing triangle. If `target` lies outside the convex hull, the
/// returned edge borders a ghost triangle (check `is_ghost` on its
/// destination via the caller's own predicate).
pub fn locate(
    pool: &EdgePool,
    vstore: &VertexStore,
    _thresholds: &Thresholds,
    start: EdgeId,
    target: Coord,
    rng: &mut impl Rng,
) -> EdgeId {
    let mut current = start;
    let mut visited = std::collections::HashSet::new();

    for _ in 0..MAX_WALK_STEPS {
        if !visited.insert(current) && visited.len() > 3 {
            // Revisiting edges without making progress: degenerate
            // colinear configuration. Break the tie randomly rather
            // than spinning forever.
            let edges = triangle_edges(pool, current);
            return edges[rng.gen_range(0..3)];
        }

        let edges = triangle_edges(pool, current);
        let offset = rng.gen_range(0..3usize);
        let mut crossed = None;

        for k in 0..3 {
            let edge = edges[(k + offset) % 3];
            let a = pool.get(edge).origin;
            let b = destination(pool, edge);
            // Ghost edges never get crossed during the search: the
            // query point is always a real coordinate, so there is
            // nothing useful to find past the "vertex at infinity".
            if a.is_ghost() || b.is_ghost() {
                continue;
            }
            let (ca, cb) = (coord_of(vstore, a).unwrap(), coord_of(vstore, b).unwrap());
            if half_plane(ca, cb, target, 0.0) == Sign::Negative {
                crossed = Some(edge.dual());
                break;
            }
        }

        match crossed {
            Some(next) => current = next,
            None => return current,
        }
    }

    // Cycle-detection fallback: exhaustive scan for a triangle that
    // contains the point, preferring a non-ghost match.
    linear_scan_fallback(pool, vstore, target).unwrap_or(current)
}

fn linear_scan_fallback(pool: &EdgePool, vstore: &VertexStore, target: Coord) -> Option<EdgeId> {
    for (id, edge) in pool.iter() {
        if edge.forward == id {
            continue; // not yet spliced into a triangle
        }
        let edges = triangle_edges(pool, id);
        let all_real = edges.iter().all(|&e| !pool.get(e).origin.is_ghost());
        if !all_real {
            continue;
        }
        let coords: Vec<Coord> = edges
            .iter()
            .map(|&e| vstore.coord(pool.get(e).origin))
            .collect();
        let inside = (0..3).all(|i| {
            half_plane(coords[i], coords[(i + 1) % 3], target, 0.0) != Sign::Negative
        });
        if inside {
            return Some(id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::vertex::VertexRecord;
    use rand::SeedableRng;

    fn build_single_triangle() -> (EdgePool, VertexStore, EdgeId) {
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(4.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(0.0, 4.0, 0.0, 2));

        let ab = pool.allocate(a, b);
        let bc = pool.allocate(b, c);
        let ca = pool.allocate(c, a);
        pool.link(ab, bc);
        pool.link(bc, ca);
        pool.link(ca, ab);
        (pool, vstore, ab)
    }

    #[test]
    fn locate_finds_point_inside_single_triangle() {
        let (pool, vstore, start) = build_single_triangle();
        let thresholds = Thresholds {
            vertex_tolerance: 1e-9,
            half_plane: 1e-12,
            in_circle: 1e-12,
            delaunay: 1e-12,
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let found = locate(&pool, &vstore, &thresholds, start, Coord::new(1.0, 1.0), &mut rng);
        let edges = triangle_edges(&pool, found);
        assert!(edges.iter().all(|&e| !pool.get(e).origin.is_ghost()));
    }
}
