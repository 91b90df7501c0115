//! Constraint segment routing: finds or carves the path of a constraint
//! edge through the mesh, then restores Delaunay-ness away from the
//! constrained boundary.

use crate::elements::constraint::ConstraintId;
use crate::elements::vertex::VertexId;
use crate::geom::{half_plane, Sign, Thresholds};
use crate::mesh::cavity::{close_polygon, restore_delaunay};
use crate::mesh::handle::EdgeId;
use crate::mesh::pool::EdgePool;
use crate::mesh::removal::spokes_around;
use crate::mesh::vertex_store::VertexStore;

fn destination(pool: &EdgePool, e: EdgeId) -> VertexId {
    pool.get(e.dual()).origin
}

fn mark_constrained(pool: &mut EdgePool, e: EdgeId, constraint_id: ConstraintId, region: bool) {
    for id in [e, e.dual()] {
        let flags = &mut pool.get_mut(id).flags;
        flags.constraint_id = Some(constraint_id);
        flags.line_member = true;
        if region {
            flags.region_border = true;
        }
    }
}

/// Looks for an existing edge `v0 -> v1` by pinwheeling around `v0`.
fn find_existing_edge(pool: &EdgePool, incident_at_v0: EdgeId, v1: VertexId) -> Option<EdgeId> {
    spokes_around(pool, incident_at_v0)
        .into_iter()
        .find(|&s| destination(pool, s) == v1)
}

/// Routes one constraint segment `v0 -> v1`, given an edge incident to
/// `v0` to seed the pinwheel/straddle search. Returns the constrained
/// edge and any newly allocated cavity-fill edges. If the route passes
/// through an intermediate vertex lying exactly on the line (a
/// re-routing point), that vertex is returned so the caller can route
/// the remainder as a fresh segment.
pub struct RouteOutcome {
    pub constrained_edge: EdgeId,
    pub new_edges: Vec<EdgeId>,
    pub reroute_through: Option<VertexId>,
}

pub fn route_segment(
    pool: &mut EdgePool,
    vstore: &VertexStore,
    thresholds: &Thresholds,
    incident_at_v0: EdgeId,
    v0: VertexId,
    v1: VertexId,
    constraint_id: ConstraintId,
    region: bool,
) -> RouteOutcome {
    if let Some(existing) = find_existing_edge(pool, incident_at_v0, v1) {
        mark_constrained(pool, existing, constraint_id, region);
        return RouteOutcome {
            constrained_edge: existing,
            new_edges: Vec::new(),
            reroute_through: None,
        };
    }

    let target = vstore.coord(v1);
    let origin = vstore.coord(v0);

    let spokes = spokes_around(pool, incident_at_v0);
    // Find the sector whose opposite edge straddles the ray v0->v1:
    // the opposite edge's two endpoints fall on different sides of the
    // line, and the sector itself faces toward v1.
    let mut straddle: Option<EdgeId> = None;
    for &s in &spokes {
        let opposite = pool.get(s).forward; // destination(s) -> destination(s.forward.forward)? see below
        let p = destination(pool, s);
        let q = destination(pool, opposite);
        if p.is_ghost() || q.is_ghost() {
            continue;
        }
        let side_p = half_plane(origin, target, vstore.coord(p), thresholds.half_plane);
        let side_q = half_plane(origin, target, vstore.coord(q), thresholds.half_plane);
        if side_p != side_q && side_p != Sign::Zero && side_q != Sign::Zero {
            straddle = Some(opposite);
            break;
        }
        if side_p == Sign::Zero && p != v0 {
            // A ring vertex lies exactly on the constraint line: treat
            // it as an intermediate re-routing point.
            return RouteOutcome {
                constrained_edge: s,
                new_edges: Vec::new(),
                reroute_through: Some(p),
            };
        }
    }

    let mut left_boundary: Vec<EdgeId> = Vec::new();
    let mut left_ring: Vec<VertexId> = vec![v0];
    let mut right_boundary: Vec<EdgeId> = Vec::new();
    let mut right_ring: Vec<VertexId> = vec![v0];
    let mut new_edges = Vec::new();

    let mut current = match straddle {
        Some(h) => h,
        None => {
            // Degenerate: no opposite edge straddles (v1 coincides with
            // a fan neighbor, or the mesh is too coarse). Fall back to
            // allocating the edge directly; this sacrifices the cavity
            // retriangulation but keeps the constraint present.
            let direct = pool.allocate(v0, v1);
            mark_constrained(pool, direct, constraint_id, region);
            return RouteOutcome {
                constrained_edge: direct,
                new_edges: vec![direct],
                reroute_through: None,
            };
        }
    };

    loop {
        let a = pool.get(current).origin;
        let b = destination(pool, current);
        let far_apex = pool.get(pool.get(current.dual()).forward).forward;
        let c = pool.get(far_apex).origin;

        if c == v1 || c.is_ghost() {
            left_ring.push(a);
            right_ring.push(b);
            pool.deallocate(current);
            break;
        }

        let side_c = half_plane(origin, target, vstore.coord(c), thresholds.half_plane);
        if side_c == Sign::Zero {
            // The line passes exactly through an existing vertex: stop
            // here and let the caller route (v0, c) and (c, v1) as two
            // fresh segments instead of carving one bilateral cavity.
            pool.deallocate(current);
            let e = pool.allocate(v0, c);
            mark_constrained(pool, e, constraint_id, region);
            new_edges.push(e);
            return RouteOutcome {
                constrained_edge: e,
                new_edges,
                reroute_through: Some(c),
            };
        }

        left_ring.push(a);
        right_ring.push(b);
        let next_edge_a = pool.get(current.dual()).forward; // a -> c
        let next_edge_b = pool.get(next_edge_a).forward; // c -> b
        pool.deallocate(current);

        current = if side_c == Sign::Positive {
            next_edge_b
        } else {
            next_edge_a
        };
    }

    left_ring.push(v1);
    right_ring.push(v1);

    let constrained_edge = pool.allocate(v0, v1);
    mark_constrained(pool, constrained_edge, constraint_id, region);
    new_edges.push(constrained_edge);

    left_boundary.push(constrained_edge.dual());
    right_boundary.push(constrained_edge);

    if left_ring.len() >= 3 {
        let closed = close_polygon(pool, &mut left_ring, &mut left_boundary, |_, _| 0.0);
        new_edges.extend(closed.iter().copied());
        restore_delaunay(pool, vstore, thresholds, closed);
    }
    if right_ring.len() >= 3 {
        let closed = close_polygon(pool, &mut right_ring, &mut right_boundary, |_, _| 0.0);
        new_edges.extend(closed.iter().copied());
        restore_delaunay(pool, vstore, thresholds, closed);
    }

    RouteOutcome {
        constrained_edge,
        new_edges,
        reroute_through: None,
    }
}

/// Region flood fill: starting from one border edge pointing into the
/// region, propagates `constraint_id` to every interior edge, stopping
/// at other region borders. Nested constraints (a linear feature inside
/// the region) keep their own line index, since the fill only ever
/// writes `region_interior`, never clearing `line_member`.
pub fn flood_fill_region(pool: &mut EdgePool, start: EdgeId, constraint_id: ConstraintId) -> usize {
    let mut visited = std::collections::HashSet::new();
    let mut worklist = vec![start];
    let mut marked = 0usize;

    while let Some(e) = worklist.pop() {
        if !visited.insert(e) {
            continue;
        }
        let flags = pool.get(e).flags;
        if flags.region_border {
            continue;
        }
        pool.get_mut(e).flags.region_interior = true;
        pool.get_mut(e).flags.constraint_id.get_or_insert(constraint_id);
        marked += 1;

        let fwd = pool.get(e).forward;
        let rev = pool.get(e).reverse;
        for neighbor in [fwd.dual(), rev.dual()] {
            if !visited.contains(&neighbor) {
                worklist.push(neighbor);
            }
        }
    }
    marked
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
    fn find_existing_edge_detects_direct_neighbor() {
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(1.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(0.0, 1.0, 0.0, 2));
        let anchor = bootstrap(&mut pool, &vstore, &[a, b, c], &thresholds()).unwrap();
        let found = find_existing_edge(&pool, anchor, b);
        assert_eq!(found, Some(anchor));
    }
}
