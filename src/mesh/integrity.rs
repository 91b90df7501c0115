//! Independent verification pass over the mesh invariants: circuit
//! closure, perimeter/ghost parity and orientation, non-degenerate
//! triangles, and in-circle compliance, with constrained and
//! unconstrained violations counted separately since constrained edges
//! are exempt from the Delaunay criterion by design.

use crate::geom::{in_circle, signed_area, Sign, Thresholds};
use crate::mesh::handle::EdgeId;
use crate::mesh::pool::EdgePool;
use crate::mesh::triangle::iter_triangles;
use crate::mesh::vertex_store::VertexStore;

#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub circuit_failures: usize,
    pub degenerate_triangles: usize,
    pub perimeter_edges: usize,
    pub ghost_edges: usize,
    pub perimeter_area: f64,
    pub in_circle_violations_constrained: usize,
    pub in_circle_violations_unconstrained: usize,
    pub in_circle_violation_max: f64,
    pub first_failure: Option<String>,
}

impl IntegrityReport {
    pub fn is_ok(&self) -> bool {
        self.circuit_failures == 0
            && self.degenerate_triangles == 0
            && self.perimeter_edges == self.ghost_edges
            && self.perimeter_area > 0.0
            && self.in_circle_violations_unconstrained == 0
    }

    fn fail(&mut self, message: impl Into<String>) {
        if self.first_failure.is_none() {
            self.first_failure = Some(message.into());
        }
    }
}

pub fn check(pool: &EdgePool, vstore: &VertexStore, thresholds: &Thresholds) -> IntegrityReport {
    let mut report = IntegrityReport::default();

    check_circuits(pool, &mut report);
    check_perimeter(pool, vstore, &mut report);
    check_triangles(pool, vstore, thresholds, &mut report);

    report
}

fn check_circuits(pool: &EdgePool, report: &mut IntegrityReport) {
    for (id, edge) in pool.iter() {
        if edge.forward == id {
            continue; // not yet spliced into a triangle (mid-rebuild only)
        }
        let e2 = pool.get(edge.forward).forward;
        let e3 = pool.get(e2).forward;
        if e3 != id {
            report.circuit_failures += 1;
            report.fail(format!("edge {id} does not close a 3-cycle via forward"));
        }
        if pool.get(edge.reverse).forward != id {
            report.circuit_failures += 1;
            report.fail(format!("edge {id} reverse/forward mismatch"));
        }
        if id.dual().dual() != id || id.dual() == id {
            report.circuit_failures += 1;
            report.fail(format!("edge {id} fails dual involution"));
        }
    }
}

/// Walks the hull by hopping `ghost_to_next = e.forward` (G -> next
/// vertex), `e' = ghost_to_next.dual()` (next vertex -> G), starting
/// from any real->ghost edge. Returns the ordered hull vertices as
/// coordinates plus the count of real->ghost and ghost->real edges.
fn check_perimeter(pool: &EdgePool, vstore: &VertexStore, report: &mut IntegrityReport) {
    let start = pool
        .iter()
        .find(|(_, e)| !e.origin.is_ghost() && pool.get(e.forward).origin.is_ghost());
    let start = match start {
        Some((id, _)) => id,
        None => return, // unbootstrapped mesh: nothing to check
    };

    let mut perimeter_edges = 0usize;
    let mut ghost_edges = 0usize;
    let mut hull = Vec::new();
    let mut e = start;
    let first_vertex = pool.get(e).origin;
    hull.push(vstore.coord(first_vertex));
    perimeter_edges += 1;

    loop {
        let ghost_to_next = pool.get(e).forward;
        ghost_edges += 1;
        let next_edge = ghost_to_next.dual();
        let next_vertex = pool.get(next_edge).origin;
        if next_vertex == first_vertex {
            break;
        }
        hull.push(vstore.coord(next_vertex));
        perimeter_edges += 1;
        e = next_edge;
        if hull.len() > pool.count() * 2 + 8 {
            report.fail("perimeter walk failed to close (corrupt ghost cycle)");
            return;
        }
    }

    report.perimeter_edges = perimeter_edges;
    report.ghost_edges = ghost_edges;
    if perimeter_edges != ghost_edges {
        report.fail("perimeter edge count does not match ghost edge count");
    }

    let mut area = 0.0;
    let n = hull.len();
    for i in 0..n {
        let a = hull[i];
        let b = hull[(i + 1) % n];
        area += a.x * b.y - b.x * a.y;
    }
    report.perimeter_area = area / 2.0;
    if report.perimeter_area <= 0.0 {
        report.fail("perimeter polygon does not have positive signed area");
    }
}

fn check_triangles(
    pool: &EdgePool,
    vstore: &VertexStore,
    thresholds: &Thresholds,
    report: &mut IntegrityReport,
) {
    for t in iter_triangles(pool) {
        if t.is_ghost() {
            continue;
        }
        let (a, b, c) = (vstore.coord(t.a), vstore.coord(t.b), vstore.coord(t.c));
        if signed_area(a, b, c) <= 0.0 {
            report.degenerate_triangles += 1;
            report.fail(format!("triangle at edge {} is not CCW/non-degenerate", t.edge));
        }

        // In-circle compliance: for each of the triangle's three edges,
        // look at the apex across the dual side.
        for e in [t.edge, pool.get(t.edge).forward, pool.get(pool.get(t.edge).forward).forward] {
            check_edge_delaunay(pool, vstore, thresholds, e, report);
        }
    }
}

fn check_edge_delaunay(
    pool: &EdgePool,
    vstore: &VertexStore,
    thresholds: &Thresholds,
    e: EdgeId,
    report: &mut IntegrityReport,
) {
    let dual = e.dual();
    let far_apex = pool.get(pool.get(dual).forward).forward;
    let d = pool.get(far_apex).origin;
    if d.is_ghost() {
        return;
    }
    let tri = crate::mesh::triangle::TriangleView::at(pool, e);
    if tri.is_ghost() {
        return;
    }
    let value = in_circle(
        vstore.coord(tri.a),
        vstore.coord(tri.b),
        vstore.coord(tri.c),
        vstore.coord(d),
        thresholds.in_circle,
    );
    if value != Sign::Positive {
        return;
    }
    let constrained = pool.get(e).flags.is_constrained();
    if constrained {
        report.in_circle_violations_constrained += 1;
    } else {
        report.in_circle_violations_unconstrained += 1;
        report.fail(format!("edge {e} fails in-circle against vertex {d}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeshConfig;
    use crate::elements::vertex::VertexRecord;
    use crate::mesh::bootstrap::bootstrap;
    use crate::mesh::vertex_store::VertexStore;

    #[test]
    fn bootstrap_triangle_passes_all_checks() {
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(1.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(0.0, 1.0, 0.0, 2));
        let thresholds = Thresholds::from(&MeshConfig::default());
        bootstrap(&mut pool, &vstore, &[a, b, c], &thresholds).unwrap();

        let report = check(&pool, &vstore, &thresholds);
        assert!(report.is_ok(), "{:?}", report);
        assert_eq!(report.perimeter_edges, 3);
        assert_eq!(report.ghost_edges, 3);
        assert!((report.perimeter_area - 0.5).abs() < 1e-9);
    }
}
