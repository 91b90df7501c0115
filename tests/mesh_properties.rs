//! Whole-mesh property tests over the public API: circuit closure,
//! non-degenerate/Delaunay triangles, perimeter/ghost parity, and the
//! Euler relation for a planar triangulation, exercised the way a
//! downstream crate would (through `Mesh` alone, no internal access).

use delaunay_tin::Mesh;

fn unit_square() -> Mesh {
    let mut mesh = Mesh::new(1.0).unwrap();
    mesh.add(0.0, 0.0, 0.0, 0).unwrap();
    mesh.add(1.0, 0.0, 0.0, 1).unwrap();
    mesh.add(1.0, 1.0, 0.0, 2).unwrap();
    mesh.add(0.0, 1.0, 0.0, 3).unwrap();
    mesh
}

#[test]
fn circuits_close_and_triangles_are_non_degenerate_and_delaunay() {
    let mesh = unit_square();
    let report = mesh.integrity_check();
    assert_eq!(report.circuit_failures, 0);
    assert_eq!(report.degenerate_triangles, 0);
    assert_eq!(report.in_circle_violations_unconstrained, 0);
    assert!(report.is_ok(), "{:?}", report);
}

#[test]
fn perimeter_edges_match_ghost_edges_and_have_positive_area() {
    let mesh = unit_square();
    let report = mesh.integrity_check();
    assert_eq!(report.perimeter_edges, report.ghost_edges);
    assert_eq!(report.perimeter_edges, 4);
    assert!(report.perimeter_area > 0.0);
}

/// `triangles = 2*vertices - hull - 2` is the standard relation a planar
/// triangulation satisfies as a consequence of Euler's formula
/// (`V - E + F = 2`, `F` = triangles + one outer face); checking it
/// through nothing but `vertex_count`, `perimeter`, and `count_triangles`
/// exercises the same invariant without needing edge counts.
fn assert_euler_relation(mesh: &Mesh) {
    let v = mesh.vertex_count() as i64;
    let h = mesh.perimeter().len() as i64;
    let t = mesh.count_triangles() as i64;
    assert_eq!(t, 2 * v - h - 2, "V={v} H={h} T={t}");
}

#[test]
fn euler_relation_holds_for_a_square() {
    let mesh = unit_square();
    assert_euler_relation(&mesh);
    assert_eq!(mesh.count_triangles(), 2);
}

#[test]
fn euler_relation_holds_after_inserting_an_interior_vertex() {
    let mut mesh = unit_square();
    mesh.add(0.5, 0.5, 0.0, 4).unwrap();
    assert_euler_relation(&mesh);
    assert_eq!(mesh.count_triangles(), 4);
    assert_eq!(mesh.perimeter().len(), 4);
    assert!(mesh.integrity_check().is_ok());
}

#[test]
fn removal_restores_integrity_without_shrinking_the_vertex_store() {
    // `vertex_count` tracks the append-only vertex store, not live
    // topology: a removed vertex's record outlives its edges, so the
    // Euler relation is checked only on the pre-removal mesh above.
    let mut mesh = unit_square();
    mesh.add(0.5, 0.5, 0.0, 4).unwrap();
    let before = mesh.vertex_count();
    assert!(mesh.remove(4).unwrap());
    assert_eq!(mesh.vertex_count(), before);
    assert_eq!(mesh.count_triangles(), 2);
    assert!(mesh.integrity_check().is_ok());
}

#[test]
fn inserting_a_duplicate_vertex_does_not_grow_the_triangle_count() {
    let mut mesh = unit_square();
    let before = mesh.count_triangles();
    let grew = mesh.add(1.0, 1.0, 9.0, 5).unwrap();
    assert!(!grew);
    assert_eq!(mesh.count_triangles(), before);
}
