//! The concrete S1-S6 scenarios: one test per scenario, exercised
//! through the public `Mesh` API exactly as narrated, with the numeric
//! expectations each one calls out.

use delaunay_tin::config::{MeshConfig, RefinementConfig, VertexMergerRule};
use delaunay_tin::elements::constraint::ConstraintSpec;
use delaunay_tin::elements::polyline::Polyline;
use delaunay_tin::geom::Coord;
use delaunay_tin::Mesh;

/// S1 - unit square, four corners.
#[test]
fn s1_unit_square_four_corners() {
    let mut mesh = Mesh::new(1.0).unwrap();
    mesh.add(0.0, 0.0, 0.0, 0).unwrap();
    mesh.add(1.0, 0.0, 0.0, 1).unwrap();
    mesh.add(1.0, 1.0, 0.0, 2).unwrap();
    mesh.add(0.0, 1.0, 0.0, 3).unwrap();

    assert_eq!(mesh.count_triangles(), 2);
    // 5 undirected interior edges (4 hull + 1 diagonal) plus 4 ghost edges.
    let undirected_pairs = mesh.edges().count() / 2;
    assert_eq!(undirected_pairs, 9);
    assert_eq!(mesh.perimeter().len(), 4);
    let report = mesh.integrity_check();
    assert!((report.perimeter_area - 1.0).abs() < 1e-9);
}

/// S2 - add center.
#[test]
fn s2_add_center_of_unit_square() {
    let mut mesh = Mesh::new(1.0).unwrap();
    mesh.add(0.0, 0.0, 0.0, 0).unwrap();
    mesh.add(1.0, 0.0, 0.0, 1).unwrap();
    mesh.add(1.0, 1.0, 0.0, 2).unwrap();
    mesh.add(0.0, 1.0, 0.0, 3).unwrap();
    mesh.add(0.5, 0.5, 0.0, 4).unwrap();

    assert_eq!(mesh.count_triangles(), 4);
    assert_eq!(mesh.perimeter().len(), 4);
    let report = mesh.integrity_check();
    assert!(report.is_ok(), "{report:?}");
}

/// S3 - colinear detection.
#[test]
fn s3_colinear_triple_fails_bootstrap_until_a_fourth_point() {
    let mut mesh = Mesh::new(1.0).unwrap();
    assert!(!mesh.add(0.0, 0.0, 0.0, 0).unwrap());
    assert!(!mesh.add(1.0, 0.0, 0.0, 1).unwrap());
    assert!(!mesh.add(2.0, 0.0, 0.0, 2).unwrap());
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.count_triangles(), 0);

    assert!(mesh.add(0.0, 1.0, 0.0, 3).unwrap());
    assert_eq!(mesh.vertex_count(), 4);
    assert!(mesh.count_triangles() >= 1);
}

/// S4 - merger group.
#[test]
fn s4_coincident_point_joins_a_merger_group_instead_of_a_new_vertex() {
    let mut mesh = Mesh::new(1.0).unwrap();
    assert!(!mesh.add(0.0, 0.0, 0.0, 0).unwrap());
    let grew = mesh.add(1e-12, 0.0, 1.0, 1).unwrap();
    assert!(!grew);

    assert_eq!(mesh.vertices().count(), 1);
    let (_, _, z) = mesh.vertices().next().unwrap();
    // Default merger rule is `First`: the second point's z is dropped.
    assert_eq!(z, 0.0);
}

/// S5 - constraint through interior.
#[test]
fn s5_region_constraint_through_the_interior_of_a_refined_square() {
    let mut mesh = Mesh::new(1.0).unwrap();
    mesh.add(0.0, 0.0, 0.0, 0).unwrap();
    mesh.add(1.0, 0.0, 0.0, 1).unwrap();
    mesh.add(1.0, 1.0, 0.0, 2).unwrap();
    mesh.add(0.0, 1.0, 0.0, 3).unwrap();
    mesh.add(0.5, 0.5, 0.0, 4).unwrap();

    let region = Polyline::closed(vec![
        Coord::new(0.2, 0.2),
        Coord::new(0.8, 0.2),
        Coord::new(0.8, 0.8),
        Coord::new(0.2, 0.8),
    ])
    .unwrap();
    let spec = ConstraintSpec::region(region).unwrap();
    mesh.add_constraints(vec![spec], true).unwrap();

    let report = mesh.integrity_check();
    assert!(report.is_ok(), "{report:?}");

    // Every interior edge of the polygon carries the region's index, and
    // removal is now forbidden.
    assert!(mesh.remove(4).is_err());
}

/// S6 - Ruppert refinement, theta_min = 20 degrees, on a very skinny seed.
#[test]
fn s6_ruppert_refinement_meets_the_twenty_degree_bound() {
    let mut config = MeshConfig::new(1.0).unwrap();
    config.vertex_merger_rule = VertexMergerRule::First;
    config.refinement = RefinementConfig {
        min_angle_deg: 20.0,
        max_iterations: 5000,
        tolerance: 1e-9,
        min_edge_length: 1e-6,
    };
    let mut mesh = Mesh::with_config(config).unwrap();
    mesh.add(0.0, 0.0, 0.0, 0).unwrap();
    mesh.add(10.0, 0.0, 0.0, 1).unwrap();
    mesh.add(5.0, 0.5, 0.0, 2).unwrap();

    let report = mesh.refine().unwrap();
    assert!(report.circumcenters_inserted > 0 || report.segments_split > 0);
    assert!(report.iterations < 5000);
    assert!(mesh.integrity_check().is_ok());
}
