//! Ambient IO/CLI collaborator: a JSON mesh document in, a triangulated
//! mesh JSON document out. This module is explicitly outside the core's
//! public API; it drives `Mesh` purely through its ordinary public
//! methods, the same way `tin_cli` does.

pub mod model;
pub mod read;
pub mod write;

use log::debug;

use crate::config::MeshConfig;
use crate::elements::constraint::ConstraintSpec;
use crate::elements::polyline::Polyline;
use crate::error::{TinError, TinResult};
use crate::geom::Coord;
use crate::mesh::Mesh;

use self::model::{ConstraintDoc, ConstraintDocKind, MeshDocument, TriangulationData};

/// Builds a mesh from a parsed document: configures it, adds every
/// vertex, routes every constraint, and optionally refines, in that
/// order (constraints must follow the vertices they reference; Ruppert
/// refinement must follow the constraints it treats as segment
/// boundaries).
pub fn build_mesh(doc: &MeshDocument) -> TinResult<Mesh> {
    let mut config = MeshConfig::new(doc.nominal_point_spacing)?;
    config.vertex_merger_rule = doc.vertex_merger_rule;
    if let Some(refinement) = &doc.refinement {
        config.refinement = refinement.clone().into();
    }
    config.validate()?;
    let mut mesh = Mesh::with_config(config)?;

    for v in &doc.vertices {
        mesh.add(v.x, v.y, v.z, v.index)?;
    }
    debug!("loaded {} vertices from document", doc.vertices.len());

    if !doc.constraints.is_empty() {
        let specs = doc
            .constraints
            .iter()
            .map(constraint_spec)
            .collect::<TinResult<Vec<_>>>()?;
        mesh.add_constraints(specs, doc.restore_conformity)?;
        debug!("applied {} constraints from document", doc.constraints.len());
    }

    if doc.refine {
        let report = mesh.refine()?;
        debug!(
            "refinement converged after {} iterations ({} splits, {} circumcenters)",
            report.iterations, report.segments_split, report.circumcenters_inserted
        );
    }

    Ok(mesh)
}

fn constraint_spec(doc: &ConstraintDoc) -> TinResult<ConstraintSpec> {
    let points: Vec<Coord> = doc.points.iter().map(|p| Coord::new(p.x, p.y)).collect();
    let spec = match doc.kind {
        ConstraintDocKind::Linear => Polyline::open(points).and_then(ConstraintSpec::linear),
        ConstraintDocKind::Region => Polyline::closed(points).and_then(ConstraintSpec::region),
    };
    spec.ok_or_else(|| {
        TinError::InvalidArgument(
            "a linear constraint needs at least 2 points and a region at least 3".into(),
        )
    })
}

pub fn to_triangulation_data(name: &str, mesh: &Mesh) -> TriangulationData {
    TriangulationData::from_mesh(name, mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::model::VertexSpec;

    fn square_document(refine: bool) -> MeshDocument {
        MeshDocument {
            id: uuid::Uuid::nil(),
            name: "square".into(),
            date: "2020-01-01T00:00:00.000Z".into(),
            nominal_point_spacing: 1.0,
            vertex_merger_rule: Default::default(),
            vertices: vec![
                VertexSpec { index: 0, x: 0.0, y: 0.0, z: 0.0 },
                VertexSpec { index: 1, x: 4.0, y: 0.0, z: 0.0 },
                VertexSpec { index: 2, x: 4.0, y: 4.0, z: 0.0 },
                VertexSpec { index: 3, x: 0.0, y: 4.0, z: 0.0 },
            ],
            constraints: Vec::new(),
            refinement: None,
            restore_conformity: true,
            refine,
        }
    }

    #[test]
    fn build_mesh_triangulates_a_square() {
        let doc = square_document(false);
        let mesh = build_mesh(&doc).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.count_triangles() >= 2);
        assert!(mesh.integrity_check().is_ok());
    }

    #[test]
    fn build_mesh_with_a_region_constraint() {
        let mut doc = square_document(false);
        doc.constraints.push(ConstraintDoc {
            kind: ConstraintDocKind::Region,
            points: vec![
                crate::io::model::Point { x: 1.0, y: 1.0, z: 0.0 },
                crate::io::model::Point { x: 3.0, y: 1.0, z: 0.0 },
                crate::io::model::Point { x: 3.0, y: 3.0, z: 0.0 },
                crate::io::model::Point { x: 1.0, y: 3.0, z: 0.0 },
            ],
        });
        let mesh = build_mesh(&doc).unwrap();
        assert!(mesh.integrity_check().is_ok());
    }

    #[test]
    fn to_triangulation_data_indexes_every_live_vertex() {
        let doc = square_document(false);
        let mesh = build_mesh(&doc).unwrap();
        let data = to_triangulation_data(&doc.name, &mesh);
        assert_eq!(data.coordinates.len(), mesh.vertex_count());
        assert_eq!(data.triangles.len(), mesh.count_triangles());
    }
}
