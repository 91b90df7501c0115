//! JSON document shapes for the CLI collaborator: a mesh description in,
//! a triangulated mesh out. An id/name/date envelope around a flat
//! vertex/constraint list that maps directly onto `Mesh`'s own API.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{RefinementConfig, VertexMergerRule};
use crate::elements::vertex::VertexId;
use crate::mesh::Mesh;

fn new_uuid() -> Uuid {
    Uuid::new_v4()
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn default_spacing() -> f64 {
    1.0
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        float_cmp::approx_eq!(f64, self.x, other.x, epsilon = 1.0E-14f64)
            && float_cmp::approx_eq!(f64, self.y, other.y, epsilon = 1.0E-14f64)
    }
}

impl Eq for Point {}

/// One caller-supplied vertex; `index` is the opaque identity `Mesh::add`
/// and `Mesh::remove` key on, not a position in this array.
#[derive(Serialize, Deserialize, Debug)]
pub struct VertexSpec {
    pub index: i64,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintDocKind {
    Linear,
    Region,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ConstraintDoc {
    pub kind: ConstraintDocKind,
    pub points: Vec<Point>,
}

/// Mirrors [`RefinementConfig`]: Ruppert refinement here is governed by
/// a minimum angle, not a target triangle area.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefinementDoc {
    pub min_angle_deg: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_min_edge_length")]
    pub min_edge_length: f64,
}

fn default_max_iterations() -> u32 {
    5000
}

fn default_tolerance() -> f64 {
    1e-9
}

fn default_min_edge_length() -> f64 {
    1e-6
}

impl From<RefinementDoc> for RefinementConfig {
    fn from(d: RefinementDoc) -> Self {
        RefinementConfig {
            min_angle_deg: d.min_angle_deg,
            max_iterations: d.max_iterations,
            tolerance: d.tolerance,
            min_edge_length: d.min_edge_length,
        }
    }
}

/// The document a caller hands to the CLI: vertices to add, constraints
/// to lock in, and whether to refine the result before writing it out.
#[derive(Serialize, Deserialize, Debug)]
pub struct MeshDocument {
    #[serde(default = "new_uuid")]
    pub id: Uuid,

    pub name: String,

    #[serde(default = "now")]
    pub date: String,

    #[serde(default = "default_spacing")]
    pub nominal_point_spacing: f64,

    #[serde(default)]
    pub vertex_merger_rule: VertexMergerRule,

    pub vertices: Vec<VertexSpec>,

    #[serde(default)]
    pub constraints: Vec<ConstraintDoc>,

    #[serde(default)]
    pub refinement: Option<RefinementDoc>,

    #[serde(default)]
    pub restore_conformity: bool,

    #[serde(default)]
    pub refine: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TriangleDoc {
    pub v1: usize,
    pub v2: usize,
    pub v3: usize,
}

impl TriangleDoc {
    pub fn new(v1: usize, v2: usize, v3: usize) -> Self {
        TriangleDoc { v1, v2, v3 }
    }
}

/// The document the CLI writes out: the resolved coordinates (one entry
/// per live `VertexId`, merger groups counted once) and the triangles
/// indexing into it.
#[derive(Serialize, Deserialize, Debug)]
pub struct TriangulationData {
    #[serde(default = "new_uuid")]
    pub id: Uuid,

    pub name: String,

    #[serde(default = "now")]
    pub date: String,

    pub coordinates: Vec<Point>,

    pub triangles: Vec<TriangleDoc>,

    /// Mirrors [`Mesh::degeneracy_count`]: a non-fatal diagnostic, not a
    /// measure of failure.
    pub degeneracy_count: u64,
}

impl TriangulationData {
    /// Builds the output document from a finished mesh: a vertex-index
    /// map built once from the mesh's own iteration order, then every
    /// triangle's corners looked up through it.
    pub fn from_mesh(name: &str, mesh: &Mesh) -> Self {
        let mut index_of: HashMap<VertexId, usize> = HashMap::new();
        let mut coordinates = Vec::with_capacity(mesh.vertex_count());
        for (id, coord, z) in mesh.vertices() {
            index_of.insert(id, coordinates.len());
            coordinates.push(Point {
                x: coord.x,
                y: coord.y,
                z,
            });
        }

        let triangles = mesh
            .triangles()
            .into_iter()
            .map(|t| {
                TriangleDoc::new(
                    index_of[&t.a],
                    index_of[&t.b],
                    index_of[&t.c],
                )
            })
            .collect();

        TriangulationData {
            id: new_uuid(),
            name: name.to_string(),
            date: now(),
            coordinates,
            triangles,
            degeneracy_count: mesh.degeneracy_count(),
        }
    }
}
