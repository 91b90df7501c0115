//! Bundles the tolerances derived from `MeshConfig` so predicate call
//! sites don't have to recompute them on every call.

use crate::config::MeshConfig;

#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub vertex_tolerance: f64,
    pub half_plane: f64,
    pub in_circle: f64,
    pub delaunay: f64,
}

impl From<&MeshConfig> for Thresholds {
    fn from(cfg: &MeshConfig) -> Self {
        Thresholds {
            vertex_tolerance: cfg.vertex_tolerance(),
            half_plane: cfg.half_plane_threshold(),
            in_circle: cfg.in_circle_threshold(),
            delaunay: cfg.delaunay_threshold(),
        }
    }
}
