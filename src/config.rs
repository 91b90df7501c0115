//! Tunables that calibrate numerical tolerances and refinement behavior.

use crate::error::{TinError, TinResult};

/// Reduction rule applied when several vertices merge into one
/// [`crate::elements::vertex::VertexMergerGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VertexMergerRule {
    Mean,
    Min,
    Max,
    First,
    Last,
    MedianZ,
}

impl Default for VertexMergerRule {
    fn default() -> Self {
        VertexMergerRule::First
    }
}

/// Hard ceiling on the number of constraints a mesh may carry; a constraint
/// index is packed into 13 bits alongside edge flags.
pub const MAX_CONSTRAINTS: u32 = 8190;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RefinementConfig {
    pub min_angle_deg: f64,
    pub max_iterations: u32,
    pub tolerance: f64,
    pub min_edge_length: f64,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        RefinementConfig {
            min_angle_deg: 20.0,
            max_iterations: 5000,
            tolerance: 1e-9,
            min_edge_length: 1e-6,
        }
    }
}

impl RefinementConfig {
    pub fn validate(&self) -> TinResult<()> {
        if !(self.min_angle_deg > 0.0 && self.min_angle_deg < 60.0) {
            return Err(TinError::InvalidArgument(format!(
                "refinement.min_angle_deg must lie in (0, 60), got {}",
                self.min_angle_deg
            )));
        }
        if self.max_iterations == 0 {
            return Err(TinError::InvalidArgument(
                "refinement.max_iterations must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Calibrates every tolerance in the mesh from one characteristic length.
///
/// Thresholds follow the scaling given in the geometry primitives design:
/// `inCircleThreshold ~ s^4 * eps`, `halfPlaneThreshold ~ s^2 * eps`,
/// `vertexTolerance ~ s * sqrt(eps)`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MeshConfig {
    pub nominal_point_spacing: f64,
    pub vertex_merger_rule: VertexMergerRule,
    pub max_constraints: u32,
    pub refinement: RefinementConfig,
}

impl Default for MeshConfig {
    fn default() -> Self {
        MeshConfig {
            nominal_point_spacing: 1.0,
            vertex_merger_rule: VertexMergerRule::default(),
            max_constraints: MAX_CONSTRAINTS,
            refinement: RefinementConfig::default(),
        }
    }
}

impl MeshConfig {
    pub fn new(nominal_point_spacing: f64) -> TinResult<Self> {
        let mut cfg = MeshConfig {
            nominal_point_spacing,
            ..MeshConfig::default()
        };
        cfg.validate()?;
        cfg.max_constraints = cfg.max_constraints.min(MAX_CONSTRAINTS);
        Ok(cfg)
    }

    pub fn validate(&self) -> TinResult<()> {
        if !(self.nominal_point_spacing.is_finite() && self.nominal_point_spacing > 0.0) {
            return Err(TinError::InvalidArgument(format!(
                "nominal_point_spacing must be finite and positive, got {}",
                self.nominal_point_spacing
            )));
        }
        if self.max_constraints > MAX_CONSTRAINTS {
            return Err(TinError::InvalidArgument(format!(
                "max_constraints must not exceed {}",
                MAX_CONSTRAINTS
            )));
        }
        self.refinement.validate()
    }

    pub fn vertex_tolerance(&self) -> f64 {
        self.nominal_point_spacing * f64::EPSILON.sqrt()
    }

    pub fn half_plane_threshold(&self) -> f64 {
        self.nominal_point_spacing.powi(2) * f64::EPSILON
    }

    pub fn in_circle_threshold(&self) -> f64 {
        self.nominal_point_spacing.powi(4) * f64::EPSILON
    }

    pub fn delaunay_threshold(&self) -> f64 {
        self.in_circle_threshold()
    }
}
