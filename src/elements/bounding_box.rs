//! Axis-aligned bounding box, incrementally maintained by the mesh as
//! vertices are added.

use crate::geom::Coord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Coord,
    pub max: Coord,
}

impl BoundingBox {
    pub fn from_point(p: Coord) -> Self {
        BoundingBox { min: p, max: p }
    }

    pub fn expand(&mut self, p: Coord) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }
}
