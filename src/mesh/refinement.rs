//! Ruppert refinement: alternately splits encroached constrained
//! segments and inserts circumcenters of skinny triangles until the
//! mesh meets a minimum-angle quality bound or a hard iteration cap is
//! reached.

use std::collections::{HashSet, VecDeque};

use rand::SeedableRng;

use crate::config::RefinementConfig;
use crate::elements::vertex::{VertexId, VertexRecord};
use crate::error::{TinError, TinResult};
use crate::geom::{angle_at, circumcircle, distance, midpoint, Coord, Thresholds};
use crate::mesh::cavity::restore_delaunay;
use crate::mesh::handle::EdgeId;
use crate::mesh::insertion;
use crate::mesh::pool::EdgePool;
use crate::mesh::triangle::{iter_triangles, TriangleView};
use crate::mesh::vertex_store::VertexStore;
use crate::mesh::walker;

/// Bound on the anti-oscillation "recently inserted" set: a single
/// last-vertex check is not enough to stop all cycling.
const RECENT_WINDOW: usize = 8;

/// A fixed seed keeps refinement deterministic for a given mesh and
/// configuration, matching the walker's own determinism contract.
const WALK_SEED: u64 = 0x5eed;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefinementReport {
    pub iterations: u32,
    pub segments_split: u32,
    pub circumcenters_inserted: u32,
}

pub fn refine(
    pool: &mut EdgePool,
    vstore: &mut VertexStore,
    thresholds: &Thresholds,
    cfg: &RefinementConfig,
) -> TinResult<RefinementReport> {
    let min_angle_rad = cfg.min_angle_deg.to_radians();
    let mut report = RefinementReport::default();
    let mut recent: VecDeque<Coord> = VecDeque::with_capacity(RECENT_WINDOW);

    for _ in 0..cfg.max_iterations {
        report.iterations += 1;

        if let Some(e) = find_encroached_segment(pool, vstore, thresholds) {
            let a = vstore.coord(pool.get(e).origin);
            let b = vstore.coord(pool.get(e.dual()).origin);
            if distance(a, b) < cfg.min_edge_length {
                continue;
            }
            let m = split_segment(pool, vstore, thresholds, e);
            push_recent(&mut recent, vstore.coord(m));
            report.segments_split += 1;
            continue;
        }

        let skinny = match find_skinny_triangle(pool, vstore, min_angle_rad) {
            Some(t) => t,
            None => return Ok(report),
        };

        let (a, b, c) = (
            vstore.coord(skinny.a),
            vstore.coord(skinny.b),
            vstore.coord(skinny.c),
        );
        let (center, _radius) = match circumcircle(a, b, c) {
            Some(cc) => cc,
            None => continue,
        };

        if recent
            .iter()
            .any(|p| distance(*p, center) < thresholds.vertex_tolerance)
        {
            // Anti-oscillation: refuse to insert a point that nearly
            // repeats a recent one. This does not resolve every cycling
            // input; it only breaks the common case.
            continue;
        }

        if let Some(enc) = encroached_segment_for_point(pool, vstore, thresholds, center) {
            let m = split_segment(pool, vstore, thresholds, enc);
            push_recent(&mut recent, vstore.coord(m));
            report.segments_split += 1;
            continue;
        }

        let z = (vstore.get(skinny.a).z() + vstore.get(skinny.b).z() + vstore.get(skinny.c).z())
            / 3.0;
        insert_circumcenter(pool, vstore, thresholds, center, z);
        push_recent(&mut recent, center);
        report.circumcenters_inserted += 1;
    }

    Err(TinError::NotConverged {
        iterations: report.iterations,
    })
}

fn push_recent(recent: &mut VecDeque<Coord>, p: Coord) {
    if recent.len() == RECENT_WINDOW {
        recent.pop_front();
    }
    recent.push_back(p);
}

fn diametral_circle(pool: &EdgePool, vstore: &VertexStore, e: EdgeId) -> (Coord, f64) {
    let a = vstore.coord(pool.get(e).origin);
    let b = vstore.coord(pool.get(e.dual()).origin);
    (midpoint(a, b), distance(a, b) / 2.0)
}

fn constrained_base_edges(pool: &EdgePool) -> impl Iterator<Item = EdgeId> + '_ {
    let mut seen = HashSet::new();
    pool.iter().filter_map(move |(id, edge)| {
        if !edge.flags.is_constrained() || !seen.insert(id.base_index()) {
            return None;
        }
        if pool.get(id).origin.is_ghost() || pool.get(id.dual()).origin.is_ghost() {
            return None;
        }
        Some(id)
    })
}

fn find_encroached_segment(
    pool: &EdgePool,
    vstore: &VertexStore,
    thresholds: &Thresholds,
) -> Option<EdgeId> {
    constrained_base_edges(pool).find(|&e| {
        let (center, radius) = diametral_circle(pool, vstore, e);
        let a = pool.get(e).origin;
        let b = pool.get(e.dual()).origin;
        vstore.iter().any(|(id, slot)| {
            id != a && id != b && distance(slot.coord(), center) < radius - thresholds.vertex_tolerance
        })
    })
}

fn encroached_segment_for_point(
    pool: &EdgePool,
    vstore: &VertexStore,
    thresholds: &Thresholds,
    p: Coord,
) -> Option<EdgeId> {
    constrained_base_edges(pool).find(|&e| {
        let (center, radius) = diametral_circle(pool, vstore, e);
        distance(p, center) < radius - thresholds.vertex_tolerance
    })
}

fn triangle_min_angle(vstore: &VertexStore, t: &TriangleView) -> f64 {
    let (a, b, c) = (vstore.coord(t.a), vstore.coord(t.b), vstore.coord(t.c));
    [angle_at(b, a, c), angle_at(a, b, c), angle_at(a, c, b)]
        .into_iter()
        .flatten()
        .fold(f64::INFINITY, f64::min)
}

fn find_skinny_triangle(
    pool: &EdgePool,
    vstore: &VertexStore,
    min_angle_rad: f64,
) -> Option<TriangleView> {
    iter_triangles(pool)
        .filter(|t| !t.is_ghost())
        .find(|t| triangle_min_angle(vstore, t) < min_angle_rad)
}

/// Splits the constrained edge `e` at its midpoint and restores
/// Delaunay-ness on the four untouched outer edges (the two new halves
/// of `e` stay constrained and are never flipped).
fn split_segment(
    pool: &mut EdgePool,
    vstore: &mut VertexStore,
    thresholds: &Thresholds,
    e: EdgeId,
) -> VertexId {
    let a = vstore.coord(pool.get(e).origin);
    let b = vstore.coord(pool.get(e.dual()).origin);
    let za = vstore.get(pool.get(e).origin).z();
    let zb = vstore.get(pool.get(e.dual()).origin).z();
    let mid = midpoint(a, b);
    let m = vstore.push(VertexRecord::synthetic(mid.x, mid.y, (za + zb) / 2.0));
    let outer = insertion::split_edge(pool, e, m);
    restore_delaunay(pool, vstore, thresholds, outer.to_vec());
    m
}

/// Locates `p`'s enclosing triangle from an arbitrary live edge and runs
/// the ordinary Bowyer-Watson insertion + legalization, respecting
/// constraints (circumcenters never displace a constrained boundary).
fn insert_circumcenter(
    pool: &mut EdgePool,
    vstore: &mut VertexStore,
    thresholds: &Thresholds,
    p: Coord,
    z: f64,
) {
    let start = pool
        .iter()
        .find(|(id, e)| e.forward != *id)
        .map(|(id, _)| id)
        .expect("mesh must be bootstrapped before refinement");
    let mut rng = rand::rngs::StdRng::seed_from_u64(WALK_SEED);
    let enclosing = walker::locate(pool, vstore, thresholds, start, p, &mut rng);
    let v = vstore.push(VertexRecord::synthetic(p.x, p.y, z));
    let (_pivot, seeds) = insertion::insert_into_triangle(pool, enclosing, v);
    insertion::legalize(pool, vstore, thresholds, v, seeds, true);
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
    fn refine_terminates_on_already_well_shaped_triangle() {
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(1.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(0.0, 1.0, 0.0, 2));
        bootstrap(&mut pool, &vstore, &[a, b, c], &thresholds()).unwrap();

        let cfg = RefinementConfig {
            min_angle_deg: 20.0,
            max_iterations: 50,
            tolerance: 1e-9,
            min_edge_length: 1e-9,
        };
        let report = refine(&mut pool, &mut vstore, &thresholds(), &cfg).unwrap();
        // The right isoceles triangle has a 45/45/90 split: already
        // above a 20 degree bound, nothing to do.
        assert_eq!(report.circumcenters_inserted, 0);
        assert_eq!(report.segments_split, 0);
    }

    #[test]
    fn refine_splits_skinny_triangle_until_quality_met() {
        let mut pool = EdgePool::new();
        let mut vstore = VertexStore::new();
        let a = vstore.push(VertexRecord::new(0.0, 0.0, 0.0, 0));
        let b = vstore.push(VertexRecord::new(10.0, 0.0, 0.0, 1));
        let c = vstore.push(VertexRecord::new(5.0, 0.5, 0.0, 2));
        bootstrap(&mut pool, &vstore, &[a, b, c], &thresholds()).unwrap();

        let cfg = RefinementConfig {
            min_angle_deg: 20.0,
            max_iterations: 5000,
            tolerance: 1e-9,
            min_edge_length: 1e-6,
        };
        let report = refine(&mut pool, &mut vstore, &thresholds(), &cfg).unwrap();
        assert!(report.circumcenters_inserted > 0 || report.segments_split > 0);

        let min_angle_rad = cfg.min_angle_deg.to_radians();
        for t in iter_triangles(&pool).filter(|t| !t.is_ghost()) {
            assert!(triangle_min_angle(&vstore, &t) >= min_angle_rad - 1e-6);
        }
    }
}
