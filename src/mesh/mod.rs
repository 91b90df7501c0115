//! The mesh: the single mutable object tying the edge pool, vertex
//! store, and every algorithm module together behind the public API of
//! an incremental constrained Delaunay triangulation engine.

pub mod bootstrap;
pub mod cavity;
pub mod constraints;
pub mod handle;
pub mod insertion;
pub mod integrity;
pub mod navigator;
pub mod pool;
pub mod progress;
pub mod refinement;
pub mod removal;
pub mod triangle;
pub mod vertex_store;
pub mod walker;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::MeshConfig;
use crate::elements::bounding_box::BoundingBox;
use crate::elements::constraint::{Constraint, ConstraintId, ConstraintKind, ConstraintSpec};
use crate::elements::vertex::{VertexId, VertexRecord, VertexSlot};
use crate::error::{TinError, TinResult};
use crate::geom::{distance, midpoint, Coord, Sign, Thresholds};

use self::handle::EdgeId;
use self::navigator::Navigator;
use self::pool::EdgePool;
use self::progress::{NullMonitor, ProgressMonitor};
use self::vertex_store::VertexStore;

/// Deterministic seed for the walker's tie-breaking RNG: insertion order
/// and coordinates fully determine the result, so the walk itself must
/// not depend on wall-clock state.
const WALK_SEED: u64 = 0x6a7e_10ab;

/// Mutation lock, modeled as a small state machine rather than two
/// independent booleans since the three states are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lock {
    Open,
    ConstraintsApplied,
    Disposed,
}

/// An incremental, in-memory 2D constrained Delaunay triangulation with
/// Ruppert refinement. See the crate's module docs for the concurrency
/// contract: mutation is single-threaded; reads may run concurrently
/// once a build settles.
pub struct Mesh {
    pool: EdgePool,
    vstore: VertexStore,
    config: MeshConfig,
    thresholds: Thresholds,
    /// An edge known to be live, used to seed the walker; `None` before
    /// bootstrap succeeds.
    anchor: Option<EdgeId>,
    /// Vertices offered before bootstrap has enough non-degenerate
    /// points to start from.
    pending: Vec<VertexId>,
    bounds: Option<BoundingBox>,
    lock: Lock,
    constraints: Vec<Constraint>,
    next_constraint_id: u16,
    degeneracy_count: u64,
    rng: StdRng,
}

impl Mesh {
    /// Builds an empty mesh calibrated from one characteristic length:
    /// the nominal point spacing is the only environmental input.
    pub fn new(nominal_point_spacing: f64) -> TinResult<Self> {
        Self::with_config(MeshConfig::new(nominal_point_spacing)?)
    }

    pub fn with_config(config: MeshConfig) -> TinResult<Self> {
        config.validate()?;
        let thresholds = Thresholds::from(&config);
        Ok(Mesh {
            pool: EdgePool::new(),
            vstore: VertexStore::new(),
            config,
            thresholds,
            anchor: None,
            pending: Vec::new(),
            bounds: None,
            lock: Lock::Open,
            constraints: Vec::new(),
            next_constraint_id: 0,
            degeneracy_count: 0,
            rng: StdRng::seed_from_u64(WALK_SEED),
        })
    }

    fn ensure_mutable(&self) -> TinResult<()> {
        if self.lock == Lock::Disposed {
            return Err(TinError::InvalidState("mesh has been disposed".into()));
        }
        Ok(())
    }

    fn enclosing_vertices(&self, e: EdgeId) -> [VertexId; 3] {
        let e2 = self.pool.get(e).forward;
        let e3 = self.pool.get(e2).forward;
        [
            self.pool.get(e).origin,
            self.pool.get(e2).origin,
            self.pool.get(e3).origin,
        ]
    }

    fn find_by_caller_index(&self, caller_index: i64) -> Option<VertexId> {
        self.vstore.iter().find_map(|(id, slot)| match slot {
            VertexSlot::Single(v) if v.caller_index == caller_index => Some(id),
            VertexSlot::Merged(g) if g.members.iter().any(|&(ci, _)| ci == caller_index) => {
                Some(id)
            }
            _ => None,
        })
    }

    fn incident_edge(&self, v: VertexId) -> TinResult<EdgeId> {
        self.pool
            .iter()
            .find(|(_, e)| e.origin == v)
            .map(|(id, _)| id)
            .ok_or_else(|| TinError::InvalidState(format!("vertex {v} is not wired into the mesh")))
    }

    fn expand_bounds(&mut self, p: Coord) {
        match &mut self.bounds {
            Some(bb) => bb.expand(p),
            None => self.bounds = Some(BoundingBox::from_point(p)),
        }
    }

    /// Inserts a vertex already present in the store (no merge check:
    /// the caller is responsible for having resolved coincidence first),
    /// walking from the cached anchor and re-anchoring on the pivot.
    fn insert_existing_vertex(&mut self, id: VertexId) {
        let p = self.vstore.coord(id);
        let anchor = self.anchor.expect("bootstrap must have succeeded");
        let enclosing = walker::locate(&self.pool, &self.vstore, &self.thresholds, anchor, p, &mut self.rng);
        let (pivot, seeds) = insertion::insert_into_triangle(&mut self.pool, enclosing, id);
        insertion::legalize(
            &mut self.pool,
            &self.vstore,
            &self.thresholds,
            id,
            seeds,
            self.lock == Lock::ConstraintsApplied,
        );
        self.anchor = Some(pivot.dual());
    }

    /// The ordinary (post-bootstrap) insertion path: locate, merge-check
    /// against the enclosing triangle's three corners, else split and
    /// legalize. Returns the resolved id and whether it is genuinely new
    /// (`false` if absorbed into an existing merger group).
    fn insert_vertex(&mut self, record: VertexRecord) -> (VertexId, bool) {
        let p = record.coord();
        let anchor = self.anchor.expect("insert_vertex called before bootstrap");
        let enclosing = walker::locate(&self.pool, &self.vstore, &self.thresholds, anchor, p, &mut self.rng);

        for v in self.enclosing_vertices(enclosing) {
            if v.is_ghost() {
                continue;
            }
            if distance(self.vstore.coord(v), p) <= self.thresholds.vertex_tolerance {
                trace!("merged vertex at ({}, {}) into {v}", p.x, p.y);
                let (id, _) = self
                    .vstore
                    .insert_or_merge(record, Some(v), self.config.vertex_merger_rule);
                return (id, false);
            }
        }

        let id = self.vstore.push(record);
        let (pivot, seeds) = insertion::insert_into_triangle(&mut self.pool, enclosing, id);
        let flips = insertion::legalize(
            &mut self.pool,
            &self.vstore,
            &self.thresholds,
            id,
            seeds,
            self.lock == Lock::ConstraintsApplied,
        );
        trace!("inserted vertex {id} with {flips} legalizing flips");
        self.anchor = Some(pivot.dual());
        (id, true)
    }

    /// Offers one vertex to the mesh. Returns `Ok(true)` if a genuinely
    /// new vertex was created this call (including bootstrap completing),
    /// `Ok(false)` if it was absorbed into an existing merger group or the
    /// mesh is still collecting a bootstrap triple.
    pub fn add(&mut self, x: f64, y: f64, z: f64, caller_index: i64) -> TinResult<bool> {
        self.ensure_mutable()?;
        if !x.is_finite() || !y.is_finite() || !z.is_finite() {
            return Err(TinError::InvalidArgument(format!(
                "vertex ({x}, {y}, {z}) has a non-finite coordinate"
            )));
        }

        let record = VertexRecord::new(x, y, z, caller_index);
        self.expand_bounds(record.coord());

        if self.anchor.is_none() {
            if let Some(existing) = self
                .vstore
                .find_within_tolerance(record.coord(), self.thresholds.vertex_tolerance)
            {
                self.vstore
                    .insert_or_merge(record, Some(existing), self.config.vertex_merger_rule);
                return Ok(false);
            }
            let id = self.vstore.push(record);
            self.pending.push(id);
            if self.pending.len() < 3 {
                return Ok(false);
            }
            self.anchor = bootstrap::bootstrap(&mut self.pool, &self.vstore, &self.pending, &self.thresholds);
            let anchor = match self.anchor {
                Some(a) => a,
                None => return Ok(false),
            };
            debug!("mesh bootstrapped from {} pending vertices", self.pending.len());
            let used = self.enclosing_vertices(anchor);
            let leftover: Vec<VertexId> = self
                .pending
                .drain(..)
                .filter(|id| !used.contains(id))
                .collect();
            for id in leftover {
                self.insert_existing_vertex(id);
            }
            return Ok(true);
        }

        Ok(self.insert_vertex(record).1)
    }

    /// Offers many vertices, polling `monitor` at each vertex boundary —
    /// cancellation points only between vertices, never inside a cavity
    /// fill. Returns `Ok(true)` if any vertex was genuinely new.
    pub fn add_many(
        &mut self,
        vertices: impl IntoIterator<Item = (f64, f64, f64, i64)>,
        monitor: Option<&dyn ProgressMonitor>,
    ) -> TinResult<bool> {
        let monitor = monitor.unwrap_or(&NullMonitor);
        let items: Vec<_> = vertices.into_iter().collect();
        let total = items.len();
        let mut any_new = false;
        for (done, (x, y, z, caller_index)) in items.into_iter().enumerate() {
            if monitor.is_cancelled() {
                warn!("add_many cancelled after {done}/{total} vertices");
                break;
            }
            if self.add(x, y, z, caller_index)? {
                any_new = true;
            }
            monitor.report(done + 1, total);
        }
        Ok(any_new)
    }

    /// Removes the vertex with the given caller index. Forbidden once
    /// constraints have been added. Returns `Ok(false)` if no such
    /// vertex exists; removing one member of a merger group leaves the
    /// others in place.
    pub fn remove(&mut self, caller_index: i64) -> TinResult<bool> {
        self.ensure_mutable()?;
        if self.lock == Lock::ConstraintsApplied {
            return Err(TinError::InvalidState(
                "remove is forbidden once constraints have been added".into(),
            ));
        }
        let id = match self.find_by_caller_index(caller_index) {
            Some(id) => id,
            None => return Ok(false),
        };

        if let VertexSlot::Merged(group) = self.vstore.get_mut(id) {
            if group.len() > 1 {
                group.members.retain(|&(ci, _)| ci != caller_index);
                return Ok(true);
            }
        }

        // A pending (pre-bootstrap) vertex has no incident edge yet.
        let incident = match self.incident_edge(id) {
            Ok(e) => e,
            Err(_) => {
                self.pending.retain(|&p| p != id);
                return Ok(true);
            }
        };

        let new_edges = removal::remove_vertex(&mut self.pool, &self.vstore, &self.thresholds, id, incident);
        debug!("removed vertex {id}, {} new diagonals", new_edges.len());
        if let Some(anchor) = self.anchor {
            if self.pool.try_get(anchor).is_none() {
                self.anchor = new_edges.first().copied().or_else(|| {
                    self.pool
                        .iter()
                        .find(|(_, e)| !e.origin.is_ghost())
                        .map(|(id, _)| id)
                });
            }
        }
        Ok(true)
    }

    fn resolve_constraint_vertex(&mut self, p: Coord) -> VertexId {
        if let Some(existing) = self.vstore.find_within_tolerance(p, self.thresholds.vertex_tolerance) {
            return existing;
        }
        let mut record = VertexRecord::new(p.x, p.y, 0.0, -1);
        record.status.constraint_origin = true;
        self.insert_vertex(record).0
    }

    /// Routes `(v0, v1)` through the mesh, transparently chasing any
    /// re-routing point the routing step reports (an intermediate ring
    /// vertex lying exactly on the constraint line).
    fn route_chasing_reroutes(
        &mut self,
        mut v0: VertexId,
        v1: VertexId,
        constraint_id: ConstraintId,
        region: bool,
    ) -> TinResult<EdgeId> {
        loop {
            let incident = self.incident_edge(v0)?;
            let outcome = constraints::route_segment(
                &mut self.pool,
                &self.vstore,
                &self.thresholds,
                incident,
                v0,
                v1,
                constraint_id,
                region,
            );
            match outcome.reroute_through {
                Some(vm) => v0 = vm,
                None => return Ok(outcome.constrained_edge),
            }
        }
    }

    /// Adds constraints, region constraints first so they take
    /// precedence on any edge shared with a line constraint. Locks the
    /// mesh against `remove`.
    pub fn add_constraints(&mut self, specs: Vec<ConstraintSpec>, restore_conformity: bool) -> TinResult<()> {
        self.ensure_mutable()?;
        if self.anchor.is_none() {
            return Err(TinError::InvalidState(
                "cannot add constraints before the mesh is bootstrapped".into(),
            ));
        }
        if self.lock == Lock::ConstraintsApplied {
            return Err(TinError::InvalidState(
                "add_constraints may only be called once per mesh".into(),
            ));
        }

        let mut ordered = specs;
        ordered.sort_by_key(|s| !matches!(s.kind, ConstraintKind::Region));

        for spec in ordered {
            if self.constraints.len() as u32 >= self.config.max_constraints {
                return Err(TinError::InvalidArgument(format!(
                    "constraint count would exceed max_constraints ({})",
                    self.config.max_constraints
                )));
            }
            let constraint_id = ConstraintId(self.next_constraint_id);
            self.next_constraint_id += 1;

            let vertices: Vec<VertexId> = spec
                .polyline
                .points
                .iter()
                .map(|&p| self.resolve_constraint_vertex(p))
                .collect();
            let is_region = matches!(spec.kind, ConstraintKind::Region);
            let constraint = Constraint {
                id: constraint_id,
                kind: spec.kind,
                vertices,
            };

            let mut first_edge: Option<EdgeId> = None;
            for (v0, v1) in constraint.segments() {
                let e = self.route_chasing_reroutes(v0, v1, constraint_id, is_region)?;
                first_edge.get_or_insert(e);
            }

            if is_region {
                if let Some(border) = first_edge {
                    let seed = self.pool.get(border).forward;
                    if !self.pool.get(seed).flags.region_border {
                        let marked = constraints::flood_fill_region(&mut self.pool, seed, constraint_id);
                        debug!("region constraint {} flood-filled {marked} interior edges", constraint_id.0);
                    }
                }
            }

            self.constraints.push(constraint);
        }

        self.lock = Lock::ConstraintsApplied;
        if restore_conformity {
            self.restore_conformity();
        }
        Ok(())
    }

    /// Iterates every live edge once, flipping any non-Delaunay
    /// unconstrained edge and splitting any non-Delaunay constrained one
    /// at its midpoint; newly split constrained vertices propagate region
    /// membership to their fresh interior spokes via a small flood fill.
    fn restore_conformity(&mut self) -> usize {
        let mut worklist: Vec<EdgeId> = self
            .pool
            .iter()
            .filter(|(id, _)| id.side() == 0)
            .map(|(id, _)| id)
            .collect();
        let mut splits = 0usize;
        let mut guard = 0usize;

        while let Some(e) = worklist.pop() {
            guard += 1;
            if guard > 1_000_000 {
                break;
            }
            if self.pool.try_get(e).is_none() {
                continue;
            }
            let dual = e.dual();
            let a = self.pool.get(e).origin;
            let b = self.pool.get(dual).origin;
            if a.is_ghost() || b.is_ghost() {
                continue;
            }
            let bv = self.pool.get(e).forward;
            let va = self.pool.get(bv).forward;
            let ad = self.pool.get(dual).forward;
            let db = self.pool.get(ad).forward;
            let v = self.pool.get(va).origin;
            let d = self.pool.get(db).origin;
            if v.is_ghost() || d.is_ghost() {
                continue;
            }

            let value = crate::geom::in_circle(
                self.vstore.coord(a),
                self.vstore.coord(b),
                self.vstore.coord(v),
                self.vstore.coord(d),
                self.thresholds.in_circle,
            );
            if value == Sign::Zero {
                self.degeneracy_count += 1;
            }
            if value != Sign::Positive {
                continue;
            }

            let flags = self.pool.get(e).flags;
            if flags.is_constrained() {
                let mid = midpoint(self.vstore.coord(a), self.vstore.coord(b));
                let za = self.vstore.get(a).z();
                let zb = self.vstore.get(b).z();
                let m = self.vstore.push(VertexRecord::synthetic(mid.x, mid.y, (za + zb) / 2.0));
                let outer = insertion::split_edge(&mut self.pool, e, m);
                worklist.extend(outer);
                splits += 1;

                if flags.region_border {
                    // `e` keeps its id as the a->m half of the split pair,
                    // and split_edge wires its forward link straight to
                    // the fresh interior diagonal a->m->x, never to the
                    // other border half: a deterministic, always-interior
                    // seed for the flood fill.
                    let seed = self.pool.get(e).forward;
                    if let Some(constraint_id) = flags.constraint_id {
                        constraints::flood_fill_region(&mut self.pool, seed, constraint_id);
                    }
                }
            } else {
                let (ad2, db2) = insertion::flip(&mut self.pool, e);
                worklist.push(ad2);
                worklist.push(db2);
            }
        }
        splits
    }

    /// Splits an arbitrary interior edge, inserting a synthetic vertex
    /// at its midpoint with the caller-supplied `z`. Optionally runs a
    /// full conformity restoration pass afterward.
    pub fn split_edge(&mut self, e: EdgeId, z_split: f64, restore_conformity: bool) -> TinResult<VertexId> {
        self.ensure_mutable()?;
        let de = self
            .pool
            .try_get(e)
            .ok_or_else(|| TinError::InvalidArgument(format!("edge {e} is not a live handle")))?;
        let a = de.origin;
        let b = self.pool.get(e.dual()).origin;
        if a.is_ghost() || b.is_ghost() {
            return Err(TinError::InvalidArgument(format!(
                "edge {e} borders the exterior and cannot be split"
            )));
        }

        let mid = midpoint(self.vstore.coord(a), self.vstore.coord(b));
        let m = self.vstore.push(VertexRecord::synthetic(mid.x, mid.y, z_split));
        let outer = insertion::split_edge(&mut self.pool, e, m);
        cavity::restore_delaunay(&mut self.pool, &self.vstore, &self.thresholds, outer.to_vec());

        if restore_conformity {
            self.restore_conformity();
        }
        Ok(m)
    }

    /// Runs Ruppert refinement to the configured minimum angle. See
    /// [`refinement::refine`] for the termination and anti-oscillation
    /// policy. There is no `refine_once`: only this batch entry point is
    /// public.
    pub fn refine(&mut self) -> TinResult<refinement::RefinementReport> {
        self.ensure_mutable()?;
        if self.anchor.is_none() {
            return Err(TinError::InvalidState(
                "cannot refine a mesh before it is bootstrapped".into(),
            ));
        }
        let report = refinement::refine(&mut self.pool, &mut self.vstore, &self.thresholds, &self.config.refinement)?;
        if let Some(anchor) = self.anchor {
            if self.pool.try_get(anchor).is_none() {
                self.anchor = self.pool.iter().find(|(_, e)| !e.origin.is_ghost()).map(|(id, _)| id);
            }
        }
        Ok(report)
    }

    /// Releases all mesh content but keeps the calibrated configuration,
    /// ready to bootstrap a fresh triangulation.
    pub fn clear(&mut self) {
        self.pool = EdgePool::new();
        self.vstore = VertexStore::new();
        self.anchor = None;
        self.pending.clear();
        self.bounds = None;
        self.lock = Lock::Open;
        self.constraints.clear();
        self.next_constraint_id = 0;
        self.degeneracy_count = 0;
    }

    /// Releases all mesh content and forbids any further mutation.
    pub fn dispose(&mut self) {
        self.clear();
        self.lock = Lock::Disposed;
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.vstore.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, Coord, f64)> + '_ {
        self.vstore.iter().map(|(id, slot)| (id, slot.coord(), slot.z()))
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.pool.iter().map(|(id, _)| id)
    }

    /// The convex hull boundary, in CCW order, or empty if unbootstrapped.
    /// Walks the ghost-edge ring the way [`integrity::check`] verifies it:
    /// `ghost_to_next = e.forward` (G -> next vertex), then
    /// `next_edge = ghost_to_next.dual()` (next vertex -> G).
    pub fn perimeter(&self) -> Vec<Coord> {
        let start = self
            .pool
            .iter()
            .find(|(_, e)| !e.origin.is_ghost() && self.pool.get(e.forward).origin.is_ghost());
        let start = match start {
            Some((id, _)) => id,
            None => return Vec::new(),
        };

        let mut hull = Vec::new();
        let mut e = start;
        let first_vertex = self.pool.get(e).origin;
        hull.push(self.vstore.coord(first_vertex));

        loop {
            let ghost_to_next = self.pool.get(e).forward;
            let next_edge = ghost_to_next.dual();
            let next_vertex = self.pool.get(next_edge).origin;
            if next_vertex == first_vertex {
                break;
            }
            hull.push(self.vstore.coord(next_vertex));
            e = next_edge;
            if hull.len() > self.pool.count() * 2 + 8 {
                break;
            }
        }
        hull
    }

    pub fn triangles(&self) -> Vec<triangle::TriangleView> {
        triangle::iter_triangles(&self.pool).filter(|t| !t.is_ghost()).collect()
    }

    pub fn count_triangles(&self) -> usize {
        triangle::iter_triangles(&self.pool).filter(|t| !t.is_ghost()).count()
    }

    /// A read-only coordinate-query view, or `None` before bootstrap.
    pub fn navigator(&self) -> Option<Navigator<'_>> {
        let anchor = self.anchor?;
        Some(Navigator::new(
            &self.pool,
            &self.vstore,
            &self.thresholds,
            anchor,
            StdRng::seed_from_u64(WALK_SEED),
        ))
    }

    pub fn integrity_check(&self) -> integrity::IntegrityReport {
        integrity::check(&self.pool, &self.vstore, &self.thresholds)
    }

    /// Count of critical in-circle tests whose extended-precision
    /// fallback still resolved to exactly zero: a non-fatal diagnostic,
    /// never an error.
    pub fn degeneracy_count(&self) -> u64 {
        self.degeneracy_count
    }
}
