//! Append-only vertex store. Coordinates never move once assigned an
//! id; a vertex found coincident with an existing one is absorbed into
//! a [`VertexMergerGroup`] at the existing id rather than given a new
//! one.

use crate::config::VertexMergerRule;
use crate::elements::vertex::{VertexId, VertexMergerGroup, VertexRecord, VertexSlot};
use crate::geom::{distance, Coord};

#[derive(Debug, Clone, Default)]
pub struct VertexStore {
    slots: Vec<VertexSlot>,
}

impl VertexStore {
    pub fn new() -> Self {
        VertexStore::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Appends a brand-new vertex, unconditionally. Callers looking for
    /// coincidence-merging should use `insert_or_merge`.
    pub fn push(&mut self, record: VertexRecord) -> VertexId {
        let id = VertexId(self.slots.len() as u32);
        self.slots.push(VertexSlot::Single(record));
        id
    }

    pub fn get(&self, id: VertexId) -> &VertexSlot {
        assert!(!id.is_ghost(), "cannot dereference the ghost vertex id");
        &self.slots[id.index()]
    }

    pub fn get_mut(&mut self, id: VertexId) -> &mut VertexSlot {
        assert!(!id.is_ghost(), "cannot dereference the ghost vertex id");
        &mut self.slots[id.index()]
    }

    pub fn coord(&self, id: VertexId) -> Coord {
        self.get(id).coord()
    }

    /// Finds the existing vertex (if any) within `tolerance` of `p`.
    /// Linear scan: adequate for the sizes this engine targets; a spatial
    /// index would only pay for itself well past the point where the
    /// walker's own cost dominates.
    pub fn find_within_tolerance(&self, p: Coord, tolerance: f64) -> Option<VertexId> {
        self.slots
            .iter()
            .enumerate()
            .find(|(_, slot)| distance(slot.coord(), p) <= tolerance)
            .map(|(i, _)| VertexId(i as u32))
    }

    /// Inserts `record`, merging into the coincident vertex at `existing`
    /// if one is given. Returns `(id, true)` if a new slot was created,
    /// `(id, false)` if the record was absorbed into an existing group.
    pub fn insert_or_merge(
        &mut self,
        record: VertexRecord,
        existing: Option<VertexId>,
        rule: VertexMergerRule,
    ) -> (VertexId, bool) {
        match existing {
            None => (self.push(record), true),
            Some(id) => {
                let slot = self.get_mut(id);
                match slot {
                    VertexSlot::Single(first) => {
                        let mut group = VertexMergerGroup::new(*first, rule);
                        group.absorb(record);
                        *slot = VertexSlot::Merged(group);
                    }
                    VertexSlot::Merged(group) => {
                        group.absorb(record);
                    }
                }
                (id, false)
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &VertexSlot)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (VertexId(i as u32), s))
    }

    pub fn nearest(&self, p: Coord) -> Option<VertexId> {
        self.slots
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                distance(a.coord(), p)
                    .partial_cmp(&distance(b.coord(), p))
                    .unwrap()
            })
            .map(|(i, _)| VertexId(i as u32))
    }
}
