//! Spatial index over stroke bounds for viewport culling.
//!
//! A bounding-box tree answers "which strokes intersect this rectangle"
//! sub-linearly, partitioned by owning layer in the results so hidden
//! layers can be skipped wholesale. The tree has no delete-by-key, so an
//! id→entry side table shadows it; the two always hold the same id set.
//!
//! The index is never a source of truth: every entry must be derivable
//! from the current document, and the engine rebuilds it wholesale after
//! undo/redo and snapshot rehydration.

use crate::bounds::Bounds;
use crate::layer::LayerId;
use crate::stroke::{Stroke, StrokeId};
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

/// One indexed stroke: its id, owning layer, and bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub id: StrokeId,
    pub layer_id: LayerId,
    min: [f64; 2],
    max: [f64; 2],
}

impl IndexEntry {
    fn new(id: StrokeId, layer_id: LayerId, bounds: Bounds) -> Self {
        Self {
            id,
            layer_id,
            min: [bounds.x, bounds.y],
            max: [bounds.x + bounds.width, bounds.y + bounds.height],
        }
    }
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Index statistics for debug surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub indexed: usize,
}

/// Bounding-box tree plus id side table.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<IndexEntry>,
    entries: HashMap<StrokeId, IndexEntry>,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("indexed", &self.entries.len())
            .finish()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Callers must remove an existing id before
    /// re-inserting it with new bounds.
    pub fn insert(&mut self, id: StrokeId, layer_id: LayerId, bounds: Bounds) {
        let entry = IndexEntry::new(id, layer_id, bounds);
        self.tree.insert(entry.clone());
        self.entries.insert(id, entry);
    }

    /// Remove an entry. No-op if the id is not indexed.
    pub fn remove(&mut self, id: StrokeId) {
        if let Some(entry) = self.entries.remove(&id) {
            self.tree.remove(&entry);
        }
    }

    pub fn remove_batch(&mut self, ids: &[StrokeId]) {
        for id in ids {
            self.remove(*id);
        }
    }

    /// Clear and bulk-load every stroke with defined bounds in one pass.
    /// Bulk loading builds a packed tree, far cheaper than sequential
    /// inserts. Used after undo/redo and after snapshot rehydration.
    pub fn build_from_strokes(&mut self, strokes: &HashMap<StrokeId, Stroke>) {
        self.entries.clear();
        let mut items = Vec::with_capacity(strokes.len());
        for (id, stroke) in strokes {
            if let Some(bounds) = stroke.bounds {
                let entry = IndexEntry::new(*id, stroke.layer_id, bounds);
                self.entries.insert(*id, entry.clone());
                items.push(entry);
            }
        }
        self.tree = RTree::bulk_load(items);
    }

    /// Ids of every entry whose box intersects the viewport, grouped by
    /// owning layer. Touching edges count as intersecting. Group and
    /// member order is unspecified here; callers impose paint order.
    pub fn query(&self, viewport: Bounds) -> HashMap<LayerId, Vec<StrokeId>> {
        let envelope = AABB::from_corners(
            [viewport.x, viewport.y],
            [viewport.x + viewport.width, viewport.y + viewport.height],
        );

        let mut grouped: HashMap<LayerId, Vec<StrokeId>> = HashMap::new();
        for entry in self.tree.locate_in_envelope_intersecting(&envelope) {
            grouped.entry(entry.layer_id).or_default().push(entry.id);
        }
        grouped
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: StrokeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            indexed: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{StrokePoint, ToolKind};
    use uuid::Uuid;

    #[test]
    fn test_insert_and_query() {
        let mut index = SpatialIndex::new();
        let layer_id = Uuid::new_v4();
        let id = Uuid::new_v4();
        index.insert(id, layer_id, Bounds::new(0.0, 0.0, 10.0, 10.0));

        let grouped = index.query(Bounds::new(5.0, 5.0, 100.0, 100.0));
        assert_eq!(grouped[&layer_id], vec![id]);

        let grouped = index.query(Bounds::new(50.0, 50.0, 10.0, 10.0));
        assert!(grouped.is_empty());
    }

    #[test]
    fn test_touching_edge_is_returned() {
        let mut index = SpatialIndex::new();
        let layer_id = Uuid::new_v4();
        let id = Uuid::new_v4();
        index.insert(id, layer_id, Bounds::new(0.0, 0.0, 10.0, 10.0));

        let grouped = index.query(Bounds::new(10.0, 10.0, 5.0, 5.0));
        assert_eq!(grouped[&layer_id], vec![id]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut index = SpatialIndex::new();
        let id = Uuid::new_v4();
        index.insert(id, Uuid::new_v4(), Bounds::new(0.0, 0.0, 1.0, 1.0));

        index.remove(id);
        assert!(index.is_empty());
        // Absent id: no-op.
        index.remove(id);
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_batch() {
        let mut index = SpatialIndex::new();
        let layer_id = Uuid::new_v4();
        let ids: Vec<StrokeId> = (0..4).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            index.insert(*id, layer_id, Bounds::new(i as f64 * 20.0, 0.0, 10.0, 10.0));
        }

        index.remove_batch(&ids[..2]);
        assert_eq!(index.len(), 2);
        assert!(!index.contains(ids[0]));
        assert!(index.contains(ids[3]));
    }

    #[test]
    fn test_build_from_strokes() {
        let layer_id = Uuid::new_v4();
        let mut strokes = HashMap::new();
        for i in 0..8 {
            let stroke = Stroke::new(
                layer_id,
                vec![StrokePoint::new(i as f64 * 50.0, 0.0, 1.0)],
                "#000000",
                2.0,
                1.0,
                ToolKind::Pen,
            );
            strokes.insert(stroke.id, stroke);
        }
        // One stroke with no bounds must never be indexed.
        let mut unbounded = Stroke::new(layer_id, vec![], "#000000", 2.0, 1.0, ToolKind::Pen);
        unbounded.bounds = None;
        let unbounded_id = unbounded.id;
        strokes.insert(unbounded_id, unbounded);

        let mut index = SpatialIndex::new();
        index.insert(Uuid::new_v4(), layer_id, Bounds::new(0.0, 0.0, 1.0, 1.0));
        index.build_from_strokes(&strokes);

        assert_eq!(index.len(), 8);
        assert!(!index.contains(unbounded_id));

        // Fully-enclosing viewport returns everything indexed.
        let grouped = index.query(Bounds::new(-1000.0, -1000.0, 5000.0, 5000.0));
        assert_eq!(grouped[&layer_id].len(), 8);
    }

    #[test]
    fn test_query_groups_by_layer() {
        let mut index = SpatialIndex::new();
        let layer_a = Uuid::new_v4();
        let layer_b = Uuid::new_v4();
        let a1 = Uuid::new_v4();
        let a2 = Uuid::new_v4();
        let b1 = Uuid::new_v4();
        index.insert(a1, layer_a, Bounds::new(0.0, 0.0, 10.0, 10.0));
        index.insert(a2, layer_a, Bounds::new(20.0, 0.0, 10.0, 10.0));
        index.insert(b1, layer_b, Bounds::new(0.0, 20.0, 10.0, 10.0));

        let grouped = index.query(Bounds::new(-5.0, -5.0, 100.0, 100.0));
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&layer_a].len(), 2);
        assert_eq!(grouped[&layer_b], vec![b1]);
    }

    #[test]
    fn test_clear() {
        let mut index = SpatialIndex::new();
        index.insert(Uuid::new_v4(), Uuid::new_v4(), Bounds::new(0.0, 0.0, 1.0, 1.0));
        index.clear();
        assert!(index.is_empty());
        assert!(index.query(Bounds::new(-10.0, -10.0, 100.0, 100.0)).is_empty());
    }

    #[test]
    fn test_degenerate_viewport() {
        let mut index = SpatialIndex::new();
        let layer_id = Uuid::new_v4();
        let id = Uuid::new_v4();
        index.insert(id, layer_id, Bounds::new(0.0, 0.0, 10.0, 10.0));

        // Zero-size viewport inside the box still hits it.
        let grouped = index.query(Bounds::new(5.0, 5.0, 0.0, 0.0));
        assert_eq!(grouped[&layer_id], vec![id]);
    }
}
