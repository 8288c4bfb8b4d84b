//! The canvas engine: document, history, and spatial index behind one
//! transactional mutation mechanism.
//!
//! Hosts construct one engine per open document; there is no process-wide
//! singleton. Every mutation routes through `execute`, which applies the
//! change to a clone of the snapshot, diffs it into an invertible
//! transaction record, and keeps the spatial index synchronized before
//! control returns to the caller. Invalid references and rejected
//! invariants are silent no-ops; nothing here raises.

use crate::bounds::Bounds;
use crate::document::Document;
use crate::history::{self, History, Patch};
use crate::layer::{Layer, LayerId};
use crate::spatial::SpatialIndex;
use crate::stroke::{Stroke, StrokeId, StrokePoint};
use log::debug;
use uuid::Uuid;

/// Counters for debug surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Entries currently in the spatial index.
    pub indexed: usize,
    pub strokes: usize,
    pub layers: usize,
    /// Undoable / redoable transaction counts.
    pub past: usize,
    pub future: usize,
}

/// State engine for one open document.
#[derive(Debug, Default)]
pub struct CanvasEngine {
    doc: Document,
    history: History,
    index: SpatialIndex,
}

impl CanvasEngine {
    /// Create an engine over a fresh single-layer document.
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Create an engine over an existing document, building the index
    /// before any query can be served.
    pub fn with_document(doc: Document) -> Self {
        let mut index = SpatialIndex::new();
        index.build_from_strokes(&doc.strokes);
        Self {
            doc,
            history: History::new(),
            index,
        }
    }

    /// The current document snapshot. Persistence reads this.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Replace the document with a loaded snapshot, dropping history and
    /// rebuilding the index.
    pub fn load_document(&mut self, doc: Document) {
        self.doc = doc;
        self.history.clear();
        self.index.build_from_strokes(&self.doc.strokes);
    }

    /// Run one transaction: mutate a clone of the snapshot, diff, record,
    /// and synchronize the index. A mutation that changes nothing records
    /// no history entry.
    fn execute(&mut self, mutate: impl FnOnce(&mut Document)) {
        let mut next = self.doc.clone();
        mutate(&mut next);

        let entry = history::diff(&self.doc, &next);
        if entry.is_empty() {
            return;
        }

        self.sync_index(&entry.forward);
        self.doc = next;
        self.history.record(entry);
    }

    /// Incrementally mirror stroke-level edits into the index. Updates are
    /// remove-then-insert; strokes without bounds are left unindexed.
    fn sync_index(&mut self, forward: &[Patch]) {
        for patch in forward {
            match patch {
                Patch::PutStroke { id, stroke } => {
                    self.index.remove(*id);
                    if let Some(bounds) = stroke.bounds {
                        self.index.insert(*id, stroke.layer_id, bounds);
                    }
                }
                Patch::RemoveStroke { id } => self.index.remove(*id),
                Patch::PutLayer { .. } | Patch::RemoveLayer { .. } | Patch::SetLayerOrder { .. } => {}
            }
        }
    }

    // --- mutations -------------------------------------------------------

    /// Commit a finished stroke to its layer. No-op if the layer does not
    /// exist.
    pub fn add_stroke(&mut self, mut stroke: Stroke) {
        stroke.recompute_bounds();
        self.execute(move |doc| {
            let Some(layer) = doc.layer_mut(stroke.layer_id) else {
                debug!("add_stroke: unknown layer {}", stroke.layer_id);
                return;
            };
            layer.stroke_ids.push(stroke.id);
            // Incremental merge keeps layer bounds exact on insertion.
            layer.bounds = match (layer.bounds, stroke.bounds) {
                (Some(acc), Some(b)) => Some(acc.merge(b)),
                (acc, b) => acc.or(b),
            };
            doc.strokes.insert(stroke.id, stroke);
        });
    }

    /// Replace a stroke's geometry, recomputing its bounds and its layer's
    /// bounds. One atomic undo step per call.
    pub fn update_stroke_points(&mut self, id: StrokeId, points: Vec<StrokePoint>) {
        self.execute(move |doc| {
            let Some(stroke) = doc.strokes.get_mut(&id) else {
                debug!("update_stroke_points: unknown stroke {id}");
                return;
            };
            stroke.points = points;
            stroke.recompute_bounds();
            let layer_id = stroke.layer_id;
            doc.recompute_layer_bounds(layer_id);
        });
    }

    /// Delete strokes by id. Unknown ids are ignored.
    pub fn delete_strokes(&mut self, ids: &[StrokeId]) {
        if ids.is_empty() {
            return;
        }
        let ids = ids.to_vec();
        self.execute(move |doc| {
            let mut touched: Vec<LayerId> = Vec::new();
            for id in &ids {
                if let Some(stroke) = doc.strokes.remove(id) {
                    if !touched.contains(&stroke.layer_id) {
                        touched.push(stroke.layer_id);
                    }
                }
            }
            for layer in &mut doc.layers {
                layer.stroke_ids.retain(|sid| !ids.contains(sid));
            }
            for layer_id in touched {
                doc.recompute_layer_bounds(layer_id);
            }
        });
    }

    /// Append a new empty layer, returning its id.
    pub fn add_layer(&mut self, name: &str) -> LayerId {
        let layer = Layer::new(name);
        let id = layer.id;
        self.execute(move |doc| {
            doc.layers.push(layer);
        });
        id
    }

    /// Delete a layer and cascade-delete its strokes. Deleting the sole
    /// remaining layer is forbidden and ignored.
    pub fn delete_layer(&mut self, id: LayerId) {
        self.execute(move |doc| {
            if doc.layers.len() <= 1 {
                debug!("delete_layer: refusing to delete the last layer");
                return;
            }
            let Some(index) = doc.layer_index(id) else {
                debug!("delete_layer: unknown layer {id}");
                return;
            };
            let layer = doc.layers.remove(index);
            for sid in &layer.stroke_ids {
                doc.strokes.remove(sid);
            }
        });
    }

    pub fn toggle_layer_visibility(&mut self, id: LayerId) {
        self.execute(move |doc| {
            if let Some(layer) = doc.layer_mut(id) {
                layer.visible = !layer.visible;
            }
        });
    }

    pub fn toggle_layer_lock(&mut self, id: LayerId) {
        self.execute(move |doc| {
            if let Some(layer) = doc.layer_mut(id) {
                layer.locked = !layer.locked;
            }
        });
    }

    /// Set a layer's opacity, clamped to [0, 1].
    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f64) {
        self.execute(move |doc| {
            if let Some(layer) = doc.layer_mut(id) {
                layer.opacity = opacity.clamp(0.0, 1.0);
            }
        });
    }

    /// Rename a layer. Whitespace is trimmed; an empty result falls back
    /// to "Layer".
    pub fn rename_layer(&mut self, id: LayerId, name: &str) {
        let name = name.trim();
        let name = if name.is_empty() { "Layer" } else { name };
        let name = name.to_string();
        self.execute(move |doc| {
            if let Some(layer) = doc.layer_mut(id) {
                layer.name = name;
            }
        });
    }

    /// Deep-copy a layer and its strokes under fresh ids, inserting the
    /// copy directly above the source. Returns the new layer's id, or
    /// `None` if the source does not exist.
    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        if self.doc.layer(id).is_none() {
            debug!("duplicate_layer: unknown layer {id}");
            return None;
        }
        let new_layer_id = Uuid::new_v4();
        self.execute(move |doc| {
            let Some(index) = doc.layer_index(id) else {
                return;
            };
            let source = doc.layers[index].clone();

            let mut copies: Vec<Stroke> = Vec::with_capacity(source.stroke_ids.len());
            for sid in &source.stroke_ids {
                if let Some(stroke) = doc.strokes.get(sid) {
                    let mut copy = stroke.clone();
                    copy.id = Uuid::new_v4();
                    copy.layer_id = new_layer_id;
                    copies.push(copy);
                }
            }

            let copy = Layer {
                id: new_layer_id,
                name: format!("{} copy", source.name),
                stroke_ids: copies.iter().map(|s| s.id).collect(),
                ..source
            };
            doc.layers.insert(index + 1, copy);
            for stroke in copies {
                doc.strokes.insert(stroke.id, stroke);
            }
        });
        Some(new_layer_id)
    }

    /// Restore the initial single-layer document, dropping history and
    /// index contents.
    pub fn reset_document(&mut self) {
        self.doc = Document::new();
        self.history.clear();
        self.index.clear();
    }

    // --- history ---------------------------------------------------------

    /// Revert the newest transaction. Returns false if there is nothing to
    /// undo. The index is rebuilt from the restored snapshot, since
    /// patches can restructure arbitrarily.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.pop_past() else {
            return false;
        };
        history::apply(&mut self.doc, &entry.inverse);
        self.history.push_future(entry);
        self.index.build_from_strokes(&self.doc.strokes);
        true
    }

    /// Re-apply the most recently undone transaction. Returns false if
    /// there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.pop_future() else {
            return false;
        };
        history::apply(&mut self.doc, &entry.forward);
        self.history.push_past(entry);
        self.index.build_from_strokes(&self.doc.strokes);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drop both history stacks without touching the document.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // --- queries ---------------------------------------------------------

    /// Member strokes of a layer in paint order.
    pub fn get_strokes_by_layer(&self, layer_id: LayerId) -> Vec<&Stroke> {
        self.doc.strokes_by_layer(layer_id)
    }

    /// Ids of strokes intersecting the viewport, grouped by layer in paint
    /// order: groups follow document layer order, members follow the
    /// layer's stroke order. Callers skip groups for hidden layers.
    pub fn query_visible_strokes(&self, viewport: Bounds) -> Vec<(LayerId, Vec<StrokeId>)> {
        let mut grouped = self.index.query(viewport);
        let mut result = Vec::with_capacity(grouped.len());
        for layer in &self.doc.layers {
            if let Some(ids) = grouped.remove(&layer.id) {
                let ordered: Vec<StrokeId> = layer
                    .stroke_ids
                    .iter()
                    .copied()
                    .filter(|sid| ids.contains(sid))
                    .collect();
                result.push((layer.id, ordered));
            }
        }
        result
    }

    pub fn stats(&self) -> EngineStats {
        let (past, future) = self.history.depth();
        EngineStats {
            indexed: self.index.stats().indexed,
            strokes: self.doc.strokes.len(),
            layers: self.doc.layers.len(),
            past,
            future,
        }
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &SpatialIndex {
        &self.index
    }
}
