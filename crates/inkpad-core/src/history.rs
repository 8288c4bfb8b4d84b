//! Patch-based undo/redo over document snapshots.
//!
//! Every transaction is recorded as a structural diff between the previous
//! and next snapshot: a forward patch list that replays it and an inverse
//! list that exactly restores the prior state. Patches carry whole entries
//! (stroke, layer, layer order), so applying a list is order-insensitive
//! except for `SetLayerOrder`, which the diff always emits last.

use crate::document::Document;
use crate::layer::{Layer, LayerId};
use crate::stroke::{Stroke, StrokeId};
use serde::{Deserialize, Serialize};

/// Maximum number of history entries kept. Exceeding the cap silently
/// drops the oldest entry, which becomes permanently non-undoable.
pub const MAX_HISTORY: usize = 50;

/// A minimal structural edit over the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Patch {
    PutStroke { id: StrokeId, stroke: Box<Stroke> },
    RemoveStroke { id: StrokeId },
    PutLayer { id: LayerId, layer: Box<Layer> },
    RemoveLayer { id: LayerId },
    SetLayerOrder { order: Vec<LayerId> },
}

/// An atomic, invertible transaction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub forward: Vec<Patch>,
    pub inverse: Vec<Patch>,
}

impl HistoryEntry {
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Diff two snapshots into a forward/inverse patch pair such that applying
/// `forward` to `old` yields `new`, and applying `inverse` to `new` yields
/// `old` exactly.
pub fn diff(old: &Document, new: &Document) -> HistoryEntry {
    let mut forward = Vec::new();
    let mut inverse = Vec::new();

    for (id, stroke) in &new.strokes {
        match old.strokes.get(id) {
            Some(prev) if prev == stroke => {}
            Some(prev) => {
                forward.push(Patch::PutStroke {
                    id: *id,
                    stroke: Box::new(stroke.clone()),
                });
                inverse.push(Patch::PutStroke {
                    id: *id,
                    stroke: Box::new(prev.clone()),
                });
            }
            None => {
                forward.push(Patch::PutStroke {
                    id: *id,
                    stroke: Box::new(stroke.clone()),
                });
                inverse.push(Patch::RemoveStroke { id: *id });
            }
        }
    }
    for (id, stroke) in &old.strokes {
        if !new.strokes.contains_key(id) {
            forward.push(Patch::RemoveStroke { id: *id });
            inverse.push(Patch::PutStroke {
                id: *id,
                stroke: Box::new(stroke.clone()),
            });
        }
    }

    for layer in &new.layers {
        match old.layer(layer.id) {
            Some(prev) if prev == layer => {}
            Some(prev) => {
                forward.push(Patch::PutLayer {
                    id: layer.id,
                    layer: Box::new(layer.clone()),
                });
                inverse.push(Patch::PutLayer {
                    id: layer.id,
                    layer: Box::new(prev.clone()),
                });
            }
            None => {
                forward.push(Patch::PutLayer {
                    id: layer.id,
                    layer: Box::new(layer.clone()),
                });
                inverse.push(Patch::RemoveLayer { id: layer.id });
            }
        }
    }
    for layer in &old.layers {
        if new.layer(layer.id).is_none() {
            forward.push(Patch::RemoveLayer { id: layer.id });
            inverse.push(Patch::PutLayer {
                id: layer.id,
                layer: Box::new(layer.clone()),
            });
        }
    }

    let old_order: Vec<LayerId> = old.layers.iter().map(|l| l.id).collect();
    let new_order: Vec<LayerId> = new.layers.iter().map(|l| l.id).collect();
    if old_order != new_order {
        forward.push(Patch::SetLayerOrder { order: new_order });
        inverse.push(Patch::SetLayerOrder { order: old_order });
    }

    HistoryEntry { forward, inverse }
}

/// Apply a patch list to a document. Unknown references are ignored.
pub fn apply(doc: &mut Document, patches: &[Patch]) {
    for patch in patches {
        match patch {
            Patch::PutStroke { id, stroke } => {
                doc.strokes.insert(*id, (**stroke).clone());
            }
            Patch::RemoveStroke { id } => {
                doc.strokes.remove(id);
            }
            Patch::PutLayer { id, layer } => match doc.layer_index(*id) {
                Some(index) => doc.layers[index] = (**layer).clone(),
                None => doc.layers.push((**layer).clone()),
            },
            Patch::RemoveLayer { id } => {
                doc.layers.retain(|l| l.id != *id);
            }
            Patch::SetLayerOrder { order } => {
                let mut remaining = std::mem::take(&mut doc.layers);
                for id in order {
                    if let Some(index) = remaining.iter().position(|l| l.id == *id) {
                        doc.layers.push(remaining.remove(index));
                    }
                }
                // Layers the order list missed keep their relative order.
                doc.layers.append(&mut remaining);
            }
        }
    }
}

/// Capped past/future stacks of transaction records.
#[derive(Debug, Default)]
pub struct History {
    past: Vec<HistoryEntry>,
    future: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh transaction. Any new edit invalidates redo.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.future.clear();
        self.past.push(entry);
        if self.past.len() > MAX_HISTORY {
            self.past.remove(0);
        }
    }

    pub fn pop_past(&mut self) -> Option<HistoryEntry> {
        self.past.pop()
    }

    pub fn pop_future(&mut self) -> Option<HistoryEntry> {
        self.future.pop()
    }

    pub fn push_past(&mut self, entry: HistoryEntry) {
        self.past.push(entry);
    }

    pub fn push_future(&mut self, entry: HistoryEntry) {
        self.future.push(entry);
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn depth(&self) -> (usize, usize) {
        (self.past.len(), self.future.len())
    }
}
