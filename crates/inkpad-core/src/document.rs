//! The canonical document: ordered layers plus a stroke map.

use crate::bounds::Bounds;
use crate::layer::{Layer, LayerId};
use crate::stroke::{Stroke, StrokeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Snapshot deserialization errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The canonical drawing state. Invariant: every id in any layer's
/// `stroke_ids` exists exactly once across all layers and in `strokes`,
/// and each stroke's `layer_id` names its owning layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Layers in paint order, back to front. Never empty.
    pub layers: Vec<Layer>,
    /// All strokes, keyed by id.
    pub strokes: HashMap<StrokeId, Stroke>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with the single default layer.
    pub fn new() -> Self {
        Self {
            layers: vec![Layer::new("Layer 1")],
            strokes: HashMap::new(),
        }
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn stroke(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.get(&id)
    }

    /// Member strokes of a layer in paint order. Empty for unknown layers.
    pub fn strokes_by_layer(&self, layer_id: LayerId) -> Vec<&Stroke> {
        let Some(layer) = self.layer(layer_id) else {
            return Vec::new();
        };
        layer
            .stroke_ids
            .iter()
            .filter_map(|id| self.strokes.get(id))
            .collect()
    }

    /// Recompute a layer's cached bounds by reduction over its members.
    /// Leaves `None` for an empty layer.
    pub fn recompute_layer_bounds(&mut self, layer_id: LayerId) {
        let Some(index) = self.layer_index(layer_id) else {
            return;
        };
        let bounds = self.layers[index]
            .stroke_ids
            .iter()
            .filter_map(|id| self.strokes.get(id).and_then(|s| s.bounds))
            .reduce(Bounds::merge);
        self.layers[index].bounds = bounds;
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to JSON with stroke points compressed into their codec
    /// string form.
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        let mut doc = self.clone();
        for stroke in doc.strokes.values_mut() {
            stroke.compress_points();
        }
        serde_json::to_string(&doc)
    }

    /// Deserialize a snapshot and normalize it: codec strings become
    /// explicit points, missing caches are recomputed, and dangling
    /// references are dropped. The caller must rebuild the spatial index
    /// before serving any query.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let mut doc: Self = serde_json::from_str(json)?;
        doc.normalize();
        Ok(doc)
    }

    /// Repair a freshly loaded snapshot into invariant-holding shape.
    fn normalize(&mut self) {
        if self.layers.is_empty() {
            self.layers.push(Layer::new("Layer 1"));
        }

        for stroke in self.strokes.values_mut() {
            stroke.expand_points();
            if stroke.bounds.is_none() {
                stroke.recompute_bounds();
            }
        }

        // Claim each stroke for the first layer listing it; drop the rest.
        let mut owned: HashMap<StrokeId, LayerId> = HashMap::new();
        for layer in &mut self.layers {
            let layer_id = layer.id;
            layer.stroke_ids.retain(|sid| {
                self.strokes.contains_key(sid) && owned.insert(*sid, layer_id).is_none()
            });
        }
        self.strokes.retain(|id, stroke| match owned.get(id) {
            Some(layer_id) => {
                stroke.layer_id = *layer_id;
                true
            }
            None => false,
        });

        let layer_ids: Vec<LayerId> = self.layers.iter().map(|l| l.id).collect();
        for id in layer_ids {
            self.recompute_layer_bounds(id);
        }
    }
}
