//! Layers: ordered groups of strokes with shared visibility and opacity.

use crate::bounds::Bounds;
use crate::stroke::StrokeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique, stable layer identifier.
pub type LayerId = Uuid;

/// A document layer. `stroke_ids` defines paint order within the layer,
/// back to front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    /// Layer opacity in [0, 1].
    pub opacity: f64,
    /// Member strokes in paint order.
    #[serde(default)]
    pub stroke_ids: Vec<StrokeId>,
    /// Union of member stroke bounds; `None` iff the layer is empty.
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

impl Layer {
    /// Create a new empty, visible, unlocked layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            locked: false,
            opacity: 1.0,
            stroke_ids: Vec::new(),
            bounds: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stroke_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_layer_defaults() {
        let layer = Layer::new("Layer 1");
        assert!(layer.visible);
        assert!(!layer.locked);
        assert!((layer.opacity - 1.0).abs() < f64::EPSILON);
        assert!(layer.is_empty());
        assert!(layer.bounds.is_none());
    }
}
