//! Inkpad Core
//!
//! State/data engine behind the Inkpad drawing surface: the canonical
//! document (layers + vector strokes), transactional mutation with full
//! undo/redo, a spatial index for viewport culling over the unbounded
//! canvas, and a compact binary encoding for stroke geometry. Brush
//! engine, input handling, rendering and transport live elsewhere.

pub mod bounds;
pub mod camera;
pub mod codec;
pub mod document;
pub mod engine;
pub mod history;
pub mod layer;
pub mod spatial;
pub mod stroke;

pub use bounds::Bounds;
pub use camera::Camera;
pub use document::{Document, SnapshotError};
pub use engine::{CanvasEngine, EngineStats};
pub use history::{HistoryEntry, MAX_HISTORY, Patch};
pub use layer::{Layer, LayerId};
pub use spatial::{IndexStats, SpatialIndex};
pub use stroke::{Stroke, StrokeId, StrokePoint, ToolKind};
