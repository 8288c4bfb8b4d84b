//! Stroke entities: finished ink geometry committed to the document.

use crate::bounds::Bounds;
use crate::codec;
use crate::layer::LayerId;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Unique, stable stroke identifier.
pub type StrokeId = Uuid;

/// A single input sample in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Pen pressure in [0, 1].
    pub pressure: f64,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64, pressure: f64) -> Self {
        Self { x, y, pressure }
    }
}

/// Which tool produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Pan,
    Select,
}

/// A committed stroke. The brush engine hands these over fully formed;
/// afterwards they change only through engine operations, which keep the
/// cached bounds and the spatial index in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: StrokeId,
    /// Ordered point sequence; may be empty.
    #[serde(default)]
    pub points: Vec<StrokePoint>,
    /// Codec-compressed form of `points`. Snapshots may carry either
    /// representation; explicit points win when both are present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_data: Option<String>,
    pub layer_id: LayerId,
    pub color: String,
    pub width: f64,
    pub opacity: f64,
    pub tool: ToolKind,
    pub timestamp: u64,
    /// Derived, cached. `expand(of_points(points), width * 2)`.
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

impl Stroke {
    /// Create a stroke from finished geometry.
    pub fn new(
        layer_id: LayerId,
        points: Vec<StrokePoint>,
        color: impl Into<String>,
        width: f64,
        opacity: f64,
        tool: ToolKind,
    ) -> Self {
        let mut stroke = Self {
            id: Uuid::new_v4(),
            points,
            path_data: None,
            layer_id,
            color: color.into(),
            width,
            opacity,
            tool,
            timestamp: now_millis(),
            bounds: None,
        };
        stroke.recompute_bounds();
        stroke
    }

    /// Recompute the cached bounds from the current points. The padding
    /// accounts for rendered stroke width so culling never under-estimates
    /// the visual extent.
    pub fn recompute_bounds(&mut self) {
        self.bounds = Some(Bounds::of_points(&self.points).expand(self.width * 2.0));
    }

    /// Compress the point list into its codec string, dropping the explicit
    /// points. Used when writing compact snapshots.
    pub fn compress_points(&mut self) {
        self.path_data = Some(codec::encode_points(&self.points));
        self.points.clear();
    }

    /// Restore explicit points from the codec string if none are present.
    pub fn expand_points(&mut self) {
        if self.points.is_empty() {
            if let Some(data) = self.path_data.take() {
                self.points = codec::decode_points(&data);
            }
        }
        self.path_data = None;
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stroke_has_bounds() {
        let stroke = Stroke::new(
            Uuid::new_v4(),
            vec![StrokePoint::new(0.0, 0.0, 0.5), StrokePoint::new(10.0, 0.0, 0.5)],
            "#000000",
            2.0,
            1.0,
            ToolKind::Pen,
        );

        let bounds = stroke.bounds.unwrap();
        assert!((bounds.x - -4.0).abs() < f64::EPSILON);
        assert!((bounds.y - -4.0).abs() < f64::EPSILON);
        assert!((bounds.width - 18.0).abs() < f64::EPSILON);
        assert!((bounds.height - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_compress_and_expand_points() {
        let mut stroke = Stroke::new(
            Uuid::new_v4(),
            vec![StrokePoint::new(1.0, 2.0, 0.5), StrokePoint::new(3.0, 4.0, 0.6)],
            "#ff0000",
            2.0,
            1.0,
            ToolKind::Pen,
        );

        stroke.compress_points();
        assert!(stroke.points.is_empty());
        assert!(stroke.path_data.is_some());

        stroke.expand_points();
        assert_eq!(stroke.points.len(), 2);
        assert!(stroke.path_data.is_none());
        assert!((stroke.points[1].x - 3.0).abs() < 0.01);
    }

    #[test]
    fn test_explicit_points_win_over_path_data() {
        let mut stroke = Stroke::new(
            Uuid::new_v4(),
            vec![StrokePoint::new(1.0, 1.0, 1.0)],
            "#000000",
            2.0,
            1.0,
            ToolKind::Pen,
        );
        stroke.path_data = Some(codec::encode_points(&[StrokePoint::new(9.0, 9.0, 0.9)]));

        stroke.expand_points();
        assert_eq!(stroke.points.len(), 1);
        assert!((stroke.points[0].x - 1.0).abs() < f64::EPSILON);
    }
}
