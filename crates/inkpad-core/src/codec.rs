//! Compact, lossy point-sequence codec for snapshot storage.
//!
//! The first point is stored at full precision as three little-endian
//! 32-bit floats (x, y, pressure). Every subsequent point is stored as the
//! delta from the previous *decoded* point, each component packed into an
//! IEEE half-float. Taking deltas against decoded values keeps quantization
//! error bounded per point instead of accumulating over the stroke. The
//! byte buffer is rendered as standard base64 text.
//!
//! Only the seed point survives exactly (~3 decimal digits elsewhere),
//! which is fine for already-rendered ink.

use crate::stroke::StrokePoint;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use half::f16;

/// Seed point: three f32s.
const HEADER_LEN: usize = 12;
/// Delta triple: three f16s.
const DELTA_LEN: usize = 6;

/// Encode a point sequence. Empty input encodes to an empty string.
pub fn encode_points(points: &[StrokePoint]) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };

    let mut buf = Vec::with_capacity(HEADER_LEN + (points.len() - 1) * DELTA_LEN);
    buf.extend_from_slice(&(first.x as f32).to_le_bytes());
    buf.extend_from_slice(&(first.y as f32).to_le_bytes());
    buf.extend_from_slice(&(first.pressure as f32).to_le_bytes());

    // Track what the decoder will reconstruct, not the raw input.
    let mut prev_x = f64::from(first.x as f32);
    let mut prev_y = f64::from(first.y as f32);
    let mut prev_p = f64::from(first.pressure as f32);

    for point in &points[1..] {
        let dx = f16::from_f64(point.x - prev_x);
        let dy = f16::from_f64(point.y - prev_y);
        let dp = f16::from_f64(point.pressure - prev_p);

        buf.extend_from_slice(&dx.to_le_bytes());
        buf.extend_from_slice(&dy.to_le_bytes());
        buf.extend_from_slice(&dp.to_le_bytes());

        prev_x += dx.to_f64();
        prev_y += dy.to_f64();
        prev_p += dp.to_f64();
    }

    STANDARD.encode(&buf)
}

/// Decode a point sequence. Malformed base64 or a buffer shorter than the
/// seed point decodes to an empty sequence; decoding never fails.
pub fn decode_points(data: &str) -> Vec<StrokePoint> {
    if data.is_empty() {
        return Vec::new();
    }

    let Ok(bytes) = STANDARD.decode(data) else {
        log::debug!("discarding malformed point data ({} chars)", data.len());
        return Vec::new();
    };
    if bytes.len() < HEADER_LEN {
        return Vec::new();
    }

    let read_f32 = |offset: usize| {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[offset..offset + 4]);
        f32::from_le_bytes(raw)
    };

    let mut x = f64::from(read_f32(0));
    let mut y = f64::from(read_f32(4));
    let mut pressure = f64::from(read_f32(8));

    let mut points = Vec::with_capacity(1 + (bytes.len() - HEADER_LEN) / DELTA_LEN);
    points.push(StrokePoint::new(x, y, pressure));

    for delta in bytes[HEADER_LEN..].chunks_exact(DELTA_LEN) {
        x += f16::from_le_bytes([delta[0], delta[1]]).to_f64();
        y += f16::from_le_bytes([delta[2], delta[3]]).to_f64();
        pressure += f16::from_le_bytes([delta[4], delta[5]]).to_f64();
        points.push(StrokePoint::new(x, y, pressure));
    }

    points
}
