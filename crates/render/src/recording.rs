//! In-memory surface that logs draw calls.

use glam::DVec2;
use serde::Serialize;

use crate::{Stroke, Surface};

/// One recorded surface call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    BeginPath,
    MoveTo(DVec2),
    LineTo(DVec2),
    Stroke(Stroke),
}

/// A [`Surface`] that keeps the ordered list of calls made on it.
///
/// `clear` empties the log, so the log always describes what is currently
/// visible and a cleared surface equals a fresh one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Stroke(s) => Some(s),
            _ => None,
        })
    }

    /// Stroked polylines as `(points, stroke)` pairs, in draw order.
    pub fn paths(&self) -> Vec<(Vec<DVec2>, Stroke)> {
        let mut paths = Vec::new();
        let mut current = Vec::new();
        for op in &self.ops {
            match op {
                DrawOp::BeginPath => current.clear(),
                DrawOp::MoveTo(p) | DrawOp::LineTo(p) => current.push(*p),
                DrawOp::Stroke(s) => paths.push((current.clone(), *s)),
            }
        }
        paths
    }

    /// The stroked lines as JSON, one `{from, to, width}` object per line.
    pub fn to_json(&self) -> serde_json::Value {
        #[derive(Serialize)]
        struct Line {
            from: [f64; 2],
            to: [f64; 2],
            width: f64,
        }

        let lines: Vec<Line> = self
            .paths()
            .into_iter()
            .flat_map(|(points, stroke)| {
                points
                    .windows(2)
                    .map(|w| Line {
                        from: w[0].to_array(),
                        to: w[1].to_array(),
                        width: stroke.width,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        serde_json::json!(lines)
    }
}

impl Surface for RecordingSurface {
    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, p: DVec2) {
        self.ops.push(DrawOp::MoveTo(p));
    }

    fn line_to(&mut self, p: DVec2) {
        self.ops.push(DrawOp::LineTo(p));
    }

    fn stroke(&mut self, stroke: &Stroke) {
        self.ops.push(DrawOp::Stroke(*stroke));
    }

    fn clear(&mut self) {
        self.ops.clear();
    }
}
