#![deny(unsafe_code)]
//! Renders growth segments onto any 2D surface.
//!
//! The host only has to provide the five [`Surface`] primitives. Each segment
//! becomes one `begin_path / move_to / line_to / stroke` sequence, issued in
//! the order the segments arrive so later strokes overlay earlier ones at
//! shared endpoints.

pub mod recording;
#[cfg(feature = "raster")]
pub mod raster;
pub mod style;

use glam::DVec2;
use lichtenberg_core::GridPos;
use lichtenberg_growth::Segment;

pub use recording::{DrawOp, RecordingSurface};
#[cfg(feature = "raster")]
pub use raster::RasterSurface;
pub use style::{Stroke, StrokeStyle};

/// Minimal drawing capability required from a host surface.
///
/// Coordinates are in grid units; a surface maps them to its own pixels.
pub trait Surface {
    fn begin_path(&mut self);
    fn move_to(&mut self, p: DVec2);
    fn line_to(&mut self, p: DVec2);
    /// Strokes the current path.
    fn stroke(&mut self, stroke: &Stroke);
    /// Erases everything drawn so far.
    fn clear(&mut self);
}

/// Centre of a grid cell in surface coordinates.
pub fn cell_centre(pos: GridPos) -> DVec2 {
    DVec2::new(pos.x as f64 + 0.5, pos.y as f64 + 0.5)
}

/// Incremental segment renderer.
#[derive(Debug, Clone)]
pub struct Renderer {
    style: StrokeStyle,
    drawn: usize,
}

impl Renderer {
    pub fn new(style: StrokeStyle) -> Self {
        Self { style, drawn: 0 }
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Segments drawn since construction or the last [`reset`](Self::reset).
    pub fn drawn(&self) -> usize {
        self.drawn
    }

    /// Draws every segment in order and returns how many were drawn.
    pub fn render<S, I>(&mut self, surface: &mut S, segments: I) -> usize
    where
        S: Surface + ?Sized,
        I: IntoIterator<Item = Segment>,
    {
        let before = self.drawn;
        for segment in segments {
            self.draw(surface, &segment);
        }
        self.drawn - before
    }

    pub fn draw<S: Surface + ?Sized>(&mut self, surface: &mut S, segment: &Segment) {
        surface.begin_path();
        surface.move_to(cell_centre(segment.from));
        surface.line_to(cell_centre(segment.to));
        surface.stroke(&self.style.stroke_at(segment.depth));
        self.drawn += 1;
    }

    /// Clears the surface and forgets how much has been drawn.
    pub fn reset<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        tracing::trace!(drawn = self.drawn, "renderer reset");
        surface.clear();
        self.drawn = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lichtenberg_core::{Domain, Srgb};
    use lichtenberg_growth::{GrowthConfig, RunState};

    fn segment(from: (usize, usize), to: (usize, usize), depth: usize) -> Segment {
        Segment {
            from: GridPos::new(from.0, from.1),
            to: GridPos::new(to.0, to.1),
            parent: 0,
            node: 1,
            depth,
        }
    }

    fn style() -> StrokeStyle {
        StrokeStyle {
            stroke_color: Srgb::WHITE,
            stroke_width_at_root: 4.0,
            stroke_width_taper: 0.5,
            glow_radius: 0.0,
        }
    }

    #[test]
    fn one_path_per_segment_at_cell_centres() {
        let mut surface = RecordingSurface::default();
        let mut renderer = Renderer::new(style());
        renderer.render(&mut surface, [segment((0, 0), (1, 1), 0)]);
        let stroke = style().stroke_at(0);
        assert_eq!(
            surface.ops(),
            &[
                DrawOp::BeginPath,
                DrawOp::MoveTo(DVec2::new(0.5, 0.5)),
                DrawOp::LineTo(DVec2::new(1.5, 1.5)),
                DrawOp::Stroke(stroke),
            ]
        );
    }

    #[test]
    fn depth_three_is_drawn_at_tapered_width() {
        let mut surface = RecordingSurface::default();
        let mut renderer = Renderer::new(style());
        renderer.render(&mut surface, [segment((2, 2), (2, 3), 3)]);
        let widths: Vec<f64> = surface.strokes().map(|s| s.width).collect();
        assert_eq!(widths, vec![0.5]);
    }

    #[test]
    fn segments_are_drawn_in_received_order() {
        let segments = [
            segment((5, 5), (5, 6), 0),
            segment((5, 6), (6, 7), 1),
            segment((5, 5), (4, 4), 0),
        ];
        let mut surface = RecordingSurface::default();
        let mut renderer = Renderer::new(style());
        assert_eq!(renderer.render(&mut surface, segments), 3);
        let ends: Vec<DVec2> = surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect();
        let expected: Vec<DVec2> = segments.iter().map(|s| cell_centre(s.to)).collect();
        assert_eq!(ends, expected);
    }

    #[test]
    fn reset_clears_surface_and_counter() {
        let mut surface = RecordingSurface::default();
        let mut renderer = Renderer::new(style());
        renderer.render(&mut surface, [segment((0, 0), (0, 1), 0)]);
        assert_eq!(renderer.drawn(), 1);
        renderer.reset(&mut surface);
        assert_eq!(renderer.drawn(), 0);
        assert_eq!(surface, RecordingSurface::default());
    }

    #[test]
    fn renders_a_live_run_incrementally() {
        let config = GrowthConfig {
            max_nodes: 60,
            step_budget_per_call: 16,
            ..GrowthConfig::default()
        };
        let mut run =
            RunState::start(Domain::new(32, 32).unwrap(), GridPos::new(16, 16), config).unwrap();
        let mut surface = RecordingSurface::default();
        let mut renderer = Renderer::new(StrokeStyle::default());
        while !run.is_terminated() {
            renderer.render(&mut surface, run.step().unwrap());
        }
        assert_eq!(renderer.drawn(), 59);
        assert_eq!(surface.strokes().count(), 59);

        // Replay from the retained tree redraws the same figure.
        let mut replay = RecordingSurface::default();
        Renderer::new(StrokeStyle::default()).render(&mut replay, run.segments());
        assert_eq!(replay.ops(), surface.ops());
    }
}
