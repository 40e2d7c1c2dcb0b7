//! CPU raster surface backed by an RGBA image.
//!
//! Feature-gated behind `raster` (default on) so the browser build does not
//! pull in `image` or `imageproc`. Strokes are stamped as filled discs along
//! each line. The glow is a few translucent wider rings drawn underneath;
//! each ring is rasterized into a mask first and blended once, so a glow
//! pixel receives at most one `GLOW_ALPHA` blend per ring.

use std::path::Path;

use glam::DVec2;
use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, Blend, Canvas};
use lichtenberg_core::{Domain, LichtenbergError, PotentialField, Srgb};

use crate::{Stroke, Surface};

/// Number of concentric glow passes.
const GLOW_RINGS: usize = 3;
/// Alpha of each glow ring.
const GLOW_ALPHA: f64 = 0.06;
/// Peak blend of the field tint over the background.
const FIELD_INTENSITY: f64 = 0.35;

/// A [`Surface`] that rasterizes into an in-memory image.
pub struct RasterSurface {
    canvas: Blend<RgbaImage>,
    scale: f64,
    background: Srgb,
    path: Vec<Vec<DVec2>>,
}

impl RasterSurface {
    /// Creates a black surface with `scale` pixels per grid cell.
    ///
    /// Returns `LichtenbergError::InvalidConfig` if `scale` is zero or the
    /// pixel dimensions overflow `u32`.
    pub fn new(domain: Domain, scale: u32) -> Result<Self, LichtenbergError> {
        if scale == 0 {
            return Err(LichtenbergError::InvalidConfig(
                "raster scale must be positive".into(),
            ));
        }
        let pixels = |cells: usize| {
            u32::try_from(cells)
                .ok()
                .and_then(|c| c.checked_mul(scale))
                .ok_or_else(|| {
                    LichtenbergError::InvalidConfig(format!(
                        "{cells} cells at scale {scale} exceed the image size limit"
                    ))
                })
        };
        let mut surface = Self {
            canvas: Blend(RgbaImage::new(pixels(domain.width())?, pixels(domain.height())?)),
            scale: f64::from(scale),
            background: Srgb::BLACK,
            path: Vec::new(),
        };
        surface.clear();
        Ok(surface)
    }

    /// Replaces the background color and clears to it.
    pub fn with_background(mut self, background: Srgb) -> Self {
        self.background = background;
        self.clear();
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas.0
    }

    /// Underlays the potential field as a `tint` gradient over the background.
    ///
    /// Meant to be called right after `clear`; it overwrites existing pixels.
    pub fn paint_field(&mut self, field: &PotentialField, tint: Srgb) {
        let scale = self.scale as u32;
        let bg = self.background;
        let img = &mut self.canvas.0;
        for (x, y, v) in field.iter() {
            let t = v * FIELD_INTENSITY;
            let color = Srgb {
                r: bg.r + (tint.r - bg.r) * t,
                g: bg.g + (tint.g - bg.g) * t,
                b: bg.b + (tint.b - bg.b) * t,
            };
            let pixel = Rgba(color.to_rgba8(1.0));
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x as u32 * scale + dx;
                    let py = y as u32 * scale + dy;
                    if px < img.width() && py < img.height() {
                        img.put_pixel(px, py, pixel);
                    }
                }
            }
        }
    }

    /// Saves the image as PNG.
    ///
    /// Returns `LichtenbergError::Io` on write failure.
    pub fn write_png(&self, path: &Path) -> Result<(), LichtenbergError> {
        self.canvas
            .0
            .save(path)
            .map_err(|e| LichtenbergError::Io(format!("{}: {e}", path.display())))
    }

    /// Blends the union of `radius` discs along `lines` exactly once.
    fn glow_ring(&mut self, lines: &[(DVec2, DVec2)], radius: f64, color: Rgba<u8>) {
        let Some((lo, hi)) = bounds(lines) else {
            return;
        };
        let (w, h) = self.canvas.0.dimensions();
        let pad = radius.ceil() + 1.0;
        let clamp_x = |v: f64| v.clamp(0.0, f64::from(w)) as u32;
        let clamp_y = |v: f64| v.clamp(0.0, f64::from(h)) as u32;
        let (x0, y0) = (clamp_x(lo.x.floor() - pad), clamp_y(lo.y.floor() - pad));
        let (x1, y1) = (clamp_x(hi.x.floor() + pad + 1.0), clamp_y(hi.y.floor() + pad + 1.0));
        if x1 <= x0 || y1 <= y0 {
            return;
        }

        let mut mask = GrayImage::new(x1 - x0, y1 - y0);
        let offset = DVec2::new(f64::from(x0), f64::from(y0));
        for &(a, b) in lines {
            stamp_line(&mut mask, a - offset, b - offset, radius, Luma([255]));
        }
        let img = &mut self.canvas.0;
        for (mx, my, m) in mask.enumerate_pixels() {
            if m[0] > 0 {
                img.get_pixel_mut(x0 + mx, y0 + my).blend(&color);
            }
        }
    }
}

/// Stamps filled discs of `radius` along the line from `from` to `to`.
fn stamp_line<C: Canvas>(canvas: &mut C, from: DVec2, to: DVec2, radius: f64, color: C::Pixel) {
    let length = from.distance(to);
    let spacing = (radius * 0.5).max(0.5);
    let stamps = (length / spacing).ceil().max(1.0) as usize;
    let r = radius.round() as i32;
    for i in 0..=stamps {
        let p = from.lerp(to, i as f64 / stamps as f64);
        draw_filled_circle_mut(canvas, (p.x.floor() as i32, p.y.floor() as i32), r, color);
    }
}

fn bounds(lines: &[(DVec2, DVec2)]) -> Option<(DVec2, DVec2)> {
    let mut points = lines.iter().flat_map(|&(a, b)| [a, b]);
    let first = points.next()?;
    Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
}

impl Surface for RasterSurface {
    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, p: DVec2) {
        self.path.push(vec![p * self.scale]);
    }

    fn line_to(&mut self, p: DVec2) {
        let p = p * self.scale;
        match self.path.last_mut() {
            Some(sub) => sub.push(p),
            None => self.path.push(vec![p]),
        }
    }

    fn stroke(&mut self, stroke: &Stroke) {
        let core = (stroke.width * self.scale * 0.5).max(0.5);
        let lines: Vec<(DVec2, DVec2)> = self
            .path
            .iter()
            .flat_map(|sub| sub.windows(2).map(|w| (w[0], w[1])))
            .collect();

        if stroke.glow_radius > 0.0 {
            let glow = stroke.glow_radius * self.scale;
            let color = Rgba(stroke.color.to_rgba8(GLOW_ALPHA));
            for ring in (1..=GLOW_RINGS).rev() {
                let radius = core + glow * ring as f64 / GLOW_RINGS as f64;
                self.glow_ring(&lines, radius, color);
            }
        }
        let color = Rgba(stroke.color.to_rgba8(1.0));
        for &(a, b) in &lines {
            stamp_line(&mut self.canvas, a, b, core, color);
        }
    }

    fn clear(&mut self) {
        let pixel = Rgba(self.background.to_rgba8(1.0));
        for p in self.canvas.0.pixels_mut() {
            *p = pixel;
        }
        self.path.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Renderer, StrokeStyle};
    use lichtenberg_core::{FieldParams, GridPos};
    use lichtenberg_growth::{GrowthConfig, RunState};

    fn stroke(width: f64, glow_radius: f64) -> Stroke {
        Stroke {
            width,
            color: Srgb::WHITE,
            glow_radius,
        }
    }

    fn line(surface: &mut RasterSurface, from: DVec2, to: DVec2, s: &Stroke) {
        surface.begin_path();
        surface.move_to(from);
        surface.line_to(to);
        surface.stroke(s);
    }

    #[test]
    fn new_surface_is_opaque_background() {
        let surface = RasterSurface::new(Domain::new(4, 3).unwrap(), 2).unwrap();
        assert_eq!(surface.image().dimensions(), (8, 6));
        assert!(surface.image().pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn zero_scale_is_invalid() {
        let result = RasterSurface::new(Domain::new(4, 4).unwrap(), 0);
        assert!(matches!(result, Err(LichtenbergError::InvalidConfig(_))));
    }

    #[test]
    fn stroke_paints_along_the_line() {
        let mut surface = RasterSurface::new(Domain::new(10, 10).unwrap(), 1).unwrap();
        line(
            &mut surface,
            DVec2::new(1.5, 5.5),
            DVec2::new(8.5, 5.5),
            &stroke(1.0, 0.0),
        );
        let img = surface.image();
        for x in 2..=8 {
            assert_eq!(img.get_pixel(x, 5)[0], 255, "gap at x = {x}");
        }
        assert_eq!(img.get_pixel(5, 0)[0], 0);
    }

    #[test]
    fn glow_tints_beyond_the_stroke() {
        let mut plain = RasterSurface::new(Domain::new(20, 20).unwrap(), 1).unwrap();
        let mut glowing = RasterSurface::new(Domain::new(20, 20).unwrap(), 1).unwrap();
        let (a, b) = (DVec2::new(2.5, 10.5), DVec2::new(17.5, 10.5));
        line(&mut plain, a, b, &stroke(1.0, 0.0));
        line(&mut glowing, a, b, &stroke(1.0, 4.0));
        assert_eq!(plain.image().get_pixel(10, 13)[0], 0);
        assert!(glowing.image().get_pixel(10, 13)[0] > 0);
        assert_eq!(glowing.image().get_pixel(10, 10)[0], 255);
    }

    #[test]
    fn glow_blends_once_per_ring() {
        // One ring blend of white over black at GLOW_ALPHA.
        let one = 255.0 * f64::from(Srgb::WHITE.to_rgba8(GLOW_ALPHA)[3]) / 255.0;
        let mut surface = RasterSurface::new(Domain::new(20, 20).unwrap(), 1).unwrap();
        line(
            &mut surface,
            DVec2::new(2.5, 10.5),
            DVec2::new(17.5, 10.5),
            &stroke(1.0, 4.0),
        );
        let img = surface.image();
        // Two rows out sits inside all three rings, four rows out only in the outermost.
        let inner = f64::from(img.get_pixel(10, 12)[0]);
        let outer = f64::from(img.get_pixel(10, 14)[0]);
        assert!(inner <= 3.0 * one + 1.0, "inner glow {inner} stacked beyond three rings");
        assert!(inner >= 2.0 * one, "inner glow {inner} missing rings");
        assert!((outer - one).abs() <= 1.0, "outer glow {outer}, expected about {one}");
    }

    #[test]
    fn clear_restores_background() {
        let mut surface = RasterSurface::new(Domain::new(6, 6).unwrap(), 1)
            .unwrap()
            .with_background(Srgb::WHITE);
        line(
            &mut surface,
            DVec2::new(0.5, 0.5),
            DVec2::new(5.5, 5.5),
            &Stroke {
                color: Srgb::BLACK,
                ..stroke(2.0, 0.0)
            },
        );
        surface.clear();
        assert!(surface.image().pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn field_underlay_is_brightest_at_the_seed() {
        let domain = Domain::new(9, 9).unwrap();
        let field =
            PotentialField::initialize(domain, GridPos::new(4, 4), &FieldParams::default(), 1)
                .unwrap();
        let mut surface = RasterSurface::new(domain, 1).unwrap();
        surface.paint_field(&field, Srgb::WHITE);
        let img = surface.image();
        assert!(img.get_pixel(4, 4)[0] > img.get_pixel(0, 0)[0]);
    }

    #[test]
    fn write_png_round_trip() {
        let domain = Domain::new(32, 32).unwrap();
        let config = GrowthConfig {
            max_nodes: 80,
            ..GrowthConfig::default()
        };
        let mut run = RunState::start(domain, GridPos::new(16, 0), config).unwrap();
        let mut surface = RasterSurface::new(domain, 2).unwrap();
        Renderer::new(StrokeStyle::default()).render(&mut surface, run.grow());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.png");
        surface.write_png(&path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (64, 64));
        assert!(img.pixels().any(|p| p[0] > 0));
    }

    #[test]
    fn write_png_to_missing_directory_is_io_error() {
        let surface = RasterSurface::new(Domain::new(2, 2).unwrap(), 1).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let result = surface.write_png(&dir.path().join("missing").join("x.png"));
        assert!(matches!(result, Err(LichtenbergError::Io(_))));
    }
}
