#![deny(unsafe_code)]
//! Browser bindings: grows a Lichtenberg figure onto a 2D canvas.
//!
//! The host calls `start` from a pointer event and then `step` once per
//! animation frame until `isTerminated` reports true.

use glam::DVec2;
use lichtenberg_core::{Domain, GridPos, LichtenbergError};
use lichtenberg_growth::{GrowthConfig, RunState};
use lichtenberg_render::{Renderer, Stroke, StrokeStyle, Surface};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

fn js_err(e: LichtenbergError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Grid cell under a canvas pixel coordinate.
fn cell_at(domain: Domain, cell_size: f64, x: f64, y: f64) -> Result<GridPos, LichtenbergError> {
    domain.pos((x / cell_size).floor() as i64, (y / cell_size).floor() as i64)
}

/// Growth config and stroke style from one flat JSON object.
fn parse_start_params(params_json: &str) -> Result<(GrowthConfig, StrokeStyle), LichtenbergError> {
    let params: serde_json::Value = if params_json.trim().is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_str(params_json)
            .map_err(|e| LichtenbergError::InvalidConfig(format!("invalid params JSON: {e}")))?
    };
    let config = GrowthConfig::from_json(GrowthConfig::default().random_seed, &params)?;
    let style = StrokeStyle::from_json(&params)?;
    Ok((config, style))
}

/// [`Surface`] over a `CanvasRenderingContext2d`, `cell_size` pixels per cell.
struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    cell_size: f64,
    width: f64,
    height: f64,
}

impl Surface for CanvasSurface {
    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, p: DVec2) {
        let p = p * self.cell_size;
        self.ctx.move_to(p.x, p.y);
    }

    fn line_to(&mut self, p: DVec2) {
        let p = p * self.cell_size;
        self.ctx.line_to(p.x, p.y);
    }

    fn stroke(&mut self, stroke: &Stroke) {
        let color = stroke.color.to_hex();
        self.ctx.set_line_width(stroke.width * self.cell_size);
        self.ctx.set_line_cap("round");
        self.ctx.set_stroke_style_str(&color);
        self.ctx.set_shadow_blur(stroke.glow_radius * self.cell_size);
        self.ctx.set_shadow_color(&color);
        self.ctx.stroke();
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }
}

/// A canvas that grows one figure at a time.
#[wasm_bindgen]
pub struct LichtenbergCanvas {
    surface: CanvasSurface,
    domain: Domain,
    renderer: Renderer,
    run: Option<RunState>,
}

#[wasm_bindgen]
impl LichtenbergCanvas {
    /// Binds to `canvas`; the grid has one cell per `cell_size` pixels.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, cell_size: f64) -> Result<LichtenbergCanvas, JsValue> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(JsValue::from_str("cell_size must be positive"));
        }
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let (width, height) = (f64::from(canvas.width()), f64::from(canvas.height()));
        let domain = Domain::new(
            (width / cell_size).floor() as usize,
            (height / cell_size).floor() as usize,
        )
        .map_err(js_err)?;

        Ok(Self {
            surface: CanvasSurface {
                ctx,
                cell_size,
                width,
                height,
            },
            domain,
            renderer: Renderer::new(StrokeStyle::default()),
            run: None,
        })
    }

    /// Clears the canvas and starts a figure at pixel `(x, y)`.
    ///
    /// `params_json` is a flat object of growth and style keys; missing keys
    /// take their defaults. A figure already in progress is discarded.
    pub fn start(&mut self, x: f64, y: f64, params_json: &str) -> Result<(), JsValue> {
        let seed = cell_at(self.domain, self.surface.cell_size, x, y).map_err(js_err)?;
        let (config, style) = parse_start_params(params_json).map_err(js_err)?;
        let run = RunState::start(self.domain, seed, config).map_err(js_err)?;

        self.renderer.reset(&mut self.surface);
        self.renderer = Renderer::new(style);
        self.run = Some(run);
        Ok(())
    }

    /// Grows and draws one batch; returns the number of segments drawn.
    pub fn step(&mut self) -> Result<u32, JsValue> {
        let run = self
            .run
            .as_mut()
            .ok_or_else(|| JsValue::from_str("no figure started"))?;
        let batch = run.step().map_err(js_err)?;
        let drawn = self.renderer.render(&mut self.surface, batch);
        Ok(u32::try_from(drawn).unwrap_or(u32::MAX))
    }

    pub fn cancel(&mut self) -> Result<(), JsValue> {
        match self.run.as_mut() {
            Some(run) => run.cancel().map_err(js_err),
            None => Err(JsValue::from_str("no figure started")),
        }
    }

    /// True when no figure is growing.
    #[wasm_bindgen(js_name = isTerminated)]
    pub fn is_terminated(&self) -> bool {
        self.run.as_ref().map_or(true, RunState::is_terminated)
    }

    /// Repaints the current figure from its retained tree.
    pub fn redraw(&mut self) -> u32 {
        self.renderer.reset(&mut self.surface);
        let drawn = match &self.run {
            Some(run) => self.renderer.render(&mut self.surface, run.segments()),
            None => 0,
        };
        u32::try_from(drawn).unwrap_or(u32::MAX)
    }

    /// Clears the canvas and discards the current figure.
    pub fn reset(&mut self) {
        self.renderer.reset(&mut self.surface);
        self.run = None;
    }

    #[wasm_bindgen(getter, js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.run
            .as_ref()
            .map_or(0, |run| u32::try_from(run.node_count()).unwrap_or(u32::MAX))
    }
}
