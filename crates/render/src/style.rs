//! Stroke style: color, tapering width and glow.

use lichtenberg_core::params::{param_f64, param_string};
use lichtenberg_core::{LichtenbergError, Srgb};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_STROKE_COLOR: &str = "#b4dcff";
const DEFAULT_WIDTH_AT_ROOT: f64 = 3.0;
const DEFAULT_WIDTH_TAPER: f64 = 0.85;
const DEFAULT_GLOW_RADIUS: f64 = 4.0;

/// Resolved paint for one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Srgb,
    /// Extra halo beyond the stroke edge; 0 disables the glow.
    pub glow_radius: f64,
}

/// How segments are painted.
///
/// Width shrinks geometrically with tree depth: a segment whose parent sits at
/// depth `d` is drawn `stroke_width_at_root * stroke_width_taper^d` wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub stroke_color: Srgb,
    pub stroke_width_at_root: f64,
    pub stroke_width_taper: f64,
    pub glow_radius: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            stroke_color: Srgb {
                r: 180.0 / 255.0,
                g: 220.0 / 255.0,
                b: 1.0,
            },
            stroke_width_at_root: DEFAULT_WIDTH_AT_ROOT,
            stroke_width_taper: DEFAULT_WIDTH_TAPER,
            glow_radius: DEFAULT_GLOW_RADIUS,
        }
    }
}

impl StrokeStyle {
    /// Extracts a style from a flat JSON object, falling back to defaults
    /// for missing keys, then validates it.
    ///
    /// Returns `LichtenbergError::InvalidColor` for a malformed
    /// `stroke_color` and `InvalidConfig` for out-of-range numbers.
    pub fn from_json(params: &Value) -> Result<Self, LichtenbergError> {
        let style = Self {
            stroke_color: Srgb::from_hex(&param_string(
                params,
                "stroke_color",
                DEFAULT_STROKE_COLOR,
            ))?,
            stroke_width_at_root: param_f64(params, "stroke_width_at_root", DEFAULT_WIDTH_AT_ROOT),
            stroke_width_taper: param_f64(params, "stroke_width_taper", DEFAULT_WIDTH_TAPER),
            glow_radius: param_f64(params, "glow_radius", DEFAULT_GLOW_RADIUS),
        };
        style.validate()?;
        Ok(style)
    }

    pub fn params(&self) -> Value {
        json!({
            "stroke_color": self.stroke_color.to_hex(),
            "stroke_width_at_root": self.stroke_width_at_root,
            "stroke_width_taper": self.stroke_width_taper,
            "glow_radius": self.glow_radius,
        })
    }

    pub fn param_schema() -> Value {
        json!({
            "stroke_color": {
                "type": "string",
                "default": DEFAULT_STROKE_COLOR,
                "description": "Stroke color as #rrggbb"
            },
            "stroke_width_at_root": {
                "type": "number",
                "default": DEFAULT_WIDTH_AT_ROOT,
                "min": 0.0,
                "description": "Width of segments leaving the root (exclusive of 0)"
            },
            "stroke_width_taper": {
                "type": "number",
                "default": DEFAULT_WIDTH_TAPER,
                "min": 0.0,
                "max": 1.0,
                "description": "Width factor applied per tree depth"
            },
            "glow_radius": {
                "type": "number",
                "default": DEFAULT_GLOW_RADIUS,
                "min": 0.0,
                "description": "Halo radius around each stroke, 0 for none"
            }
        })
    }

    pub fn validate(&self) -> Result<(), LichtenbergError> {
        if !(self.stroke_width_at_root.is_finite() && self.stroke_width_at_root > 0.0) {
            return Err(LichtenbergError::InvalidConfig(format!(
                "stroke_width_at_root must be positive, got {}",
                self.stroke_width_at_root
            )));
        }
        if !(self.stroke_width_taper > 0.0 && self.stroke_width_taper <= 1.0) {
            return Err(LichtenbergError::InvalidConfig(format!(
                "stroke_width_taper must be in (0, 1], got {}",
                self.stroke_width_taper
            )));
        }
        if !(self.glow_radius.is_finite() && self.glow_radius >= 0.0) {
            return Err(LichtenbergError::InvalidConfig(format!(
                "glow_radius must be non-negative, got {}",
                self.glow_radius
            )));
        }
        Ok(())
    }

    /// Stroke width for a segment at tree depth `depth`.
    pub fn width_at(&self, depth: usize) -> f64 {
        let exp = i32::try_from(depth).unwrap_or(i32::MAX);
        self.stroke_width_at_root * self.stroke_width_taper.powi(exp)
    }

    pub fn stroke_at(&self, depth: usize) -> Stroke {
        Stroke {
            width: self.width_at(depth),
            color: self.stroke_color,
            glow_radius: self.glow_radius,
        }
    }
}
