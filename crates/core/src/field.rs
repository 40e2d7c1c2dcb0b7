//! Scalar potential field over a [`Domain`].
//!
//! The field models the electrical potential a discharge grows through: it
//! is 1 at the seed cell and decays toward the domain edges according to a
//! [`Falloff`] policy. An optional seeded Perlin perturbation roughens the
//! field so that growth forks into irregular channels.
//!
//! Construction is a pure function of `(domain, seed, params, random_seed)`:
//! identical inputs give a bit-identical field on every platform.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{Domain, GridPos};
use crate::error::LichtenbergError;
use crate::params::{param_f64, param_string};

/// Default falloff name used when none is given.
const DEFAULT_FALLOFF: &str = "linear";
/// Default softening distance for [`Falloff::InverseDistance`], as a fraction of the maximum distance.
const DEFAULT_SOFTENING: f64 = 0.25;
/// Default standard deviation for [`Falloff::Gaussian`], as a fraction of the maximum distance.
const DEFAULT_SIGMA: f64 = 0.35;
/// Default perturbation amplitude in [0, 1].
const DEFAULT_PERTURBATION: f64 = 0.3;
/// Default Perlin sampling scale in noise units per cell.
const DEFAULT_NOISE_SCALE: f64 = 0.08;

/// How potential decays with normalized distance `t = d / d_max` from the seed.
///
/// Every policy is monotonic non-increasing in `t` and equals 1 at `t = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Falloff {
    /// `1 - t`: reaches 0 at the farthest corner.
    Linear,
    /// `s (1 - t) / (s + t)`: inverse distance `1 / (1 + t/s)` rescaled so the
    /// farthest corner is 0.
    InverseDistance { softening: f64 },
    /// `exp(-(t / sigma)^2 / 2)`.
    Gaussian { sigma: f64 },
}

impl Falloff {
    /// Evaluates the falloff at normalized distance `t` in [0, 1].
    pub fn eval(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Falloff::Linear => 1.0 - t,
            // Closed form of the rescaled curve; stays finite for every s > 0.
            Falloff::InverseDistance { softening } => softening * (1.0 - t) / (softening + t),
            Falloff::Gaussian { sigma } => {
                let z = t / sigma;
                (-0.5 * z * z).exp()
            }
        }
    }

    /// Policy name as used in JSON params.
    pub fn name(&self) -> &'static str {
        match self {
            Falloff::Linear => "linear",
            Falloff::InverseDistance { .. } => "inverse",
            Falloff::Gaussian { .. } => "gaussian",
        }
    }

    fn validate(&self) -> Result<(), LichtenbergError> {
        match *self {
            Falloff::Linear => Ok(()),
            Falloff::InverseDistance { softening } if softening.is_finite() && softening > 0.0 => {
                Ok(())
            }
            Falloff::Gaussian { sigma } if sigma.is_finite() && sigma > 0.0 => Ok(()),
            other => Err(LichtenbergError::InvalidConfig(format!(
                "falloff '{}' needs a positive finite shape parameter",
                other.name()
            ))),
        }
    }
}

/// Tunable field construction policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldParams {
    pub falloff: Falloff,
    /// Perturbation amplitude in [0, 1]. 0 gives the bare falloff.
    pub perturbation: f64,
    /// Perlin sampling scale; smaller values give broader channels.
    pub noise_scale: f64,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            falloff: Falloff::Linear,
            perturbation: DEFAULT_PERTURBATION,
            noise_scale: DEFAULT_NOISE_SCALE,
        }
    }
}

impl FieldParams {
    /// Field params without perturbation: the potential is exactly the falloff.
    pub fn smooth(falloff: Falloff) -> Self {
        Self {
            falloff,
            perturbation: 0.0,
            ..Self::default()
        }
    }

    /// Extracts field params from a JSON object, falling back to defaults.
    ///
    /// Unknown falloff names are rejected with `InvalidConfig` rather than
    /// silently replaced. Range checks happen in [`FieldParams::validate`].
    pub fn from_json(params: &Value) -> Result<Self, LichtenbergError> {
        let falloff = match param_string(params, "falloff", DEFAULT_FALLOFF).as_str() {
            "linear" => Falloff::Linear,
            "inverse" => Falloff::InverseDistance {
                softening: param_f64(params, "falloff_softening", DEFAULT_SOFTENING),
            },
            "gaussian" => Falloff::Gaussian {
                sigma: param_f64(params, "falloff_sigma", DEFAULT_SIGMA),
            },
            other => {
                return Err(LichtenbergError::InvalidConfig(format!(
                    "unknown falloff '{other}' (expected linear, inverse or gaussian)"
                )))
            }
        };
        Ok(Self {
            falloff,
            perturbation: param_f64(params, "perturbation", DEFAULT_PERTURBATION),
            noise_scale: param_f64(params, "noise_scale", DEFAULT_NOISE_SCALE),
        })
    }

    /// Current values as a flat JSON object.
    pub fn params(&self) -> Value {
        let mut v = json!({
            "falloff": self.falloff.name(),
            "perturbation": self.perturbation,
            "noise_scale": self.noise_scale,
        });
        match self.falloff {
            Falloff::InverseDistance { softening } => v["falloff_softening"] = json!(softening),
            Falloff::Gaussian { sigma } => v["falloff_sigma"] = json!(sigma),
            Falloff::Linear => {}
        }
        v
    }

    /// Schema describing the field parameters.
    pub fn param_schema() -> Value {
        json!({
            "falloff": {
                "type": "string",
                "default": DEFAULT_FALLOFF,
                "options": ["linear", "inverse", "gaussian"],
                "description": "Potential decay policy from the seed toward the edges"
            },
            "falloff_softening": {
                "type": "number",
                "default": DEFAULT_SOFTENING,
                "min": 0.0,
                "description": "Softening distance of the inverse falloff (fraction of max distance)"
            },
            "falloff_sigma": {
                "type": "number",
                "default": DEFAULT_SIGMA,
                "min": 0.0,
                "description": "Standard deviation of the gaussian falloff (fraction of max distance)"
            },
            "perturbation": {
                "type": "number",
                "default": DEFAULT_PERTURBATION,
                "min": 0.0,
                "max": 1.0,
                "description": "Amplitude of the seeded noise perturbation"
            },
            "noise_scale": {
                "type": "number",
                "default": DEFAULT_NOISE_SCALE,
                "min": 0.0,
                "description": "Noise sampling scale in noise units per cell"
            }
        })
    }

    /// Rejects out-of-range values with `InvalidConfig`.
    pub fn validate(&self) -> Result<(), LichtenbergError> {
        self.falloff.validate()?;
        if !(0.0..=1.0).contains(&self.perturbation) {
            return Err(LichtenbergError::InvalidConfig(format!(
                "perturbation must be in [0, 1], got {}",
                self.perturbation
            )));
        }
        if !self.noise_scale.is_finite() || self.noise_scale <= 0.0 {
            return Err(LichtenbergError::InvalidConfig(format!(
                "noise_scale must be positive, got {}",
                self.noise_scale
            )));
        }
        Ok(())
    }
}

/// Immutable potential per cell, stored row-major.
///
/// Built once per run and shared read-only (it is `Send + Sync`).
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialField {
    domain: Domain,
    data: Vec<f64>,
}

impl PotentialField {
    /// Builds the field for `domain` with its peak at `seed`.
    ///
    /// Returns `LichtenbergError::OutOfDomain` if `seed` lies outside the
    /// domain and `InvalidConfig` if `params` fail validation.
    pub fn initialize(
        domain: Domain,
        seed: GridPos,
        params: &FieldParams,
        random_seed: u64,
    ) -> Result<Self, LichtenbergError> {
        if !domain.contains(seed.x as i64, seed.y as i64) {
            return Err(domain.out_of_domain(seed.x as i64, seed.y as i64));
        }
        params.validate()?;

        let max_distance = farthest_corner_distance(domain, seed);
        let noise = (params.perturbation > 0.0).then(|| Perlin::new(noise_seed(random_seed)));

        let mut data = Vec::with_capacity(domain.area());
        for y in 0..domain.height() {
            for x in 0..domain.width() {
                let pos = GridPos::new(x, y);
                let t = if max_distance > 0.0 {
                    pos.distance(seed) / max_distance
                } else {
                    0.0
                };
                let base = params.falloff.eval(t);
                let value = match &noise {
                    Some(perlin) => {
                        let sample = perlin.get([
                            (x as f64 + 0.5) * params.noise_scale,
                            (y as f64 + 0.5) * params.noise_scale,
                        ]);
                        let n = (sample * 0.5 + 0.5).clamp(0.0, 1.0);
                        base * (1.0 - params.perturbation + params.perturbation * n)
                    }
                    None => base,
                };
                data.push(value.clamp(0.0, 1.0));
            }
        }

        Ok(Self { domain, data })
    }

    /// Potential at `(x, y)`.
    ///
    /// Returns `LichtenbergError::OutOfDomain` for coordinates outside the domain.
    pub fn value_at(&self, x: i64, y: i64) -> Result<f64, LichtenbergError> {
        let pos = self.domain.pos(x, y)?;
        Ok(self.potential(pos))
    }

    /// Potential at a cell already known to be inside the domain.
    ///
    /// # Panics
    ///
    /// Panics if `pos` lies outside the domain.
    pub fn potential(&self, pos: GridPos) -> f64 {
        self.data[self.domain.index(pos)]
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Read-only access to the row-major values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Iterates over all cells yielding `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let width = self.domain.width();
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i % width, i / width, v))
    }
}

fn farthest_corner_distance(domain: Domain, seed: GridPos) -> f64 {
    let right = domain.width() - 1;
    let bottom = domain.height() - 1;
    [
        GridPos::new(0, 0),
        GridPos::new(right, 0),
        GridPos::new(0, bottom),
        GridPos::new(right, bottom),
    ]
    .into_iter()
    .map(|corner| seed.distance(corner))
    .fold(0.0, f64::max)
}

/// Folds the 64-bit run seed into the 32-bit seed Perlin expects.
fn noise_seed(random_seed: u64) -> u32 {
    (random_seed ^ (random_seed >> 32)) as u32
}
