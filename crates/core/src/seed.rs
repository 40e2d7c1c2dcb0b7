//! Reproducible description of a generation run.
//!
//! A [`RunSeed`] captures everything needed to regrow a figure: domain
//! dimensions, the seed position, the PRNG seed, growth parameters and the
//! stroke style. Feeding the same `RunSeed` to the same binary yields the
//! identical segment sequence.

use crate::domain::{Domain, GridPos};
use crate::error::LichtenbergError;
use serde::{Deserialize, Serialize};

/// Everything needed to regrow one Lichtenberg figure.
///
/// `params` and `style` are JSON objects read with the `param_*` helpers by
/// the growth engine and renderer; missing keys fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSeed {
    pub width: usize,
    pub height: usize,
    pub seed_x: usize,
    pub seed_y: usize,
    pub random_seed: u64,
    #[serde(default = "empty_object")]
    pub params: serde_json::Value,
    #[serde(default = "empty_object")]
    pub style: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl RunSeed {
    /// Creates a run seed with default params and style (`{}`).
    pub fn new(width: usize, height: usize, seed: GridPos, random_seed: u64) -> Self {
        Self {
            width,
            height,
            seed_x: seed.x,
            seed_y: seed.y,
            random_seed,
            params: empty_object(),
            style: empty_object(),
        }
    }

    /// The seed position as a grid cell.
    pub fn seed_position(&self) -> GridPos {
        GridPos::new(self.seed_x, self.seed_y)
    }

    /// Validates the dimensions and that the seed position lies inside them.
    pub fn domain(&self) -> Result<Domain, LichtenbergError> {
        let domain = Domain::new(self.width, self.height)?;
        if !domain.contains(self.seed_x as i64, self.seed_y as i64) {
            return Err(LichtenbergError::InvalidConfig(format!(
                "seed position ({}, {}) is outside the {}x{} domain",
                self.seed_x, self.seed_y, self.width, self.height
            )));
        }
        Ok(domain)
    }
}
