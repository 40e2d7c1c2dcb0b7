//! Growth run configuration.

use lichtenberg_core::params::{param_f64, param_u64, param_usize};
use lichtenberg_core::{FieldParams, LichtenbergError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default node limit, root included.
const DEFAULT_MAX_NODES: usize = 2000;
/// Default fraction of the frontier eligible for selection.
const DEFAULT_BRANCHING_FACTOR: f64 = 0.3;
/// Default PRNG seed.
const DEFAULT_RANDOM_SEED: u64 = 42;
/// Default number of segments a single `step()` may emit.
const DEFAULT_STEP_BUDGET: usize = 50;

/// Parameters for one growth run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Node limit including the root. Must be positive.
    pub max_nodes: usize,
    /// Fraction of the frontier, best weights first, that may be drawn
    /// from on each commit. In (0, 1]; lower values give sparser figures.
    pub branching_factor: f64,
    /// Seed for both field perturbation and candidate selection.
    pub random_seed: u64,
    /// Upper bound on segments emitted per `step()` call.
    pub step_budget_per_call: usize,
    /// Potential field construction policy.
    pub field: FieldParams,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            branching_factor: DEFAULT_BRANCHING_FACTOR,
            random_seed: DEFAULT_RANDOM_SEED,
            step_budget_per_call: DEFAULT_STEP_BUDGET,
            field: FieldParams::default(),
        }
    }
}

impl GrowthConfig {
    /// Extracts a config from a flat JSON object, falling back to defaults
    /// for missing keys. `random_seed` in the JSON overrides the argument.
    pub fn from_json(random_seed: u64, params: &Value) -> Result<Self, LichtenbergError> {
        Ok(Self {
            max_nodes: param_usize(params, "max_nodes", DEFAULT_MAX_NODES),
            branching_factor: param_f64(params, "branching_factor", DEFAULT_BRANCHING_FACTOR),
            random_seed: param_u64(params, "random_seed", random_seed),
            step_budget_per_call: param_usize(params, "step_budget_per_call", DEFAULT_STEP_BUDGET),
            field: FieldParams::from_json(params)?,
        })
    }

    /// Current values as a flat JSON object, field params included.
    pub fn params(&self) -> Value {
        let mut v = self.field.params();
        v["max_nodes"] = json!(self.max_nodes);
        v["branching_factor"] = json!(self.branching_factor);
        v["random_seed"] = json!(self.random_seed);
        v["step_budget_per_call"] = json!(self.step_budget_per_call);
        v
    }

    /// Schema describing every growth and field parameter.
    pub fn param_schema() -> Value {
        let mut schema = FieldParams::param_schema();
        schema["max_nodes"] = json!({
            "type": "integer",
            "default": DEFAULT_MAX_NODES,
            "min": 1,
            "description": "Node limit including the root"
        });
        schema["branching_factor"] = json!({
            "type": "number",
            "default": DEFAULT_BRANCHING_FACTOR,
            "min": 0.0,
            "max": 1.0,
            "description": "Fraction of the frontier eligible per commit (exclusive of 0)"
        });
        schema["random_seed"] = json!({
            "type": "integer",
            "default": DEFAULT_RANDOM_SEED,
            "description": "PRNG seed; identical seeds reproduce identical figures"
        });
        schema["step_budget_per_call"] = json!({
            "type": "integer",
            "default": DEFAULT_STEP_BUDGET,
            "min": 1,
            "description": "Maximum segments emitted by one step() call"
        });
        schema
    }

    /// Rejects out-of-range values with `InvalidConfig`.
    pub fn validate(&self) -> Result<(), LichtenbergError> {
        if self.max_nodes == 0 {
            return Err(LichtenbergError::InvalidConfig(
                "max_nodes must be positive".into(),
            ));
        }
        if !(self.branching_factor > 0.0 && self.branching_factor <= 1.0) {
            return Err(LichtenbergError::InvalidConfig(format!(
                "branching_factor must be in (0, 1], got {}",
                self.branching_factor
            )));
        }
        if self.step_budget_per_call == 0 {
            return Err(LichtenbergError::InvalidConfig(
                "step_budget_per_call must be positive".into(),
            ));
        }
        self.field.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GrowthConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_max_nodes_is_invalid() {
        let cfg = GrowthConfig {
            max_nodes: 0,
            ..GrowthConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(LichtenbergError::InvalidConfig(_))
        ));
    }

    #[test]
    fn branching_factor_bounds() {
        for bf in [0.0, -0.1, 1.0001, f64::NAN, f64::INFINITY] {
            let cfg = GrowthConfig {
                branching_factor: bf,
                ..GrowthConfig::default()
            };
            assert!(cfg.validate().is_err(), "branching_factor {bf} accepted");
        }
        for bf in [1e-9, 0.3, 1.0] {
            let cfg = GrowthConfig {
                branching_factor: bf,
                ..GrowthConfig::default()
            };
            assert!(cfg.validate().is_ok(), "branching_factor {bf} rejected");
        }
    }

    #[test]
    fn zero_step_budget_is_invalid() {
        let cfg = GrowthConfig {
            step_budget_per_call: 0,
            ..GrowthConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn from_json_uses_defaults_for_empty_json() {
        let cfg = GrowthConfig::from_json(7, &json!({})).unwrap();
        assert_eq!(cfg.max_nodes, DEFAULT_MAX_NODES);
        assert_eq!(cfg.random_seed, 7);
        assert_eq!(cfg.step_budget_per_call, DEFAULT_STEP_BUDGET);
        assert!((cfg.branching_factor - DEFAULT_BRANCHING_FACTOR).abs() < f64::EPSILON);
    }

    #[test]
    fn from_json_extracts_custom_values() {
        let cfg = GrowthConfig::from_json(
            0,
            &json!({
                "max_nodes": 200,
                "branching_factor": 0.5,
                "random_seed": 43,
                "step_budget_per_call": 10,
                "perturbation": 0.0
            }),
        )
        .unwrap();
        assert_eq!(cfg.max_nodes, 200);
        assert_eq!(cfg.random_seed, 43);
        assert_eq!(cfg.step_budget_per_call, 10);
        assert!((cfg.branching_factor - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.field.perturbation, 0.0);
    }

    #[test]
    fn params_round_trip_through_from_json() {
        let cfg = GrowthConfig {
            max_nodes: 321,
            branching_factor: 0.7,
            random_seed: 9,
            step_budget_per_call: 3,
            field: FieldParams::default(),
        };
        assert_eq!(GrowthConfig::from_json(0, &cfg.params()).unwrap(), cfg);
    }

    #[test]
    fn param_schema_covers_growth_and_field_keys() {
        let schema = GrowthConfig::param_schema();
        for key in [
            "max_nodes",
            "branching_factor",
            "random_seed",
            "step_budget_per_call",
            "falloff",
            "perturbation",
        ] {
            assert!(schema.get(key).is_some(), "schema missing {key}");
            assert!(schema[key].get("type").is_some(), "{key} missing 'type'");
            assert!(
                schema[key].get("description").is_some(),
                "{key} missing 'description'"
            );
        }
    }
}
