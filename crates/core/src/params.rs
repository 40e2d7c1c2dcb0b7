//! Lenient readers for flat JSON parameter objects.
//!
//! Growth configs and stroke styles arrive as `{"key": value}` objects from
//! the CLI, run files and the browser. A missing key, a `null`, or a value of
//! the wrong JSON type yields the supplied default; range checks happen later
//! in each type's `validate`.

use serde_json::Value;

/// `params[name]` as `f64`. Integers are accepted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// `params[name]` as a count. Negative or fractional numbers fall back.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// `params[name]` as `u64`, full width (PRNG seeds).
pub fn param_u64(params: &Value, name: &str, default: u64) -> u64 {
    params.get(name).and_then(Value::as_u64).unwrap_or(default)
}

pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map_or_else(|| default.to_owned(), String::from)
}
