//! Error types for the Lichtenberg canvas core.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal state of a growth run.
///
/// A run that reached any of these states accepts no further work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The tree reached `max_nodes`.
    Completed,
    /// The frontier emptied before `max_nodes` was reached.
    Exhausted,
    /// The caller cancelled the run.
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Termination::Completed => "completed",
            Termination::Exhausted => "exhausted",
            Termination::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Errors produced by field sampling, growth and rendering.
#[derive(Debug, Error)]
pub enum LichtenbergError {
    /// Start parameters were rejected before any state was created.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A coordinate was queried outside the field's domain.
    #[error("position ({x}, {y}) is outside the {width}x{height} domain")]
    OutOfDomain {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },

    /// An operation was attempted on a run that already terminated.
    #[error("run already terminated ({0})")]
    RunTerminated(Termination),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Writing output failed.
    #[error("i/o error: {0}")]
    Io(String),
}
