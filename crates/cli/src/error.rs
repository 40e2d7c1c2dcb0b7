//! CLI failures and their process exit codes.
//!
//! | code | meaning |
//! |------|---------|
//! | 2    | clap argument error (before `run`) |
//! | 10   | generation rejected the inputs (config, domain, seed cell) |
//! | 11   | a file could not be read or written |
//! | 12   | `--params` / `--style` could not be parsed or the style is invalid |
//! | 13   | JSON output could not be encoded |
//! | 14   | a `--replay` file is not a saved run |

use std::path::PathBuf;

use lichtenberg_core::LichtenbergError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("generation failed: {0}")]
    Generation(LichtenbergError),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image output failed inside the renderer.
    #[error("cannot write image: {0}")]
    Output(String),

    #[error("invalid {flag} JSON: {source}")]
    Params {
        flag: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid style: {0}")]
    Style(String),

    #[error("{} is not a saved run: {source}", path.display())]
    RunFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Generation(_) => 10,
            CliError::File { .. } | CliError::Output(_) => 11,
            CliError::Params { .. } | CliError::Style(_) => 12,
            CliError::Serialization(_) => 13,
            CliError::RunFile { .. } => 14,
        }
    }
}

impl From<LichtenbergError> for CliError {
    fn from(e: LichtenbergError) -> Self {
        match e {
            LichtenbergError::Io(msg) => CliError::Output(msg),
            LichtenbergError::InvalidColor(msg) => CliError::Style(msg),
            other => CliError::Generation(other),
        }
    }
}
