//! Failures of a `backdrop` invocation and the exit status each one maps to.
//!
//! Scripts that render many snapshots branch on the status, so the codes are
//! stable: 10 when the canvas size is unusable, 11 when the snapshot cannot
//! be written, 12 when a flag value does not parse and 13 when `--json` output
//! cannot be produced. Clap exits with 2 on its own before `run` is reached.

use backdrop_core::BackdropError;
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    /// The field rejected its inputs.
    Model(BackdropError),
    /// Writing the snapshot failed.
    Io(String),
    /// A flag value could not be interpreted; the message names the flag.
    Input(String),
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Model(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }

    /// Blames `--flag` for `err`.
    pub fn input(flag: &str, err: impl fmt::Display) -> Self {
        CliError::Input(format!("invalid --{flag}: {err}"))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Model(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) => f.write_str(msg),
            CliError::Serialization(msg) => write!(f, "could not encode JSON output: {msg}"),
        }
    }
}

/// Snapshot writes report I/O through `BackdropError::Io`; that keeps its own
/// exit code instead of counting as a model failure.
impl From<BackdropError> for CliError {
    fn from(e: BackdropError) -> Self {
        match e {
            BackdropError::Io(msg) => CliError::Io(msg),
            other => CliError::Model(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
