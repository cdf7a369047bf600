//! `markgrid-cli` — command bodies behind the `mgrid` binary.
//!
//! `main.rs` only parses arguments and prints errors; every command lives in
//! [`ops`] so integration tests can drive it in-process.

pub mod exit_codes;
pub mod ops;

use exit_codes::{grade_exit_code, EXIT_ERROR, EXIT_GRADE_PARSE, EXIT_USAGE};
use markgrid_engine::GradeError;

/// Error carrying the process exit code alongside a message and an optional
/// hint for the user.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: message.into(), hint: None }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: message.into(), hint: None }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self { code: EXIT_GRADE_PARSE, message: message.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<GradeError> for CliError {
    fn from(err: GradeError) -> Self {
        let hint = match &err {
            GradeError::SchemaInference { .. } => Some(
                "rename the bank columns, or pass --config with keyword overrides".to_string(),
            ),
            _ => None,
        };
        Self { code: grade_exit_code(&err), message: err.to_string(), hint }
    }
}
