use std::fmt;

#[derive(Debug)]
pub enum GradeError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty keyword set, bad pattern).
    ConfigValidation(String),
    /// Required column roles could not be resolved from the bank headers.
    SchemaInference { missing: Vec<String> },
    /// No valid rows left in an input table after filtering.
    EmptyInput { side: String },
    /// Student not present in the current run, or no run committed.
    NotFound { name: String },
}

impl fmt::Display for GradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::SchemaInference { missing } => {
                write!(f, "cannot infer column roles: missing {}", missing.join(", "))
            }
            Self::EmptyInput { side } => {
                write!(f, "no valid rows in {side} after filtering")
            }
            Self::NotFound { name } => {
                if name.is_empty() {
                    write!(f, "no grading run available")
                } else {
                    write!(f, "student '{name}' not found in current run")
                }
            }
        }
    }
}

impl std::error::Error for GradeError {}
