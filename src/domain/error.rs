//! Domain error types.

/// Top-level error type for smacross.
#[derive(Debug, thiserror::Error)]
pub enum CrossoverError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("malformed input at row {row}: {reason}")]
    InputMalformed { row: usize, reason: String },

    #[error("input is missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid moving average period {period}: must be at least 1")]
    InvalidPeriod { period: usize },

    #[error("invalid position transition: {reason}")]
    InvalidTransition { reason: String },

    #[error("trade journal violation: {reason}")]
    JournalViolation { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CrossoverError> for std::process::ExitCode {
    fn from(err: &CrossoverError) -> Self {
        let code: u8 = match err {
            CrossoverError::Io(_) => 1,
            CrossoverError::ConfigParse { .. }
            | CrossoverError::ConfigMissing { .. }
            | CrossoverError::ConfigInvalid { .. } => 2,
            CrossoverError::InputMalformed { .. }
            | CrossoverError::MissingColumn { .. }
            | CrossoverError::Csv(_) => 3,
            CrossoverError::InvalidPeriod { .. }
            | CrossoverError::InvalidTransition { .. }
            | CrossoverError::JournalViolation { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
