use thiserror::Error;

/// Exit status for load, dating and write failures
pub const EXIT_FAILURE: u8 = 1;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed, missing or unrecognised arguments (also `--help`/`--version` requests)
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error(transparent)]
    Run(#[from] crate::Error),
}

impl AppError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Usage(e) => u8::try_from(e.exit_code()).unwrap_or(EXIT_FAILURE),
            AppError::Run(_) => EXIT_FAILURE,
        }
    }
}
