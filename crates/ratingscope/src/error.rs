//! Application-wide error types using thiserror.

use ratingscope_common::RatingsError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Error from one of the pipeline stages.
    #[error(transparent)]
    Ratings(#[from] RatingsError),

    /// Some plots of a `--run-all` batch failed.
    #[error("{failed} of {attempted} plots failed")]
    Batch {
        /// Plots that failed.
        failed: usize,
        /// Plots attempted.
        attempted: usize,
    },
}

/// Result type for the application.
pub type AppResult<T> = Result<T, AppError>;
