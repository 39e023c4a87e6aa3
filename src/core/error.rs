use thiserror::Error;

use crate::disk::DiskError;

/// Centralized error types for the application
///
/// Failures that the user is expected to see (unknown tag, conflicting remote
/// path, bad command arguments) are not errors: they are reported through
/// [`crate::save::SaveOutcome`] and reply texts. Everything that ends up here
/// is logged by the handler and the dispatcher keeps serving updates.
///
/// # Example
///
/// ```no_run
/// use spike::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Telegram file download errors
    #[error("Download error: {0}")]
    Download(#[from] teloxide::DownloadError),

    /// Remote storage errors
    #[error("Disk error: {0}")]
    Disk(#[from] DiskError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// (De)serialization of persisted state
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Config(err.to_string())
    }
}
