use thiserror::Error;

/// Errors returned by a [`super::DiskApi`]
#[derive(Error, Debug)]
pub enum DiskError {
    /// The remote path is already taken. The only failure the bot reports
    /// back to the user instead of logging.
    #[error("path already exists: {0}")]
    PathExists(String),

    /// The API answered with an error status
    #[error("disk API returned {status} ({code}): {description}")]
    Api {
        status: u16,
        code: String,
        description: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiskError {
    pub fn is_path_exists(&self) -> bool {
        matches!(self, DiskError::PathExists(_))
    }
}
