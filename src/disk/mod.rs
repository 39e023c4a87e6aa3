//! Remote storage for saved photos
//!
//! [`DiskApi`] is the thin client seam (existence check, mkdir, upload on
//! absolute remote paths). [`RemoteDisk`] adds what the bot needs on top of
//! it: the configured root directory, creation of missing category
//! directories and public links.

mod error;
pub mod yandex;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

pub use error::DiskError;
pub use yandex::YandexDisk;

/// Low-level remote storage operations on absolute paths
#[async_trait]
pub trait DiskApi: Send + Sync {
    async fn exists(&self, path: &str) -> Result<bool, DiskError>;

    async fn mkdir(&self, path: &str) -> Result<(), DiskError>;

    /// Uploads a local file. Never overwrites: an existing `path` fails with
    /// [`DiskError::PathExists`].
    async fn upload(&self, local_path: &Path, path: &str) -> Result<(), DiskError>;
}

/// The bot's view of remote storage, rooted at the configured directory
#[derive(Clone)]
pub struct RemoteDisk {
    api: Arc<dyn DiskApi>,
    root_dir: String,
    public_url: Option<String>,
}

impl RemoteDisk {
    pub fn new(api: Arc<dyn DiskApi>, root_dir: impl Into<String>, public_url: Option<String>) -> Self {
        Self {
            api,
            root_dir: root_dir.into(),
            public_url,
        }
    }

    /// Uploads `local_path` to `path` under the root directory
    ///
    /// Missing parent directories are created level by level first.
    ///
    /// # Returns
    /// * `Ok(Some(url))` - Uploaded, and a public URL prefix is configured
    /// * `Ok(None)` - Uploaded
    /// * `Err(DiskError::PathExists)` - Something is already stored at `path`
    pub async fn save_file(&self, local_path: &Path, path: &str) -> Result<Option<String>, DiskError> {
        let dst_path = self.absolute_path(path);
        if let Some((parent, _)) = dst_path.rsplit_once('/') {
            self.mkdir_if_not_exists(parent).await?;
        }

        log::info!("Uploading to '{}'", path);
        self.api.upload(local_path, &dst_path).await?;

        Ok(self.public_url(path))
    }

    /// `path` joined onto the root directory
    pub fn absolute_path(&self, path: &str) -> String {
        format!("{}/{}", self.root_dir.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Public link to `path`, each segment percent-encoded
    pub fn public_url(&self, path: &str) -> Option<String> {
        let base = self.public_url.as_deref()?;
        let encoded: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        Some(format!("{}/{}", base.trim_end_matches('/'), encoded.join("/")))
    }

    async fn mkdir_if_not_exists(&self, dir: &str) -> Result<(), DiskError> {
        for level in directory_levels(dir) {
            if self.api.exists(&level).await? {
                continue;
            }
            log::info!("Creating directory '{}'", level);
            match self.api.mkdir(&level).await {
                Ok(()) => {}
                // Someone else created it between the check and the mkdir
                Err(DiskError::PathExists(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Every directory from the outermost to `dir` itself
///
/// `"/Photos/Animals/Cats"` yields `/Photos`, `/Photos/Animals`,
/// `/Photos/Animals/Cats`. A `disk:` style scheme prefix is never a level of its own.
pub fn directory_levels(dir: &str) -> Vec<String> {
    let dir = dir.trim_end_matches('/');
    let mut levels = Vec::new();

    for (idx, c) in dir.char_indices() {
        if c != '/' || idx == 0 {
            continue;
        }
        let level = &dir[..idx];
        if level.ends_with(':') || level.ends_with('/') {
            continue;
        }
        levels.push(level.to_string());
    }
    if !dir.is_empty() && !dir.ends_with(':') {
        levels.push(dir.to_string());
    }

    levels
}
