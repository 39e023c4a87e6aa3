//! Photo save workflow
//!
//! tag -> category, largest photo variant -> local scratch file -> remote
//! `<category>/<file name>` -> scratch file removed.

mod scratch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

pub use scratch::ScratchFile;

use crate::core::config::ID_SIZE;
use crate::core::error::AppResult;
use crate::core::types::{PhotoMessage, PhotoVariant};
use crate::disk::{DiskError, RemoteDisk};
use crate::storage::TagRegistry;

/// Downloads a photo variant from the chat platform
#[async_trait]
pub trait PhotoFetcher: Send + Sync {
    async fn fetch(&self, photo: &PhotoVariant, destination: &Path) -> AppResult<()>;
}

/// What happened to a save request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Uploaded to `path` (relative to the remote root)
    Saved { path: String, public_url: Option<String> },
    /// The tag is not mapped in this chat; nothing was downloaded or uploaded
    UnknownTag(String),
    /// Something is already stored at `path`
    Conflict(String),
    /// The message carries no photo variants
    NoPhotoFound,
}

/// How generated file names look
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileNaming {
    /// Prefix names with `<chat id>_`, message ids are only unique per chat
    pub prefix_chat_id: bool,
}

impl FileNaming {
    /// `0000000042.jpg`, or `-100123_0000000042.jpg` with the chat prefix
    pub fn filename(&self, chat_id: i64, message_id: i32) -> String {
        if self.prefix_chat_id {
            format!("{}_{:0width$}.jpg", chat_id, message_id, width = ID_SIZE)
        } else {
            format!("{:0width$}.jpg", message_id, width = ID_SIZE)
        }
    }
}

/// Picks the variant with the largest area, the first one on ties.
pub fn select_largest(photos: &[PhotoVariant]) -> Option<&PhotoVariant> {
    photos
        .iter()
        .reduce(|best, photo| if photo.area() > best.area() { photo } else { best })
}

pub struct SaveWorkflow {
    registry: TagRegistry,
    fetcher: Arc<dyn PhotoFetcher>,
    disk: RemoteDisk,
    workdir: PathBuf,
    naming: FileNaming,
}

impl SaveWorkflow {
    pub fn new(
        registry: TagRegistry,
        fetcher: Arc<dyn PhotoFetcher>,
        disk: RemoteDisk,
        workdir: PathBuf,
        naming: FileNaming,
    ) -> Self {
        Self {
            registry,
            fetcher,
            disk,
            workdir,
            naming,
        }
    }

    /// Saves the largest photo of `source` into the category `tag` maps to
    ///
    /// # Returns
    /// * `Ok(SaveOutcome)` - Saved, or a condition the user should be told about
    /// * `Err(AppError)` - Download, storage or database failure
    pub async fn save(&self, source: &PhotoMessage, tag: &str) -> AppResult<SaveOutcome> {
        let Some(category) = self.registry.resolve(source.chat_id, tag)? else {
            log::info!("Chat {}: unknown tag '{}'", source.chat_id, tag);
            return Ok(SaveOutcome::UnknownTag(tag.to_string()));
        };
        let Some(photo) = select_largest(&source.photos) else {
            return Ok(SaveOutcome::NoPhotoFound);
        };

        let filename = self.naming.filename(source.chat_id, source.message_id);
        let remote_path = format!("{}/{}", category, filename);

        let scratch = ScratchFile::new(self.workdir.join(&filename));
        log::info!("Downloading to '{}'", scratch.path().display());
        self.fetcher.fetch(photo, scratch.path()).await?;

        match self.disk.save_file(scratch.path(), &remote_path).await {
            Ok(public_url) => {
                log::info!("Done");
                Ok(SaveOutcome::Saved {
                    path: remote_path,
                    public_url,
                })
            }
            Err(DiskError::PathExists(_)) => {
                log::error!("File already exists: '{}'", remote_path);
                Ok(SaveOutcome::Conflict(remote_path))
            }
            Err(e) => Err(e.into()),
        }
    }
}
