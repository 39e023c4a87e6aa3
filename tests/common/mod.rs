//! Common test utilities
//!
//! Fakes for the three collaborators of the bot (remote disk, Telegram file
//! download, replies) and a harness wiring them into a real [`Router`] with
//! an in-memory database.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

use spike::core::types::{PhotoMessage, PhotoVariant};
use spike::core::AppResult;
use spike::disk::{DiskApi, DiskError, RemoteDisk};
use spike::save::{FileNaming, PhotoFetcher, SaveWorkflow};
use spike::storage::db::IN_MEMORY;
use spike::storage::{create_pool, SqliteMediaGroupStore, SqliteTagStore, TagRegistry};
use spike::telegram::{IncomingMessage, Replier, Reply, Router};

pub const BOT_USERNAME: &str = "spike_bot";
pub const CHAT_ID: i64 = 1001;

/// In-memory remote disk that refuses to overwrite
#[derive(Default)]
pub struct FakeDisk {
    pub paths: Mutex<BTreeSet<String>>,
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl DiskApi for FakeDisk {
    async fn exists(&self, path: &str) -> Result<bool, DiskError> {
        Ok(self.paths.lock().contains(path))
    }

    async fn mkdir(&self, path: &str) -> Result<(), DiskError> {
        self.paths.lock().insert(path.to_string());
        Ok(())
    }

    async fn upload(&self, local_path: &Path, path: &str) -> Result<(), DiskError> {
        // The scratch file must still be there while uploading
        assert!(local_path.exists(), "scratch file missing during upload");
        if !self.paths.lock().insert(path.to_string()) {
            return Err(DiskError::PathExists(path.to_string()));
        }
        self.uploads.lock().push(path.to_string());
        Ok(())
    }
}

/// Writes a few fake JPEG bytes instead of downloading
#[derive(Default)]
pub struct FakeFetcher {
    pub fetched: Mutex<Vec<String>>,
}

#[async_trait]
impl PhotoFetcher for FakeFetcher {
    async fn fetch(&self, photo: &PhotoVariant, destination: &Path) -> AppResult<()> {
        self.fetched.lock().push(photo.file_id.clone());
        fs_err::tokio::write(destination, b"\xFF\xD8\xFF\xE0fake").await?;
        Ok(())
    }
}

/// Collects replies instead of sending them
#[derive(Default)]
pub struct RecordingReplier {
    pub replies: Mutex<Vec<Reply>>,
}

impl RecordingReplier {
    pub fn texts(&self) -> Vec<String> {
        self.replies.lock().iter().map(|r| r.text.clone()).collect()
    }

    pub fn last(&self) -> Option<Reply> {
        self.replies.lock().last().cloned()
    }
}

#[async_trait]
impl Replier for RecordingReplier {
    async fn reply(&self, reply: Reply) -> AppResult<()> {
        self.replies.lock().push(reply);
        Ok(())
    }
}

/// A router over fakes with an in-memory database
pub struct TestBot {
    pub router: Router,
    pub registry: TagRegistry,
    pub disk: Arc<FakeDisk>,
    pub fetcher: Arc<FakeFetcher>,
    pub replier: RecordingReplier,
    pub workdir: TempDir,
}

impl TestBot {
    pub fn new() -> Self {
        Self::with_options(None, false)
    }

    pub fn with_options(public_url: Option<&str>, prefix_chat_id: bool) -> Self {
        let pool = Arc::new(create_pool(IN_MEMORY).expect("in-memory database"));
        let registry = TagRegistry::new(Arc::new(SqliteTagStore::new(Arc::clone(&pool))));
        let media_groups = Arc::new(SqliteMediaGroupStore::new(pool));
        let disk = Arc::new(FakeDisk::default());
        let fetcher = Arc::new(FakeFetcher::default());
        let workdir = tempfile::tempdir().expect("workdir");

        let workflow = SaveWorkflow::new(
            registry.clone(),
            fetcher.clone(),
            RemoteDisk::new(disk.clone(), "/Photos", public_url.map(str::to_string)),
            workdir.path().to_path_buf(),
            FileNaming { prefix_chat_id },
        );
        let router = Router::new(registry.clone(), media_groups, workflow, BOT_USERNAME);

        Self {
            router,
            registry,
            disk,
            fetcher,
            replier: RecordingReplier::default(),
            workdir,
        }
    }

    pub async fn send(&self, msg: &IncomingMessage) {
        self.router
            .handle(msg, &self.replier)
            .await
            .expect("message handled without infrastructure errors");
    }

    /// Files left behind in the scratch directory
    pub fn scratch_files(&self) -> Vec<PathBuf> {
        fs_err::read_dir(self.workdir.path())
            .expect("read workdir")
            .map(|entry| entry.expect("dir entry").path())
            .collect()
    }
}

pub fn text_message(message_id: i32, text: &str) -> IncomingMessage {
    IncomingMessage {
        chat_id: CHAT_ID,
        message_id,
        text: Some(text.to_string()),
        ..Default::default()
    }
}

pub fn photo_message(message_id: i32) -> IncomingMessage {
    IncomingMessage {
        chat_id: CHAT_ID,
        message_id,
        photos: vec![
            variant(&format!("small-{}", message_id), 90, 60),
            variant(&format!("large-{}", message_id), 1280, 853),
            variant(&format!("medium-{}", message_id), 320, 213),
        ],
        ..Default::default()
    }
}

pub fn captioned_photo(message_id: i32, caption: &str) -> IncomingMessage {
    IncomingMessage {
        caption: Some(caption.to_string()),
        ..photo_message(message_id)
    }
}

pub fn album_photo(message_id: i32, media_group_id: &str) -> IncomingMessage {
    IncomingMessage {
        media_group_id: Some(media_group_id.to_string()),
        ..photo_message(message_id)
    }
}

pub fn reply_to(message_id: i32, text: &str, target: IncomingMessage) -> IncomingMessage {
    IncomingMessage {
        reply_to: Some(Box::new(target)),
        ..text_message(message_id, text)
    }
}

pub fn variant(file_id: &str, width: u32, height: u32) -> PhotoVariant {
    PhotoVariant {
        file_id: file_id.to_string(),
        width,
        height,
    }
}

pub fn photo(message_id: i32, photos: Vec<PhotoVariant>) -> PhotoMessage {
    PhotoMessage {
        chat_id: CHAT_ID,
        message_id,
        photos,
    }
}
