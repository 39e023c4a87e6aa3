//! Save workflow against fake disk and fetcher
//!
//! Run with: cargo test --test save_workflow_test

mod common;

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use common::{photo, variant, FakeDisk, FakeFetcher, CHAT_ID};
use spike::core::types::PhotoVariant;
use spike::core::{AppError, AppResult};
use spike::disk::{DiskApi, DiskError, RemoteDisk};
use spike::save::{FileNaming, PhotoFetcher, SaveOutcome, SaveWorkflow};
use spike::storage::db::IN_MEMORY;
use spike::storage::{create_pool, SqliteTagStore, TagRegistry};

struct Harness {
    workflow: SaveWorkflow,
    registry: TagRegistry,
    disk: Arc<FakeDisk>,
    fetcher: Arc<FakeFetcher>,
    workdir: TempDir,
}

fn harness(public_url: Option<&str>, prefix_chat_id: bool) -> Harness {
    let pool = Arc::new(create_pool(IN_MEMORY).unwrap());
    let registry = TagRegistry::new(Arc::new(SqliteTagStore::new(pool)));
    let disk = Arc::new(FakeDisk::default());
    let fetcher = Arc::new(FakeFetcher::default());
    let workdir = tempfile::tempdir().unwrap();
    let workflow = SaveWorkflow::new(
        registry.clone(),
        fetcher.clone(),
        RemoteDisk::new(disk.clone(), "/Photos", public_url.map(str::to_string)),
        workdir.path().to_path_buf(),
        FileNaming { prefix_chat_id },
    );

    Harness {
        workflow,
        registry,
        disk,
        fetcher,
        workdir,
    }
}

fn is_empty_dir(dir: &TempDir) -> bool {
    fs_err::read_dir(dir.path()).unwrap().next().is_none()
}

#[tokio::test]
async fn test_unknown_tag_has_no_side_effects() {
    let h = harness(None, false);

    let outcome = h
        .workflow
        .save(&photo(42, vec![variant("f", 10, 10)]), "x")
        .await
        .unwrap();

    assert_eq!(outcome, SaveOutcome::UnknownTag("x".to_string()));
    assert!(h.fetcher.fetched.lock().is_empty());
    assert!(h.disk.uploads.lock().is_empty());
    assert!(is_empty_dir(&h.workdir));
}

#[tokio::test]
async fn test_save_uses_zero_padded_message_id() {
    let h = harness(None, false);
    h.registry.map(CHAT_ID, "cats", "Animals/Cats").unwrap();

    let outcome = h
        .workflow
        .save(&photo(42, vec![variant("f", 10, 10)]), "cats")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            path: "Animals/Cats/0000000042.jpg".to_string(),
            public_url: None,
        }
    );
    assert_eq!(*h.disk.uploads.lock(), vec!["/Photos/Animals/Cats/0000000042.jpg".to_string()]);
    assert!(h.disk.paths.lock().contains("/Photos/Animals"));
    assert!(h.disk.paths.lock().contains("/Photos/Animals/Cats"));
    assert!(is_empty_dir(&h.workdir));
}

#[tokio::test]
async fn test_save_downloads_largest_variant() {
    let h = harness(None, false);
    h.registry.map(CHAT_ID, "cats", "Cats").unwrap();
    let source = photo(
        7,
        vec![variant("a", 100, 100), variant("b", 50, 400), variant("c", 300, 300)],
    );

    h.workflow.save(&source, "cats").await.unwrap();

    assert_eq!(*h.fetcher.fetched.lock(), vec!["c".to_string()]);
}

#[tokio::test]
async fn test_second_save_to_same_path_conflicts_and_cleans_up() {
    let h = harness(None, false);
    h.registry.map(CHAT_ID, "cats", "Cats").unwrap();
    let source = photo(42, vec![variant("f", 10, 10)]);

    h.workflow.save(&source, "cats").await.unwrap();
    let outcome = h.workflow.save(&source, "cats").await.unwrap();

    assert_eq!(outcome, SaveOutcome::Conflict("Cats/0000000042.jpg".to_string()));
    assert_eq!(h.fetcher.fetched.lock().len(), 2);
    assert_eq!(h.disk.uploads.lock().len(), 1);
    assert!(is_empty_dir(&h.workdir));
}

#[tokio::test]
async fn test_chat_prefix_avoids_cross_chat_collisions() {
    let h = harness(None, true);
    h.registry.map(1, "cats", "Cats").unwrap();
    h.registry.map(2, "cats", "Cats").unwrap();
    let first = spike::core::PhotoMessage {
        chat_id: 1,
        message_id: 42,
        photos: vec![variant("f", 10, 10)],
    };
    let second = spike::core::PhotoMessage { chat_id: 2, ..first.clone() };

    let a = h.workflow.save(&first, "cats").await.unwrap();
    let b = h.workflow.save(&second, "cats").await.unwrap();

    assert!(matches!(a, SaveOutcome::Saved { ref path, .. } if path == "Cats/1_0000000042.jpg"));
    assert!(matches!(b, SaveOutcome::Saved { ref path, .. } if path == "Cats/2_0000000042.jpg"));
}

#[tokio::test]
async fn test_public_url_is_returned() {
    let h = harness(Some("https://disk.example/d/abc"), false);
    h.registry.map(CHAT_ID, "trip", "Summer trip").unwrap();

    let outcome = h
        .workflow
        .save(&photo(5, vec![variant("f", 10, 10)]), "trip")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            path: "Summer trip/0000000005.jpg".to_string(),
            public_url: Some("https://disk.example/d/abc/Summer%20trip/0000000005.jpg".to_string()),
        }
    );
}

#[tokio::test]
async fn test_message_without_variants() {
    let h = harness(None, false);
    h.registry.map(CHAT_ID, "cats", "Cats").unwrap();

    let outcome = h.workflow.save(&photo(5, vec![]), "cats").await.unwrap();

    assert_eq!(outcome, SaveOutcome::NoPhotoFound);
    assert!(h.fetcher.fetched.lock().is_empty());
}

/// Writes the first bytes of the photo, then the connection drops
struct InterruptedFetcher;

#[async_trait]
impl PhotoFetcher for InterruptedFetcher {
    async fn fetch(&self, _photo: &PhotoVariant, destination: &Path) -> AppResult<()> {
        fs_err::tokio::write(destination, b"\xFF\xD8").await?;
        Err(AppError::Io(std::io::Error::new(ErrorKind::ConnectionReset, "connection reset")))
    }
}

/// Remote disk whose uploads fail with a server error
struct UnavailableDisk;

#[async_trait]
impl DiskApi for UnavailableDisk {
    async fn exists(&self, _path: &str) -> Result<bool, DiskError> {
        Ok(true)
    }

    async fn mkdir(&self, _path: &str) -> Result<(), DiskError> {
        Ok(())
    }

    async fn upload(&self, local_path: &Path, _path: &str) -> Result<(), DiskError> {
        assert!(local_path.exists(), "scratch file missing during upload");
        Err(DiskError::Api {
            status: 503,
            code: "ServiceUnavailable".to_string(),
            description: "try again later".to_string(),
        })
    }
}

fn failing_workflow(fetcher: Arc<dyn PhotoFetcher>, disk: Arc<dyn DiskApi>, workdir: &TempDir) -> SaveWorkflow {
    let pool = Arc::new(create_pool(IN_MEMORY).unwrap());
    let registry = TagRegistry::new(Arc::new(SqliteTagStore::new(pool)));
    registry.map(CHAT_ID, "cats", "Cats").unwrap();
    SaveWorkflow::new(
        registry,
        fetcher,
        RemoteDisk::new(disk, "/Photos", None),
        workdir.path().to_path_buf(),
        FileNaming { prefix_chat_id: false },
    )
}

#[tokio::test]
async fn test_failed_download_removes_partial_file() {
    let workdir = tempfile::tempdir().unwrap();
    let disk = Arc::new(FakeDisk::default());
    let workflow = failing_workflow(Arc::new(InterruptedFetcher), disk.clone(), &workdir);

    let result = workflow.save(&photo(42, vec![variant("f", 10, 10)]), "cats").await;

    assert!(matches!(result, Err(AppError::Io(_))), "unexpected result: {result:?}");
    assert!(disk.uploads.lock().is_empty());
    assert!(is_empty_dir(&workdir));
}

#[tokio::test]
async fn test_failed_upload_removes_scratch_file() {
    let workdir = tempfile::tempdir().unwrap();
    let workflow = failing_workflow(Arc::new(FakeFetcher::default()), Arc::new(UnavailableDisk), &workdir);

    let result = workflow.save(&photo(42, vec![variant("f", 10, 10)]), "cats").await;

    assert!(
        matches!(result, Err(AppError::Disk(DiskError::Api { status: 503, .. }))),
        "unexpected result: {result:?}"
    );
    assert!(is_empty_dir(&workdir));
}
