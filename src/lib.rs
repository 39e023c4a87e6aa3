//! Spike - Telegram bot that files tagged photos into Yandex.Disk folders
//!
//! Users map short tags to directory names with `/map`, then tag photos with
//! `/save TAG` (as a caption or a reply). The bot downloads the largest
//! version of the photo and uploads it to `<root>/<category>/`.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, shared types
//! - `storage`: SQLite persistence for tag mappings and media groups
//! - `disk`: remote storage (Yandex.Disk)
//! - `save`: the photo save workflow
//! - `telegram`: Telegram bot integration and handlers

pub mod cli;
pub mod core;
pub mod disk;
pub mod save;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{AppConfig, AppError, AppResult};
pub use save::{SaveOutcome, SaveWorkflow};
pub use storage::{create_pool, get_connection, DbConnection, DbPool, TagRegistry};
pub use telegram::{schema, HandlerDeps, Router};
