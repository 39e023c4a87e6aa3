//! Persistent bot state: tag mappings and media group accumulation

pub mod db;
pub mod media_groups;
pub mod tags;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use media_groups::{MediaGroupStore, SqliteMediaGroupStore};
pub use tags::{MapChange, SqliteTagStore, TagMapping, TagRegistry, TagStore};
