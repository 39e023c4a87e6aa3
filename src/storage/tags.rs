//! Tag registry: per-chat mapping from short tags to category directories

use std::sync::Arc;

use rusqlite::{params, OptionalExtension};

use super::db::{get_connection, DbPool};
use crate::core::error::AppResult;

/// One tag of a chat and the category it points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMapping {
    pub tag: String,
    pub category: String,
}

/// Persistence behind the [`TagRegistry`]
///
/// Keys are unique per chat, the last `put` wins. Categories are not unique:
/// several tags may share one.
pub trait TagStore: Send + Sync {
    fn get(&self, chat_id: i64, tag: &str) -> AppResult<Option<String>>;

    /// Stores the mapping and returns the category it replaced, if any.
    fn put(&self, chat_id: i64, tag: &str, category: &str) -> AppResult<Option<String>>;

    /// All mappings of a chat, ordered by tag.
    fn list(&self, chat_id: i64) -> AppResult<Vec<TagMapping>>;

    /// Records a category in the bot-wide set. Returns `true` if it was not known yet.
    fn add_category(&self, category: &str) -> AppResult<bool>;
}

/// SQLite-backed [`TagStore`]
pub struct SqliteTagStore {
    pool: Arc<DbPool>,
}

impl SqliteTagStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl TagStore for SqliteTagStore {
    fn get(&self, chat_id: i64, tag: &str) -> AppResult<Option<String>> {
        let conn = get_connection(&self.pool)?;
        let category = conn
            .query_row(
                "SELECT category FROM tag_mappings WHERE chat_id = ?1 AND tag = ?2",
                params![chat_id, tag],
                |row| row.get(0),
            )
            .optional()?;
        Ok(category)
    }

    fn put(&self, chat_id: i64, tag: &str, category: &str) -> AppResult<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;

        let previous: Option<String> = tx
            .query_row(
                "SELECT category FROM tag_mappings WHERE chat_id = ?1 AND tag = ?2",
                params![chat_id, tag],
                |row| row.get(0),
            )
            .optional()?;
        tx.execute(
            "INSERT INTO tag_mappings (chat_id, tag, category) VALUES (?1, ?2, ?3)
             ON CONFLICT(chat_id, tag) DO UPDATE SET
                category = excluded.category,
                updated_at = CURRENT_TIMESTAMP",
            params![chat_id, tag, category],
        )?;
        tx.commit()?;

        Ok(previous)
    }

    fn list(&self, chat_id: i64) -> AppResult<Vec<TagMapping>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare("SELECT tag, category FROM tag_mappings WHERE chat_id = ?1 ORDER BY tag")?;
        let rows = stmt.query_map(params![chat_id], |row| {
            Ok(TagMapping {
                tag: row.get(0)?,
                category: row.get(1)?,
            })
        })?;

        let mut mappings = Vec::new();
        for row in rows {
            mappings.push(row?);
        }
        Ok(mappings)
    }

    fn add_category(&self, category: &str) -> AppResult<bool> {
        let conn = get_connection(&self.pool)?;
        let inserted = conn.execute("INSERT OR IGNORE INTO categories (name) VALUES (?1)", params![category])?;
        Ok(inserted > 0)
    }
}

/// Result of [`TagRegistry::map`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapChange {
    /// Category the tag pointed to before, if it was mapped
    pub previous: Option<String>,
    /// The category had never been used by any chat before
    pub new_category: bool,
}

/// Tag lookup and update for the bot, shared by handlers and the save workflow
#[derive(Clone)]
pub struct TagRegistry {
    store: Arc<dyn TagStore>,
}

impl TagRegistry {
    pub fn new(store: Arc<dyn TagStore>) -> Self {
        Self { store }
    }

    /// Associates `tag` with `category` in the chat, overwriting silently.
    pub fn map(&self, chat_id: i64, tag: &str, category: &str) -> AppResult<MapChange> {
        let previous = self.store.put(chat_id, tag, category)?;
        let new_category = self.store.add_category(category)?;

        match &previous {
            Some(old) if old != category => {
                log::info!("Chat {}: remapped '{}' from '{}' to '{}'", chat_id, tag, old, category)
            }
            Some(_) => {}
            None => log::info!("Chat {}: mapped '{}' to '{}'", chat_id, tag, category),
        }
        if new_category {
            log::info!("New category: '{}'", category);
        }

        Ok(MapChange { previous, new_category })
    }

    /// Looks the tag up. An unmapped tag is not an error.
    pub fn resolve(&self, chat_id: i64, tag: &str) -> AppResult<Option<String>> {
        self.store.get(chat_id, tag)
    }

    pub fn list(&self, chat_id: i64) -> AppResult<Vec<TagMapping>> {
        self.store.list(chat_id)
    }
}
