//! Accumulation of multi-photo posts (media groups)
//!
//! Telegram delivers every photo of an album as its own message sharing a
//! `media_group_id`. The bot remembers each photo it sees and the tags applied
//! to the group, so a single `/save` fans out to the whole album and photos
//! arriving after the tag are saved too.

use std::sync::Arc;

use rusqlite::params;

use super::db::{get_connection, DbPool};
use crate::core::error::AppResult;
use crate::core::types::{PhotoMessage, PhotoVariant};

pub trait MediaGroupStore: Send + Sync {
    /// Appends a photo message to the group. Seeing the same message twice is a no-op.
    fn add_message(&self, media_group_id: &str, message: &PhotoMessage) -> AppResult<()>;

    /// Photo messages of the group in arrival order.
    fn messages(&self, chat_id: i64, media_group_id: &str) -> AppResult<Vec<PhotoMessage>>;

    fn add_tag(&self, chat_id: i64, media_group_id: &str, tag: &str) -> AppResult<()>;

    /// Tags applied to the group in the order they were added.
    fn tags(&self, chat_id: i64, media_group_id: &str) -> AppResult<Vec<String>>;
}

/// SQLite-backed [`MediaGroupStore`]; photo variants are kept as JSON
pub struct SqliteMediaGroupStore {
    pool: Arc<DbPool>,
}

impl SqliteMediaGroupStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl MediaGroupStore for SqliteMediaGroupStore {
    fn add_message(&self, media_group_id: &str, message: &PhotoMessage) -> AppResult<()> {
        let photos_json = serde_json::to_string(&message.photos)?;
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "INSERT OR IGNORE INTO media_group_messages (chat_id, media_group_id, message_id, photos_json)
             VALUES (?1, ?2, ?3, ?4)",
            params![message.chat_id, media_group_id, message.message_id, photos_json],
        )?;
        Ok(())
    }

    fn messages(&self, chat_id: i64, media_group_id: &str) -> AppResult<Vec<PhotoMessage>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT message_id, photos_json FROM media_group_messages
             WHERE chat_id = ?1 AND media_group_id = ?2
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![chat_id, media_group_id], |row| {
            Ok((row.get::<_, i32>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let (message_id, photos_json) = row?;
            let photos: Vec<PhotoVariant> = serde_json::from_str(&photos_json)?;
            messages.push(PhotoMessage {
                chat_id,
                message_id,
                photos,
            });
        }
        Ok(messages)
    }

    fn add_tag(&self, chat_id: i64, media_group_id: &str, tag: &str) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "INSERT OR IGNORE INTO media_group_tags (chat_id, media_group_id, tag) VALUES (?1, ?2, ?3)",
            params![chat_id, media_group_id, tag],
        )?;
        Ok(())
    }

    fn tags(&self, chat_id: i64, media_group_id: &str) -> AppResult<Vec<String>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT tag FROM media_group_tags WHERE chat_id = ?1 AND media_group_id = ?2 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![chat_id, media_group_id], |row| row.get(0))?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }
}
