//! Platform-neutral message types shared by storage, the save workflow and the bot

use serde::{Deserialize, Serialize};

/// One resolution of a photo as offered by the chat platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoVariant {
    /// Platform handle used to download this variant
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

impl PhotoVariant {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A message carrying a photo, reduced to what the save workflow needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub photos: Vec<PhotoVariant>,
}
