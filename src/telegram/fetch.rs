use std::path::Path;

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tokio::io::AsyncWriteExt;

use crate::core::error::AppResult;
use crate::core::types::PhotoVariant;
use crate::save::PhotoFetcher;

/// Downloads photos through the Bot API file endpoint
pub struct TelegramFetcher {
    bot: Bot,
}

impl TelegramFetcher {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl PhotoFetcher for TelegramFetcher {
    async fn fetch(&self, photo: &PhotoVariant, destination: &Path) -> AppResult<()> {
        let file = self.bot.get_file(FileId(photo.file_id.clone())).await?;
        log::debug!(
            "File info retrieved: path = {}, size = {} bytes ({}x{})",
            file.path,
            file.size,
            photo.width,
            photo.height
        );

        let mut dst = fs_err::tokio::File::create(destination).await?;
        self.bot.download_file(&file.path, &mut dst).await?;
        dst.flush().await?;

        Ok(())
    }
}
