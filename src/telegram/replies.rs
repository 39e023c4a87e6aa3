//! Reply texts (MarkdownV2) and how they reach the chat

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{LinkPreviewOptions, MessageId, ParseMode, ReplyParameters};

use crate::core::error::AppResult;
use crate::core::utils::{code, escape_markdown_v2, link};
use crate::save::SaveOutcome;
use crate::storage::{MapChange, TagMapping};

pub const MAP_USAGE: &str = "Usage: `/map TAG DIRECTORY_NAME`";
pub const SAVE_USAGE: &str = "Usage: `/save TAG`";
pub const NO_PHOTO: &str = "You must reply to a message with a photo to save it";
pub const EXACTLY_ONE_TAG: &str = "You must provide exactly one tag";

/// A MarkdownV2 message sent as a reply to `reply_to` in `chat_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub chat_id: i64,
    pub reply_to: i32,
    pub text: String,
    pub disable_preview: bool,
}

impl Reply {
    pub fn new(chat_id: i64, reply_to: i32, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            reply_to,
            text: text.into(),
            disable_preview: false,
        }
    }

    pub fn without_preview(mut self) -> Self {
        self.disable_preview = true;
        self
    }
}

/// Where replies go
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, reply: Reply) -> AppResult<()>;
}

/// Sends replies through the Bot API
pub struct BotReplier {
    bot: Bot,
}

impl BotReplier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Replier for BotReplier {
    async fn reply(&self, reply: Reply) -> AppResult<()> {
        let mut request = self
            .bot
            .send_message(ChatId(reply.chat_id), reply.text)
            .parse_mode(ParseMode::MarkdownV2)
            .reply_parameters(ReplyParameters::new(MessageId(reply.reply_to)));
        if reply.disable_preview {
            request = request.link_preview_options(LinkPreviewOptions {
                is_disabled: true,
                url: None,
                prefer_small_media: false,
                prefer_large_media: false,
                show_above_text: false,
            });
        }
        request.await?;
        Ok(())
    }
}

pub fn mapped(tag: &str, category: &str, change: &MapChange) -> String {
    let mut text = format!("Mapped {} to {}", code(tag), code(category));
    if let Some(previous) = change.previous.as_deref().filter(|previous| *previous != category) {
        text.push_str(&format!(" \\(was {}\\)", code(previous)));
    }
    if change.new_category {
        text.push_str("\nNew category");
    }
    text
}

pub fn unknown_tag(tag: &str) -> String {
    format!("Unknown tag: {}", code(tag))
}

pub fn tag_list(mappings: &[TagMapping]) -> String {
    if mappings.is_empty() {
        return escape_markdown_v2("No tags mapped yet. Use /map TAG DIRECTORY_NAME");
    }
    let lines: Vec<String> = mappings
        .iter()
        .map(|m| format!("{} → {}", code(&m.tag), code(&m.category)))
        .collect();
    format!("Tags in this chat:\n{}", lines.join("\n"))
}

pub fn help(descriptions: &str) -> String {
    escape_markdown_v2(descriptions)
}

/// Text reporting a save outcome
pub fn save_outcome(outcome: &SaveOutcome) -> String {
    match outcome {
        SaveOutcome::Saved {
            public_url: Some(url), ..
        } => link("Saved", url),
        SaveOutcome::Saved { path, public_url: None } => format!("Saved to {}", code(path)),
        SaveOutcome::UnknownTag(tag) => unknown_tag(tag),
        SaveOutcome::Conflict(path) => format!("Could not save because file already exists: {}", code(path)),
        SaveOutcome::NoPhotoFound => NO_PHOTO.to_string(),
    }
}
