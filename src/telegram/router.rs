//! Routing of inbound messages to the map / save / list actions
//!
//! Independent of teloxide's handler tree so the whole flow can be driven
//! from tests with fake storage and a recording [`Replier`].

use std::sync::Arc;

use teloxide::utils::command::BotCommands;

use super::bot::Command;
use super::event::{is_save_command, IncomingMessage, InboundEvent};
use super::replies::{self, Replier, Reply};
use crate::core::error::AppResult;
use crate::core::types::PhotoMessage;
use crate::save::{SaveOutcome, SaveWorkflow};
use crate::storage::{MediaGroupStore, TagRegistry};

pub struct Router {
    registry: TagRegistry,
    media_groups: Arc<dyn MediaGroupStore>,
    workflow: SaveWorkflow,
    bot_username: String,
}

impl Router {
    pub fn new(
        registry: TagRegistry,
        media_groups: Arc<dyn MediaGroupStore>,
        workflow: SaveWorkflow,
        bot_username: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            media_groups,
            workflow,
            bot_username: bot_username.into(),
        }
    }

    /// Handles one inbound message to completion
    ///
    /// User mistakes are answered in the chat. Any `Err` is an infrastructure
    /// failure; replies sent before it stay sent.
    pub async fn handle(&self, msg: &IncomingMessage, replier: &dyn Replier) -> AppResult<()> {
        log::info!(
            "Got message {} in chat {} (text: {:?}, caption: {:?}, photos: {}, media group: {:?})",
            msg.message_id,
            msg.chat_id,
            msg.text,
            msg.caption,
            msg.photos.len(),
            msg.media_group_id
        );

        if let (Some(media_group_id), Some(photo)) = (&msg.media_group_id, msg.photo_message()) {
            self.media_groups.add_message(media_group_id, &photo)?;
        }

        match InboundEvent::classify(msg, &self.bot_username) {
            InboundEvent::Map(args) => self.map(msg, &args, replier).await,
            InboundEvent::Save(args) => self.save_from_reply(msg, &args, replier).await,
            InboundEvent::ListTags => self.list_tags(msg, replier).await,
            InboundEvent::Help => {
                let text = replies::help(&Command::descriptions().to_string());
                replier.reply(Reply::new(msg.chat_id, msg.message_id, text)).await
            }
            InboundEvent::Photo => self.save_from_photo(msg, replier).await,
            InboundEvent::Ignored => Ok(()),
        }
    }

    async fn map(&self, msg: &IncomingMessage, args: &[String], replier: &dyn Replier) -> AppResult<()> {
        let [tag, category @ ..] = args else {
            return replier.reply(Reply::new(msg.chat_id, msg.message_id, replies::MAP_USAGE)).await;
        };
        if category.is_empty() {
            return replier.reply(Reply::new(msg.chat_id, msg.message_id, replies::MAP_USAGE)).await;
        }

        let category = category.join(" ");
        let change = self.registry.map(msg.chat_id, tag, &category)?;
        let text = replies::mapped(tag, &category, &change);
        replier.reply(Reply::new(msg.chat_id, msg.message_id, text)).await
    }

    async fn list_tags(&self, msg: &IncomingMessage, replier: &dyn Replier) -> AppResult<()> {
        let mappings = self.registry.list(msg.chat_id)?;
        replier
            .reply(Reply::new(msg.chat_id, msg.message_id, replies::tag_list(&mappings)))
            .await
    }

    /// `/save TAG`, sent with a photo or as a reply to one
    async fn save_from_reply(&self, msg: &IncomingMessage, args: &[String], replier: &dyn Replier) -> AppResult<()> {
        let source = if msg.has_photo() {
            msg
        } else if let Some(reply_to) = msg.reply_to.as_deref().filter(|reply_to| reply_to.has_photo()) {
            reply_to
        } else {
            return replier.reply(Reply::new(msg.chat_id, msg.message_id, replies::NO_PHOTO)).await;
        };

        let [tag] = args else {
            return replier
                .reply(Reply::new(msg.chat_id, msg.message_id, replies::EXACTLY_ONE_TAG))
                .await;
        };

        let Some(photo) = source.photo_message() else {
            return replier.reply(Reply::new(msg.chat_id, msg.message_id, replies::NO_PHOTO)).await;
        };

        match &source.media_group_id {
            Some(media_group_id) => {
                self.media_groups.add_tag(msg.chat_id, media_group_id, tag)?;
                let mut photos = self.media_groups.messages(msg.chat_id, media_group_id)?;
                // The replied-to photo may predate the bot or its database
                if !photos.iter().any(|p| p.message_id == photo.message_id) {
                    photos.insert(0, photo);
                }
                log::info!("Saving {} photo(s) of media group {} as '{}'", photos.len(), media_group_id, tag);
                for photo in &photos {
                    self.save_photo_for_tag(msg, photo, tag, replier).await?;
                }
                Ok(())
            }
            None => self.save_photo_for_tag(msg, &photo, tag, replier).await,
        }
    }

    /// A photo message: either part of an already tagged media group, or
    /// captioned `/save TAG`
    async fn save_from_photo(&self, msg: &IncomingMessage, replier: &dyn Replier) -> AppResult<()> {
        let Some(photo) = msg.photo_message() else {
            return Ok(());
        };

        if let Some(media_group_id) = &msg.media_group_id {
            let tags = self.media_groups.tags(msg.chat_id, media_group_id)?;
            if !tags.is_empty() {
                for tag in &tags {
                    self.save_photo_for_tag(msg, &photo, tag, replier).await?;
                }
                return Ok(());
            }
        }

        let Some(caption) = msg.caption.as_deref() else {
            return Ok(());
        };
        let parts: Vec<&str> = caption.split_whitespace().collect();
        if !parts.iter().any(|part| is_save_command(part, &self.bot_username)) {
            return Ok(());
        }

        let tag = match parts.as_slice() {
            [command, tag] if is_save_command(command, &self.bot_username) => *tag,
            _ => {
                return replier
                    .reply(Reply::new(msg.chat_id, msg.message_id, replies::SAVE_USAGE))
                    .await;
            }
        };

        if let Some(media_group_id) = &msg.media_group_id {
            self.media_groups.add_tag(msg.chat_id, media_group_id, tag)?;
        }
        self.save_photo_for_tag(msg, &photo, tag, replier).await
    }

    /// Runs the save workflow and reports the outcome
    ///
    /// An unknown tag is answered on the photo, everything else on the
    /// message that triggered the save.
    async fn save_photo_for_tag(
        &self,
        trigger: &IncomingMessage,
        source: &PhotoMessage,
        tag: &str,
        replier: &dyn Replier,
    ) -> AppResult<()> {
        let outcome = self.workflow.save(source, tag).await?;
        let text = replies::save_outcome(&outcome);

        let reply = match &outcome {
            SaveOutcome::UnknownTag(_) => Reply::new(source.chat_id, source.message_id, text),
            SaveOutcome::Saved {
                public_url: Some(_), ..
            } => Reply::new(trigger.chat_id, trigger.message_id, text).without_preview(),
            _ => Reply::new(trigger.chat_id, trigger.message_id, text),
        };
        replier.reply(reply).await
    }
}
