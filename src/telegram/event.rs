//! Inbound messages and their classification
//!
//! [`IncomingMessage`] is the part of a Telegram message the bot cares about.
//! [`InboundEvent`] is the closed set of things a message can mean to the bot.

use teloxide::types::Message;

use crate::core::types::{PhotoMessage, PhotoVariant};

/// A Telegram message reduced to what the handlers need
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub photos: Vec<PhotoVariant>,
    pub media_group_id: Option<String>,
    pub reply_to: Option<Box<IncomingMessage>>,
}

impl IncomingMessage {
    pub fn has_photo(&self) -> bool {
        !self.photos.is_empty()
    }

    /// The photo part of this message, if it carries one
    pub fn photo_message(&self) -> Option<PhotoMessage> {
        if !self.has_photo() {
            return None;
        }
        Some(PhotoMessage {
            chat_id: self.chat_id,
            message_id: self.message_id,
            photos: self.photos.clone(),
        })
    }
}

impl From<&Message> for IncomingMessage {
    fn from(msg: &Message) -> Self {
        let photos = msg
            .photo()
            .map(|sizes| {
                sizes
                    .iter()
                    .map(|size| PhotoVariant {
                        file_id: size.file.id.to_string(),
                        width: size.width,
                        height: size.height,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            chat_id: msg.chat.id.0,
            message_id: msg.id.0,
            text: msg.text().map(str::to_string),
            caption: msg.caption().map(str::to_string),
            photos,
            media_group_id: msg.media_group_id().map(|id| id.to_string()),
            reply_to: msg.reply_to_message().map(|reply| Box::new(IncomingMessage::from(reply))),
        }
    }
}

/// What an inbound message asks the bot to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// `/map TAG CATEGORY...`
    Map(Vec<String>),
    /// `/save TAG` sent as a text command
    Save(Vec<String>),
    /// `/tags`
    ListTags,
    /// `/start` or `/help`
    Help,
    /// A photo, possibly with a `/save TAG` caption
    Photo,
    /// Anything else
    Ignored,
}

impl InboundEvent {
    /// Classifies a message. Commands addressed to another bot are ignored.
    pub fn classify(msg: &IncomingMessage, bot_username: &str) -> Self {
        if let Some(text) = msg.text.as_deref() {
            if let Some((name, args)) = parse_command(text, bot_username) {
                return match name.as_str() {
                    "map" => InboundEvent::Map(args),
                    "save" => InboundEvent::Save(args),
                    "tags" => InboundEvent::ListTags,
                    "start" | "help" => InboundEvent::Help,
                    _ => InboundEvent::Ignored,
                };
            }
        }

        if msg.has_photo() {
            return InboundEvent::Photo;
        }

        InboundEvent::Ignored
    }
}

/// Splits `/name@bot arg1 arg2` into the lowercase command name and its
/// whitespace-separated arguments.
pub fn parse_command(text: &str, bot_username: &str) -> Option<(String, Vec<String>)> {
    let mut words = text.split_whitespace();
    let head = words.next()?.strip_prefix('/')?;

    let name = match head.split_once('@') {
        Some((name, addressee)) if addressee.eq_ignore_ascii_case(bot_username) => name,
        Some(_) => return None,
        None => head,
    };
    if name.is_empty() {
        return None;
    }

    Some((name.to_lowercase(), words.map(str::to_string).collect()))
}

/// Whether a caption word is the save command, with or without the bot mention
pub fn is_save_command(word: &str, bot_username: &str) -> bool {
    match word.split_once('@') {
        Some((name, addressee)) => name == "/save" && addressee.eq_ignore_ascii_case(bot_username),
        None => word == "/save",
    }
}
