//! Dispatcher schema

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::event::IncomingMessage;
use crate::telegram::replies::BotReplier;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Every message goes through the [`crate::telegram::router::Router`], which
/// classifies it and decides what to do. Edited messages and other update
/// kinds are not handled.
///
/// # Arguments
/// * `deps` - Handler dependencies
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry().branch(message_handler(deps))
}

/// Handler for every new message
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let deps = deps.clone();
        async move {
            let incoming = IncomingMessage::from(&msg);
            let replier = BotReplier::new(bot);

            // Failures are logged, the dispatcher keeps serving other updates
            if let Err(e) = deps.router.handle(&incoming, &replier).await {
                log::error!(
                    "Failed to handle message {} in chat {}: {}",
                    incoming.message_id,
                    incoming.chat_id,
                    e
                );
            }
            Ok(())
        }
    })
}
