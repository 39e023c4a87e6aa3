//! Telegram bot integration and handlers

pub mod bot;
pub mod event;
pub mod fetch;
pub mod handlers;
pub mod replies;
pub mod router;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use event::{IncomingMessage, InboundEvent};
pub use fetch::TelegramFetcher;
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use replies::{BotReplier, Replier, Reply};
pub use router::Router;
