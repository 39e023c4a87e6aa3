//! Bot initialization and the command menu

use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config::AppConfig;

/// Bot commands, as shown in `/help` and the Telegram command menu
///
/// Parsing happens in [`super::event::parse_command`]; this enum only
/// describes the commands.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Tag photos and save them to Yandex.Disk:")]
pub enum Command {
    #[command(description = "show this help")]
    Start,
    #[command(description = "show this help")]
    Help,
    #[command(description = "map a tag to a directory: /map TAG DIRECTORY_NAME")]
    Map,
    #[command(description = "save a photo, send it as a reply or caption: /save TAG")]
    Save,
    #[command(description = "list the tags of this chat")]
    Tags,
}

/// Creates a Bot instance with the configured token
///
/// The HTTP client gets a timeout long enough for long polling.
pub fn create_bot(config: &AppConfig) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new()
        .timeout(std::time::Duration::from_secs(60))
        .build()?;
    Ok(Bot::with_client(config.telegram_token.expose_secret(), client))
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    // /start is implied by Telegram clients, no need to list it
    let commands = Command::bot_commands()
        .into_iter()
        .filter(|command| command.command.trim_start_matches('/') != "start")
        .collect::<Vec<_>>();
    bot.set_my_commands(commands).await?;
    Ok(())
}
