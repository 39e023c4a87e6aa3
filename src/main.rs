use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;

use spike::cli::Cli;
use spike::core::{init_logger, AppConfig};
use spike::disk::{RemoteDisk, YandexDisk};
use spike::save::{FileNaming, SaveWorkflow};
use spike::storage::{create_pool, SqliteMediaGroupStore, SqliteTagStore, TagRegistry};
use spike::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, Router, TelegramFetcher};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (config, logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics from handler tasks instead of losing them in stderr noise
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {}", panic_info);
    }));

    // Load environment variables from .env if present, before the config
    // picks up SPIKE_* overrides
    let _ = dotenv();

    let config = AppConfig::load(&cli.config)?;
    config.prepare_workdir()?;
    init_logger(&config.log_file_path())?;

    log::info!("Config loaded from {}", cli.config.display());
    run_bot(config).await
}

async fn run_bot(config: AppConfig) -> Result<()> {
    let db_pool = Arc::new(create_pool(&config.database_path().to_string_lossy())?);
    let registry = TagRegistry::new(Arc::new(SqliteTagStore::new(Arc::clone(&db_pool))));
    let media_groups = Arc::new(SqliteMediaGroupStore::new(Arc::clone(&db_pool)));

    let bot = create_bot(&config)?;
    let me = bot.get_me().await?;
    log::info!("Authorized as @{}", me.username());

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let disk = RemoteDisk::new(
        Arc::new(YandexDisk::new(&config.yadisk)?),
        config.yadisk.root_dir.clone(),
        config.yadisk.public_url.clone(),
    );
    log::info!(
        "Saving to Yandex.Disk '{}' (public links: {})",
        config.yadisk.root_dir,
        config.yadisk.public_url.is_some()
    );

    let workflow = SaveWorkflow::new(
        registry.clone(),
        Arc::new(TelegramFetcher::new(bot.clone())),
        disk,
        config.workdir.clone(),
        FileNaming {
            prefix_chat_id: config.prefix_chat_id,
        },
    );
    let router = Router::new(registry, media_groups, workflow, me.username());
    let handler = schema(HandlerDeps::new(Arc::new(router)));

    log::info!("Starting bot in long polling mode");
    let listener = teloxide::update_listeners::Polling::builder(bot.clone()).build();
    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
