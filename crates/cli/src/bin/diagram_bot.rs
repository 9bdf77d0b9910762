//! `diagram-bot`: Telegram front end that answers `/block` commands with
//! flowchart images from the diagram engine.

use std::sync::Arc;

use anyhow::Context;
use bot::{run_polling, BlockCommandHandler, BotConfig, HttpDiagramClient, RateLimiter, TelegramClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let telemetry = cli::telemetry::init("diagram-bot")?;

    let config = BotConfig::from_lookup(cli::env_var).context("invalid bot configuration")?;
    tracing::info!(?config, "starting diagram bot");

    tokio::fs::create_dir_all(&config.temp_dir)
        .await
        .with_context(|| format!("failed to create {}", config.temp_dir.display()))?;

    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;
    let telegram = Arc::new(TelegramClient::new(
        http.clone(),
        &config.telegram_api_base,
        &config.telegram_token,
    ));
    let diagrams = Arc::new(HttpDiagramClient::new(http, config.diagram_url.clone()));
    let handler = Arc::new(BlockCommandHandler::new(
        telegram.clone(),
        diagrams,
        RateLimiter::new(config.cooldown),
        config.temp_dir.clone(),
    ));

    run_polling(telegram, handler, cli::shutdown_signal()).await;
    telemetry.shutdown();
    Ok(())
}
