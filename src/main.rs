use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use teloxide::Bot;
use tracing::info;

use rentsms::{Config, InMemoryRentalStore, SessionController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rentsms=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("failed to read configuration")?;
    let gateway = config
        .gateway_client()
        .context("failed to set up the SMS gateway client")?;

    info!(
        endpoint = %config.endpoint,
        service = config.service.as_str(),
        number_api = ?config.number_api,
        "Starting rentsms bot"
    );

    let controller = Arc::new(SessionController::new(
        Arc::new(gateway),
        Arc::new(InMemoryRentalStore::new()),
        config.service.clone(),
    ));

    // Timeout must exceed the long-polling timeout.
    let http = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("failed to build the Telegram HTTP client")?;
    let bot = Bot::with_client(config.bot_token.clone(), http);

    rentsms::bot::run(bot, controller).await;
    Ok(())
}
