use std::sync::Arc;

use anyhow::Context;
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gofile_relay::{AppContext, Config, bot, health};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("configuration")?;
    info!(api_id = config.api_id, port = config.health_port, "configuration loaded");

    let telegram = Bot::new(config.bot_token.clone());
    let ctx = Arc::new(AppContext::new(config.clone()));

    let liveness = tokio::spawn(health::serve(config.health_port));
    let dispatcher = tokio::spawn(bot::run(telegram, ctx));

    // Both tasks are expected to run forever; whichever exits first takes
    // the process down with it.
    tokio::select! {
        result = liveness => result.context("liveness server task")??,
        result = dispatcher => result.context("bot dispatcher task")?,
    }

    Ok(())
}
