use std::sync::Arc;

use prbot_core::{
    config::{BotConfig, ProcessEnv},
    router::CommandRouter,
};
use prbot_github::OctocrabSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    prbot_core::logging::init("prbot")?;

    let cfg = Arc::new(BotConfig::load()?);
    let source = Arc::new(OctocrabSource::new(&cfg.github_api_url)?);
    tracing::info!(api = %cfg.github_api_url, "using GitHub API");

    let router = CommandRouter::new(
        Arc::new(cfg.watched_repos.clone()),
        Arc::new(ProcessEnv),
        source,
    );

    prbot_telegram::router::run_polling(cfg, router)
        .await
        .map_err(|e| anyhow::anyhow!("telegram bot failed: {e}"))?;

    Ok(())
}
