use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ylink_core::ConfigManager;
use ylink_site::config::{Args, ServerConfig};
use ylink_site::content::InMemoryContentRepository;
use ylink_site::router::build_app_router;
use ylink_site::session::SessionCodec;
use ylink_site::state::AppState;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = ServerConfig::from(&args);

    let mut tool_config = ConfigManager::new(Some(args.tool_config.clone()));
    let tools = tool_config
        .load()
        .with_context(|| format!("loading {}", tool_config.config_path().display()))?;
    log::info!("Tool settings loaded from {}", tool_config.config_path().display());

    let content = match &args.content {
        Some(path) => InMemoryContentRepository::load(path)?,
        None => {
            log::warn!("No content snapshot configured, locale routes and pilot checks will find nothing");
            InMemoryContentRepository::default()
        }
    };
    let content = Arc::new(content);

    let sessions = SessionCodec::new(&config.session_secret)
        .map_err(|e| anyhow::anyhow!("invalid session secret: {}", e))?;

    let state = AppState {
        content: content.clone(),
        pilots: content.clone(),
        subscriptions: content,
        sessions,
        tools: Arc::new(tools),
    };

    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("binding {}", config.bind_address()))?;
    log::info!("Y-Link site listening on {}", config.bind_address());

    axum::serve(listener, app).await?;
    Ok(())
}
