use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use medassist::chat::Assistant;
use medassist::config::Config;
use medassist::fallback::WikipediaScraper;
use medassist::llm::create_provider;
use medassist::routes::configure_routes;
use medassist::session::SessionStore;
use medassist::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("medassist=info,warn")),
        )
        .with_writer(std::io::stdout)
        .init();

    let config = Config::from_env().context("loading configuration")?;

    let provider = create_provider(config.gemini.clone())
        .await
        .context("creating Gemini client")?;
    let fallback = WikipediaScraper::new(config.wiki_base_url.clone())
        .context("creating Wikipedia client")?;

    let assistant = Assistant::new(provider, Arc::new(fallback), config.generation.clone());
    let sessions = SessionStore::with_capacity(config.max_sessions);
    let state = AppState::with_sessions(assistant, sessions, config.branding.clone());
    let routes = configure_routes(state);

    info!(
        addr = %config.addr,
        model = %config.gemini.model,
        "Starting server"
    );
    warp::serve(routes).run(config.addr).await;

    Ok(())
}
