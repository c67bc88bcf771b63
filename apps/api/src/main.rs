use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use internlink_api::config::Config;
use internlink_api::llm_client::{self, LlmClient};
use internlink_api::recommendation::reasons::{LlmReasonWriter, ReasonWriter, TemplateReasonWriter};
use internlink_api::routes::build_router;
use internlink_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting InternLink API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (optional, used by reason polish and the assistant)
    let llm = match &config.anthropic_api_key {
        Some(key) => {
            let client =
                LlmClient::new(key.clone())?.with_base_url(&config.anthropic_base_url);
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            info!("ANTHROPIC_API_KEY not set; assistant disabled, reasons templated");
            None
        }
    };

    // Initialize reason writer (TemplateReasonWriter unless ENABLE_LLM_REASONS is set)
    let reason_writer: Arc<dyn ReasonWriter> = match (&llm, config.enable_llm_reasons) {
        (Some(client), true) => Arc::new(LlmReasonWriter::new(
            client.clone(),
            config.reason_timeout,
        )),
        (None, true) => {
            warn!("ENABLE_LLM_REASONS is set without ANTHROPIC_API_KEY; using templated reasons");
            Arc::new(TemplateReasonWriter)
        }
        (_, false) => Arc::new(TemplateReasonWriter),
    };
    info!(
        "Ranking: threshold={} weights={:?} reasons={}",
        config.ranking.min_relevance_threshold,
        config.ranking.weights,
        reason_writer.backend()
    );

    // Build app state
    let state = AppState {
        llm,
        config: config.clone(),
        reason_writer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins to the web client's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
