mod config;
mod errors;
mod ingest;
mod matching;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::matching::engine::MatchEngine;
use crate::matching::scorer::ScoringOptions;
use crate::matching::vocabulary::SkillVocabulary;
use crate::matching::weights::WeightTable;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Relevance API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize matching engine (immutable; shared by every request)
    let engine = Arc::new(build_engine(&config));
    info!(
        vocabulary = engine.vocabulary().len(),
        weights = engine.default_weights().entries().len(),
        clamp_score = engine.options().clamp_score,
        frequency_boost = engine.options().frequency_boost,
        "Matching engine initialized"
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        engine,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the upload UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the engine from config: default vocabulary, default weights unless
/// `SKILL_WEIGHTS` replaces them, and the configured scoring options.
fn build_engine(config: &Config) -> MatchEngine {
    let weights = config
        .skill_weights
        .clone()
        .unwrap_or_else(WeightTable::defaults);
    let options = ScoringOptions {
        frequency_boost: config.frequency_boost,
        clamp_score: config.clamp_score,
    };
    MatchEngine::new(SkillVocabulary::default(), weights, options)
        .with_top_matched(config.feedback_top_matched)
}
