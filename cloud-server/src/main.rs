//! Fraud Detection HTTP Backend
//!
//! Accepts transactions from authenticated users and returns the
//! decision pipeline's verdict with its grounded explanation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    FRAUD RAG SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  API      │  │  Auth     │  │  Decision Pipeline      │ │
//! │  │  Gateway  │  │  Service  │  │  (fraud-rag-core)       │ │
//! │  │  (Axum)   │  │  (JWT)    │  │                         │ │
//! │  └─────┬─────┘  └─────┬─────┘  └────────────┬────────────┘ │
//! │        └──────────────┼─────────────────────┤              │
//! │                       ▼                     ▼              │
//! │                ┌─────────────┐      ┌──────────────┐       │
//! │                │ PostgreSQL  │      │ Event log    │       │
//! │                └─────────────┘      └──────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod models;
mod handlers;
mod middleware;
mod error;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use fraud_rag_core::logic::dataflow::{DataflowHandle, FeatureDataflow, JsonlFeatureSink};
use fraud_rag_core::{DecisionPipeline, PipelineConfig, PipelineDeps};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "fraud_rag_server=debug,fraud_rag_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();
    let pipeline_config = PipelineConfig::from_env();

    tracing::info!("Fraud RAG server starting ({})...", config.environment);
    tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));
    if config.has_insecure_secret() {
        tracing::warn!("JWT_SECRET is the development default");
    }

    // Initialize database pool
    let pool = db::create_pool(&config.database_url).await
        .context("Failed to create database pool")?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await
        .context("Failed to run migrations")?;

    // Decision pipeline
    let store = Arc::new(models::PredictionLogStore::new(pool.clone()));
    let deps = PipelineDeps::from_config(&pipeline_config, store).await
        .context("Failed to initialize decision pipeline")?;
    let pipeline = Arc::new(DecisionPipeline::new(deps));

    // Optional in-process feature dataflow
    let dataflow = if config.feature_dataflow_enabled {
        Some(start_dataflow(&pipeline_config)?)
    } else {
        None
    };

    // Build application state
    let state = AppState {
        pool,
        config: config.clone(),
        pipeline,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = dataflow {
        let stats = tokio::task::spawn_blocking(move || handle.stop()).await??;
        tracing::info!("Feature dataflow stopped: {} emitted, {} skipped", stats.emitted, stats.skipped);
    }

    Ok(())
}

fn start_dataflow(config: &PipelineConfig) -> anyhow::Result<DataflowHandle> {
    let sink = JsonlFeatureSink::new(config.features_output_dir.clone())
        .context("Failed to create feature output directory")?;

    tracing::info!(
        "Feature dataflow: {} -> {}",
        config.csv_path.display(),
        config.features_output_dir.display()
    );

    Ok(FeatureDataflow::new(&config.csv_path, Box::new(sink), config.dataflow_poll_interval).spawn())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutting down...");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: config::Config,
    pub pipeline: Arc<DecisionPipeline>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // User routes (user JWT auth)
    let user_routes = Router::new()
        .route("/transaction", post(handlers::transactions::submit))
        .route("/live-feed", get(handlers::live_feed::list))
        .route("/pathway-result", post(handlers::pathway::receive))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_user_auth
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
