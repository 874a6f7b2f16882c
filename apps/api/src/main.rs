mod analysis;
mod auth;
mod builder;
mod config;
mod db;
mod errors;
mod export;
mod models;
mod persistence;
mod render;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::GeminiClient;
use crate::auth::TokenService;
use crate::builder::catalog::Catalog;
use crate::builder::ids::UuidIds;
use crate::config::Config;
use crate::db::create_pool;
use crate::export::TypstExporter;
use crate::persistence::{PgResumeStore, ResumeStore, SessionDeps, SessionRegistry};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Architect API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Example catalog is compiled in; a broken catalog is a startup error
    let catalog = Arc::new(Catalog::bundled()?);
    info!("Loaded {} gallery examples", catalog.examples().len());

    let store: Arc<dyn ResumeStore> = Arc::new(PgResumeStore::new(db.clone()));
    let sessions = Arc::new(SessionRegistry::new(SessionDeps {
        store: Arc::clone(&store),
        catalog: Arc::clone(&catalog),
        ids: Arc::new(UuidIds),
        debounce: config.save_debounce,
        idle_ttl: config.session_idle,
    }));
    let _sweeper = sessions.spawn_sweeper();
    info!(
        "Auto-save debounce window: {:?}, idle sessions evicted after {:?}",
        config.save_debounce, config.session_idle
    );

    // Initialize analysis oracle
    let analyzer = Arc::new(GeminiClient::new(config.gemini_api_key.clone())?);
    info!("Analysis client initialized (model: {})", analysis::client::MODEL);

    let exporter = Arc::new(TypstExporter::new(&config.typst_bin, config.export_timeout));

    // Build app state
    let state = AppState {
        db,
        tokens: TokenService::new(&config.jwt_secret, config.token_ttl_hours),
        catalog,
        store,
        sessions,
        analyzer,
        exporter,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
