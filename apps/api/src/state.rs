use std::sync::Arc;

use sqlx::PgPool;

use crate::analysis::ResumeAnalyzer;
use crate::auth::TokenService;
use crate::builder::catalog::Catalog;
use crate::export::PdfExporter;
use crate::persistence::{ResumeStore, SessionRegistry};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: TokenService,
    pub catalog: Arc<Catalog>,
    pub store: Arc<dyn ResumeStore>,
    /// One live editing session per user.
    pub sessions: Arc<SessionRegistry>,
    /// Pluggable analysis oracle. Default: GeminiClient.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    pub exporter: Arc<dyn PdfExporter>,
}
