pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::{self, MAX_UPLOAD_BYTES};
use crate::auth;
use crate::builder;
use crate::persistence;
use crate::state::AppState;

/// Room for a 10 MiB upload plus multipart framing, and for inline profile photos in JSON.
const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(auth::handlers::handle_register))
        .route("/api/v1/auth/login", post(auth::handlers::handle_login))
        .route("/api/v1/auth/verify", get(auth::handlers::handle_verify))
        // Raw storage
        .route(
            "/api/v1/resume",
            get(persistence::handlers::handle_get_resume)
                .post(persistence::handlers::handle_put_resume),
        )
        // Gallery, style options and rendering
        .route("/api/v1/styles", get(builder::handlers::handle_style_options))
        .route("/api/v1/gallery", get(builder::handlers::handle_list_gallery))
        .route(
            "/api/v1/gallery/:domain",
            get(builder::handlers::handle_get_example),
        )
        .route("/api/v1/render", post(builder::handlers::handle_render))
        // Editing session
        .route(
            "/api/v1/session",
            get(builder::handlers::handle_get_session)
                .post(builder::handlers::handle_start_session),
        )
        .route(
            "/api/v1/session/actions",
            post(builder::handlers::handle_dispatch),
        )
        .route("/api/v1/session/flush", post(builder::handlers::handle_flush))
        .route(
            "/api/v1/session/export",
            post(builder::handlers::handle_export),
        )
        // Analysis oracle
        .route("/api/v1/analysis/ats", post(analysis::handlers::handle_ats))
        .route(
            "/api/v1/analysis/career",
            post(analysis::handlers::handle_career),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::analysis::{AtsReport, CareerReport, LlmError, ResumeAnalyzer, Upload};
    use crate::auth::TokenService;
    use crate::builder::catalog::Catalog;
    use crate::builder::ids::SequentialIds;
    use crate::export::{ExportError, PdfExporter};
    use crate::models::user::{User, UserId};
    use crate::persistence::store::memory::MemoryResumeStore;
    use crate::persistence::{SessionDeps, SessionRegistry};
    use crate::render::Layout;

    const BOUNDARY: &str = "architect-test-boundary";

    struct FakeAnalyzer {
        fail: bool,
    }

    #[async_trait]
    impl ResumeAnalyzer for FakeAnalyzer {
        async fn score(&self, _document: &Upload) -> Result<AtsReport, LlmError> {
            if self.fail {
                return Err(LlmError::EmptyContent);
            }
            Ok(AtsReport {
                overall_score: 82,
                verdict: "Good".into(),
                keywords: vec!["Rust".into()],
                insights: "- Add metrics".into(),
                clarity_score: 90,
                impact_score: 70,
                conciseness_score: 85,
            })
        }

        async fn career(&self, _document: &Upload) -> Result<CareerReport, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    struct FakeExporter;

    #[async_trait]
    impl PdfExporter for FakeExporter {
        async fn export(&self, _layout: &Layout) -> Result<Vec<u8>, ExportError> {
            Ok(b"%PDF-1.7 fake".to_vec())
        }
    }

    struct Harness {
        app: Router,
        token: String,
        store: Arc<MemoryResumeStore>,
        user: UserId,
    }

    fn harness(fail_analysis: bool) -> Harness {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/architect_test")
            .unwrap();
        let catalog = Arc::new(Catalog::bundled().unwrap());
        let store = Arc::new(MemoryResumeStore::default());
        let tokens = TokenService::new("router-test-secret", 72);
        let user = User {
            id: UserId(Uuid::new_v4()),
            email: "jane@example.com".into(),
        };
        let token = tokens.issue(&user, Utc::now()).unwrap();

        let state = AppState {
            db,
            tokens,
            catalog: Arc::clone(&catalog),
            store: store.clone(),
            sessions: Arc::new(SessionRegistry::new(SessionDeps {
                store: store.clone(),
                catalog,
                ids: Arc::new(SequentialIds::new("t")),
                debounce: Duration::from_millis(1500),
                idle_ttl: Duration::from_secs(600),
            })),
            analyzer: Arc::new(FakeAnalyzer {
                fail: fail_analysis,
            }),
            exporter: Arc::new(FakeExporter),
        };

        Harness {
            app: build_router(state),
            token,
            store,
            user: user.id,
        }
    }

    impl Harness {
        fn authed(&self, method: &str, uri: &str) -> axum::http::request::Builder {
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }

        async fn dispatch(&self, action: Value) -> (StatusCode, Value) {
            let request = self
                .authed("POST", "/api/v1/session/actions")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "action": action }).to_string()))
                .unwrap();
            self.send(request).await
        }
    }

    fn multipart(content_type: &str, file_name: &str, data: &[u8]) -> Body {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    // ── public routes ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let h = harness(false);
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_gallery_lists_examples() {
        let h = harness(false);
        let request = Request::get("/api/v1/gallery").body(Body::empty()).unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 7);

        let missing = Request::get("/api/v1/gallery/Astronaut")
            .body(Body::empty())
            .unwrap();
        let (status, body) = h.send(missing).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_render_scales_to_container() {
        let h = harness(false);
        let state = Catalog::bundled().unwrap().default_state(None);
        let mut payload = serde_json::to_value(&state).unwrap();
        payload["containerWidth"] = json!(408);

        let request = Request::post("/api/v1/render")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["viewport"]["scale"], 0.5);
        assert_eq!(body["layout"]["columns"].as_array().unwrap().len(), 2);
    }

    // ── auth gate ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_session_requires_token() {
        let h = harness(false);
        let request = Request::get("/api/v1/session").body(Body::empty()).unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let forged = Request::get("/api/v1/session")
            .header(header::AUTHORIZATION, "Bearer forged.token.value")
            .body(Body::empty())
            .unwrap();
        assert_eq!(h.send(forged).await.0, StatusCode::UNAUTHORIZED);
    }

    // ── editing session ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_session_edit_then_switch_template() {
        let h = harness(false);
        let request = h.authed("GET", "/api/v1/session").body(Body::empty()).unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"]["data"]["personal"]["email"], "jane@example.com");
        assert_eq!(body["state"]["style"]["templateId"], 1);

        h.dispatch(json!({ "type": "UPDATE_PERSONAL", "payload": { "fullName": "Jane Doe" } }))
            .await;
        let (status, body) = h.dispatch(json!({ "type": "SET_TEMPLATE", "payload": 2 })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"]["data"]["personal"]["fullName"], "Jane Doe");
        assert_eq!(body["state"]["style"]["templateId"], 2);
        assert_eq!(body["sync"]["status"], "pending");
    }

    #[tokio::test]
    async fn test_invalid_action_is_rejected_without_change() {
        let h = harness(false);
        let (status, body) = h
            .dispatch(json!({
                "type": "DELETE_ITEM",
                "payload": { "section": "skills", "index": 99 }
            }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INVALID_ACTION");

        let (status, _) = h
            .dispatch(json!({ "type": "SET_FONT_SIZE", "payload": 3.0 }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_flush_persists_session() {
        let h = harness(false);
        h.dispatch(json!({ "type": "UPDATE_SUMMARY", "payload": "Saved now" }))
            .await;
        let request = h
            .authed("POST", "/api/v1/session/flush")
            .body(Body::empty())
            .unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sync"]["status"], "saved");
        assert_eq!(h.store.stored(h.user).unwrap().data.summary, "Saved now");

        let request = h.authed("GET", "/api/v1/resume").body(Body::empty()).unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["summary"], "Saved now");
    }

    #[tokio::test]
    async fn test_stored_resume_not_found() {
        let h = harness(false);
        let request = h.authed("GET", "/api/v1/resume").body(Body::empty()).unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_export_names_pdf_after_owner() {
        let h = harness(false);
        h.dispatch(json!({ "type": "UPDATE_PERSONAL", "payload": { "fullName": "Jane  Q Doe" } }))
            .await;
        let request = h
            .authed("POST", "/api/v1/session/export")
            .body(Body::empty())
            .unwrap();
        let response = h.app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jane_Q_Doe_Resume.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    // ── analysis ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_ats_analysis_returns_report() {
        let h = harness(false);
        let request = h
            .authed("POST", "/api/v1/analysis/ats")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart("application/pdf", "cv.pdf", b"%PDF-1.7"))
            .unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overallScore"], 82);
        assert_eq!(body["verdict"], "Good");
    }

    #[tokio::test]
    async fn test_oracle_failure_is_retryable_bad_gateway() {
        let h = harness(true);
        let request = h
            .authed("POST", "/api/v1/analysis/ats")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart("application/pdf", "cv.pdf", b"%PDF-1.7"))
            .unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "ANALYSIS_FAILED");
        assert_eq!(body["error"]["retryable"], true);
    }

    #[tokio::test]
    async fn test_unsupported_upload_rejected() {
        let h = harness(false);
        let request = h
            .authed("POST", "/api/v1/analysis/career")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart("image/png", "photo.png", b"\x89PNG"))
            .unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
    }
}
