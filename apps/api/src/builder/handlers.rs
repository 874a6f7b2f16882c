use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::builder::catalog::{Catalog, Example};
use crate::builder::model::{
    ColorToken, FontFamily, ResumeDocument, ResumeState, StyleConfig, TemplateId,
    FONT_SCALE_MAX, FONT_SCALE_MIN,
};
use crate::builder::reducer::Action;
use crate::errors::AppError;
use crate::export::export_filename;
use crate::persistence::SyncStatus;
use crate::render::{render, Layout, Viewport};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    pub domain: String,
    pub template_id: TemplateId,
    pub document: ResumeDocument,
}

impl GalleryEntry {
    fn new(catalog: &Catalog, example: &Example) -> Self {
        Self {
            domain: example.domain.clone(),
            template_id: catalog.template_for(example),
            document: example.document.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ColorOption {
    pub token: ColorToken,
    pub label: &'static str,
    pub hex: &'static str,
}

#[derive(Serialize)]
pub struct FontOption {
    pub token: FontFamily,
    pub label: &'static str,
}

#[derive(Serialize)]
pub struct ScaleRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

/// Everything a style picker offers.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOptions {
    pub templates: Vec<TemplateId>,
    pub colors: Vec<ColorOption>,
    pub fonts: Vec<FontOption>,
    pub font_scale: ScaleRange,
    pub defaults: StyleConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(flatten)]
    pub state: ResumeState,
    pub container_width: Option<f32>,
}

#[derive(Serialize)]
pub struct RenderResponse {
    pub layout: Layout,
    pub viewport: Viewport,
}

/// Starts a fresh session. With `domain`, seeds it from that gallery example; `style` keeps
/// its color/font/scale and takes the example's template.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub domain: Option<String>,
    pub style: Option<StyleConfig>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    pub action: Action,
    pub container_width: Option<f32>,
}

#[derive(Serialize)]
pub struct SessionView {
    pub state: ResumeState,
    pub layout: Layout,
    pub viewport: Viewport,
    pub sync: SyncStatus,
}

impl SessionView {
    fn new(state: &ResumeState, sync: SyncStatus, container_width: Option<f32>) -> Self {
        let layout = render(&state.data, &state.style);
        let viewport = fit(&layout, container_width);
        Self {
            state: state.clone(),
            layout,
            viewport,
            sync,
        }
    }
}

#[derive(Serialize)]
pub struct FlushResponse {
    pub sync: SyncStatus,
}

fn fit(layout: &Layout, container_width: Option<f32>) -> Viewport {
    container_width
        .map(|width| Viewport::fit(width, &layout.page))
        .unwrap_or(Viewport::UNSCALED)
}

/// GET /api/v1/styles
pub async fn handle_style_options() -> Json<StyleOptions> {
    Json(StyleOptions {
        templates: TemplateId::ALL.to_vec(),
        colors: ColorToken::ALL
            .into_iter()
            .map(|token| ColorOption {
                token,
                label: token.label(),
                hex: token.hex(),
            })
            .collect(),
        fonts: FontFamily::ALL
            .into_iter()
            .map(|token| FontOption {
                token,
                label: token.label(),
            })
            .collect(),
        font_scale: ScaleRange {
            min: FONT_SCALE_MIN,
            max: FONT_SCALE_MAX,
            step: 0.05,
        },
        defaults: StyleConfig::default(),
    })
}

/// GET /api/v1/gallery
pub async fn handle_list_gallery(State(state): State<AppState>) -> Json<Vec<GalleryEntry>> {
    let catalog = &state.catalog;
    Json(
        catalog
            .examples()
            .iter()
            .map(|example| GalleryEntry::new(catalog, example))
            .collect(),
    )
}

/// GET /api/v1/gallery/:domain
pub async fn handle_get_example(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<GalleryEntry>, AppError> {
    let example = state
        .catalog
        .by_domain(&domain)
        .ok_or_else(|| AppError::NotFound(format!("No example for domain '{domain}'")))?;
    Ok(Json(GalleryEntry::new(&state.catalog, example)))
}

/// POST /api/v1/render
pub async fn handle_render(
    Json(req): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, AppError> {
    req.state
        .data
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let layout = render(&req.state.data, &req.state.style);
    let viewport = fit(&layout, req.container_width);
    Ok(Json(RenderResponse { layout, viewport }))
}

/// GET /api/v1/session
pub async fn handle_get_session(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<SessionView> {
    let session = state.sessions.open(auth.id, &auth.email).await;
    let session = session.lock().await;
    Json(SessionView::new(session.state(), session.sync_status(), None))
}

/// POST /api/v1/session
pub async fn handle_start_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let seed = match req.domain.as_deref() {
        Some(domain) => {
            let example = state
                .catalog
                .by_domain(domain)
                .ok_or_else(|| AppError::NotFound(format!("No example for domain '{domain}'")))?;
            info!("User {} starting from the '{}' example", auth.id, example.domain);
            Some(
                state
                    .catalog
                    .seed_from(example, req.style.unwrap_or_default()),
            )
        }
        None => None,
    };

    let session = state.sessions.restart(auth.id, &auth.email, seed).await;
    let session = session.lock().await;
    Ok(Json(SessionView::new(
        session.state(),
        session.sync_status(),
        None,
    )))
}

/// POST /api/v1/session/actions
pub async fn handle_dispatch(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<DispatchRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.open(auth.id, &auth.email).await;
    let mut session = session.lock().await;
    session.dispatch(req.action)?;
    Ok(Json(SessionView::new(
        session.state(),
        session.sync_status(),
        req.container_width,
    )))
}

/// POST /api/v1/session/flush
pub async fn handle_flush(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<FlushResponse> {
    let session = state.sessions.open(auth.id, &auth.email).await;
    let sync = session.lock().await.flush().await;
    Json(FlushResponse { sync })
}

/// POST /api/v1/session/export
pub async fn handle_export(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    let session = state.sessions.open(auth.id, &auth.email).await;
    // Snapshot so the session is not held while the compiler runs.
    let snapshot = session.lock().await.state().clone();

    let layout = render(&snapshot.data, &snapshot.style);
    let pdf = state.exporter.export(&layout).await?;
    let filename = export_filename(&snapshot.data.personal.full_name);
    info!("User {} exported {filename}", auth.id);

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        header_safe(&filename)
    ))
    .map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

/// ASCII-only rendition of a filename for the `Content-Disposition` header.
fn header_safe(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_style_options_cover_palette() {
        let Json(options) = handle_style_options().await;
        assert_eq!(options.templates.len(), 4);
        assert_eq!(options.colors.len(), 5);
        assert_eq!(options.colors[0].label, "Default Blue");
        assert_eq!(options.fonts.len(), 3);

        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value["colors"][1]["token"], "green");
        assert_eq!(value["fontScale"]["max"], 1.2f32 as f64);
        assert_eq!(value["defaults"]["templateId"], 1);
    }

    #[test]
    fn test_header_safe_filename() {
        assert_eq!(header_safe("Jane_Doe_Resume.pdf"), "Jane_Doe_Resume.pdf");
        assert_eq!(header_safe("Zoë_\"Z\"_Resume.pdf"), "Zo___Z__Resume.pdf");
    }

    #[test]
    fn test_render_request_accepts_flat_state() {
        let catalog = Catalog::bundled().unwrap();
        let state = catalog.default_state(None);
        let mut body = serde_json::to_value(&state).unwrap();
        body["containerWidth"] = json!(408.0);

        let req: RenderRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.state, state);
        assert_eq!(req.container_width, Some(408.0));
    }

    #[test]
    fn test_session_view_scales_for_container() {
        let catalog = Catalog::bundled().unwrap();
        let state = catalog.default_state(None);
        let view = SessionView::new(&state, SyncStatus::Idle, Some(408.0));
        assert!((view.viewport.scale - 0.5).abs() < 1e-6);

        let unscaled = SessionView::new(&state, SyncStatus::Idle, None);
        assert_eq!(unscaled.viewport, Viewport::UNSCALED);
    }

    #[test]
    fn test_gallery_entry_uses_template_or_classic() {
        let catalog = Catalog::bundled().unwrap();
        let designer = catalog.by_domain("UX/UI Designer").unwrap();
        assert_eq!(
            GalleryEntry::new(&catalog, designer).template_id,
            TemplateId::Creative
        );
        let devops = catalog.by_domain("DevOps Engineer").unwrap();
        assert_eq!(
            GalleryEntry::new(&catalog, devops).template_id,
            TemplateId::Classic
        );
    }

    #[test]
    fn test_dispatch_request_parses_wire_action() {
        let req: DispatchRequest = serde_json::from_value(json!({
            "action": { "type": "UPDATE_SUMMARY", "payload": "Hello" },
            "containerWidth": 600
        }))
        .unwrap();
        assert!(matches!(req.action, Action::UpdateSummary(ref s) if s == "Hello"));
    }
}
