use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::analysis::{mime_for_file_name, AnalysisClient, ImageUpload};
use crate::ui::render;
use crate::ui::state::{Action, Background};
use crate::ui::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub client: AnalysisClient,
}

#[derive(Deserialize)]
struct BackgroundForm {
    mode: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    image_url: String,
}

/// Only plain hex colors and http(s) URLs without quoting characters make it
/// into the page's inline style.
fn parse_background(form: &BackgroundForm) -> Option<Background> {
    match form.mode.as_str() {
        "default" => Some(Background::Default),
        "color" => {
            let hex = form.color.strip_prefix('#')?;
            let valid =
                matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
            valid.then(|| Background::Color(form.color.clone()))
        }
        "image" => {
            let url = form.image_url.trim();
            let scheme_ok = url.starts_with("https://") || url.starts_with("http://");
            let clean = !url.contains(['\'', '"', '(', ')', '\\', ';'])
                && !url.contains(char::is_whitespace);
            (scheme_ok && clean).then(|| Background::Image(url.to_string()))
        }
        _ => None,
    }
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.store.take_for_render().await;
    Html(render::page(&snapshot))
}

async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, (StatusCode, String)> {
    let mut image = None;
    let mut prompt = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        match field.name() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                // browsers send an empty part when no file was chosen
                if !bytes.is_empty() {
                    let mime = content_type
                        .unwrap_or_else(|| mime_for_file_name(&file_name).to_string());
                    image = Some(ImageUpload::new(file_name, mime, bytes.to_vec()));
                }
            }
            Some("prompt") => {
                prompt = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    if let Some(image) = &image {
        info!("Selected {} ({} bytes)", image.file_name, image.bytes.len());
    }
    state
        .store
        .dispatch_and_run(&state.client, Action::SubmitWith { image, prompt })
        .await;

    Ok(Redirect::to("/"))
}

async fn clear(State(state): State<AppState>) -> Redirect {
    state.store.dispatch(Action::Clear).await;
    Redirect::to("/")
}

async fn background(
    State(state): State<AppState>,
    Form(form): Form<BackgroundForm>,
) -> Redirect {
    match parse_background(&form) {
        Some(background) => {
            state
                .store
                .dispatch(Action::SetBackground(background))
                .await;
        }
        None => warn!("Ignoring invalid background setting: {}", form.mode),
    }
    Redirect::to("/")
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/clear", post(clear))
        .route("/background", post(background))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Serve the browser UI until the process is stopped
pub async fn run(state: AppState, listen: &str, max_upload_bytes: usize) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind to {listen}"))?;

    info!("Analysis UI on http://{}", listen);

    axum::serve(listener, router(state, max_upload_bytes))
        .await
        .context("Server error")?;

    Ok(())
}
