//! HTTP surface for the summarizer.
//!
//! - `POST /summarize` – Summarize inline note text, or a remote file described by its URL and
//!   declared MIME type. Returns `{ "summary": string }`; failures return `{ "error": string }`
//!   with 400, 415, or 500.
//! - `GET /metrics` – Pipeline counters since startup.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//! - `GET /health` – Liveness probe.

use crate::processing::{ExtractionRequest, PipelineError, SummarizeApi};
use crate::summarization::PromptProfile;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummarizeApi + 'static,
{
    Router::new()
        .route("/summarize", post(summarize::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .route("/health", get(health))
        .with_state(service)
}

/// Request body for the `POST /summarize` endpoint.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeRequest {
    /// Note body; used when longer than ten characters.
    #[serde(default, alias = "icerik")]
    inline_text: Option<String>,
    /// Download URL of the attached file.
    #[serde(default, alias = "url")]
    file_url: Option<String>,
    /// MIME type recorded for the attached file.
    #[serde(default)]
    mime_type: Option<String>,
    /// `brief` or `detailed`; defaults to the configured profile.
    #[serde(default)]
    profile: Option<PromptProfile>,
}

/// Success response for the `POST /summarize` endpoint.
#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
}

async fn summarize<S>(
    State(service): State<Arc<S>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: SummarizeApi + 'static,
{
    let Json(body) = payload.map_err(AppError::from)?;
    let request =
        match ExtractionRequest::resolve(body.inline_text, body.file_url, body.mime_type) {
            Ok(request) => request,
            Err(error) => {
                service.record_rejected(&error);
                return Err(error.into());
            }
        };
    let profile = body.profile;

    // A panicking run must still produce a JSON error for the caller.
    let result = tokio::spawn(async move { service.summarize(request, profile).await })
        .await
        .map_err(|error| PipelineError::Internal(format!("pipeline task failed: {error}")))??;

    Ok(Json(SummarizeResponse {
        summary: result.summary_text,
    }))
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: SummarizeApi,
{
    Json(service.metrics_snapshot())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Summarize inline text, or extract text from a PDF, DOCX, HTML, plain-text, or image file and summarize it. Response returns { \"summary\": string }.",
                request_example: Some(json!({
                    "inlineText": "optional note body",
                    "fileUrl": "https://files.example/notes.pdf",
                    "mimeType": "application/pdf",
                    "profile": "brief"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return pipeline counters: requests, summaries, OCR fallbacks, and failures by category.",
                request_example: None,
            },
            CommandDescriptor {
                name: "health",
                method: "GET",
                path: "/health",
                description: "Liveness probe.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    Pipeline(PipelineError),
    MalformedBody(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Pipeline(error) => (
                StatusCode::from_u16(error.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                error.user_message(),
            ),
            Self::MalformedBody(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self::Pipeline(inner)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected summarize request body");
        Self::MalformedBody(rejection.body_text())
    }
}
