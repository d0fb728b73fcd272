use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::error::PipelineError;
use crate::extract::{OcrEngine, TesseractOcr};
use crate::llm::{CompletionBackend, OpenRouterBackend};
use crate::models::{ChatRequest, ChatResponse, UploadResponse};
use crate::pipeline::process_report;
use crate::store::{InMemoryReportStore, ReportStore};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub const NO_REPORT_MESSAGE: &str = "No medical report found. Please upload one first.";

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message })))
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn CompletionBackend>,
    pub ocr: Arc<dyn OcrEngine>,
    pub reports: Arc<dyn ReportStore>,
}

pub fn create_app() -> anyhow::Result<Router> {
    let state = AppState {
        llm: Arc::new(OpenRouterBackend::from_env()?),
        ocr: Arc::new(TesseractOcr),
        reports: Arc::new(InMemoryReportStore::new()),
    };
    Ok(build_router(state))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/upload", post(upload_report))
        .route("/chat", post(chat_with_report))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Medical Report Analysis Service",
        "version": "1.0.0",
        "description": "Summarizes uploaded medical reports and flags abnormal test values",
        "endpoints": {
            "POST /upload": "Upload a medical report (PDF or image) for analysis",
            "POST /chat": "Ask a follow-up question about an uploaded report",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn upload_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let (filename, bytes) = read_uploaded_file(multipart).await?;
    info!("received upload: {} ({} bytes)", filename, bytes.len());

    match process_report(
        state.llm.as_ref(),
        state.ocr.as_ref(),
        state.reports.as_ref(),
        &bytes,
        &filename,
    )
    .await
    {
        Ok(response) => Ok(Json(response)),
        Err(e @ PipelineError::NoTextExtracted) => Err(bad_request_error(&e.to_string())),
        Err(e @ PipelineError::Summarization(_)) => {
            error!("pipeline failed: {}", e);
            Err(internal_error(&e.to_string()))
        }
    }
}

async fn read_uploaded_file(mut multipart: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request_error(&format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("document").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request_error(&format!("Failed to read file: {}", e)))?
                .to_vec();
            return Ok((filename, bytes));
        }
    }

    Err(bad_request_error("No file uploaded"))
}

async fn chat_with_report(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    if request.question.trim().is_empty() {
        return Err(bad_request_error("Question cannot be empty"));
    }

    let report = state
        .reports
        .get(&request.session_id)
        .await
        .ok_or_else(|| not_found_error(NO_REPORT_MESSAGE))?;

    let abnormalities = serde_json::to_string_pretty(&report.abnormalities).unwrap_or_default();
    let context = format!(
        "User's latest medical report summary:\n{}\n\n\
        Detected abnormalities:\n{}\n\n\
        User's question: {}",
        report.summary, abnormalities, request.question
    );

    match state.llm.complete(&context).await {
        Ok(response) => Ok(Json(ChatResponse { response })),
        Err(e) => {
            error!("chat completion failed: {}", e);
            Err(internal_error(&format!("LLM chat failed: {}", e)))
        }
    }
}
