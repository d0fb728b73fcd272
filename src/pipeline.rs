use tracing::info;
use uuid::Uuid;

use crate::analyze::detect_abnormalities;
use crate::error::PipelineError;
use crate::extract::{self, OcrEngine};
use crate::llm::CompletionBackend;
use crate::models::{MedicalReport, UploadResponse};
use crate::store::ReportStore;
use crate::summarize::summarize;

/// Runs the full report pipeline over one uploaded file.
///
/// Extraction failure (unsupported format, decode/OCR failure, empty text)
/// short-circuits before any LLM call. Summarization and abnormality analysis
/// both operate on the full extracted text with no required relative order; a
/// summarization failure aborts the run with nothing persisted, while an
/// analysis failure is embedded in the stored report as its outcome variant.
pub async fn process_report(
    llm: &dyn CompletionBackend,
    ocr: &dyn OcrEngine,
    store: &dyn ReportStore,
    bytes: &[u8],
    filename: &str,
) -> Result<UploadResponse, PipelineError> {
    let extension = file_extension(filename);

    let text = match extract::extract_text(bytes, &extension, ocr).await {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(PipelineError::NoTextExtracted),
    };

    info!("extracted {} characters from {}", text.len(), filename);

    let (summary, abnormalities) = tokio::join!(
        summarize(llm, &text),
        detect_abnormalities(llm, &text)
    );
    let summary = summary?;

    let session_id = Uuid::new_v4().to_string();
    let report = MedicalReport {
        summary: summary.clone(),
        abnormalities: abnormalities.clone(),
    };
    store.save(session_id.clone(), report).await;

    info!("report stored under session {}", session_id);

    Ok(UploadResponse {
        session_id,
        summary,
        abnormalities,
    })
}

fn file_extension(filename: &str) -> String {
    filename.rsplit('.').next().unwrap_or_default().to_lowercase()
}
