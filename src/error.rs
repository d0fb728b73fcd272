use thiserror::Error;

/// Failures that abort a pipeline run before anything is persisted.
///
/// Analysis failures are not listed here: a failed or empty abnormality
/// analysis is embedded in the report as an [`crate::models::AnalysisOutcome`]
/// variant rather than aborting the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported file format or no text found.")]
    NoTextExtracted,

    #[error("Summarization failed: {0}")]
    Summarization(String),
}
