use serde::{Deserialize, Serialize};

/// One medical value the LLM judged to be outside its normal range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbnormalityRecord {
    pub parameter: String,
    pub value: String,
    pub explanation: String,
    pub possible_conditions: Vec<String>,
    pub recommendations: String,
}

/// Outcome of abnormality analysis. Serialized untagged so the wire shapes
/// stay `{"abnormalities": [...]}` / `{"message": "..."}` / `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Findings { abnormalities: Vec<AbnormalityRecord> },
    NoValues { message: String },
    Failed { error: String },
}

/// A fully processed report. Built whole at the end of one pipeline run and
/// overwritten wholesale by the next run for the same session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalReport {
    pub summary: String,
    pub abnormalities: AnalysisOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub summary: String,
    pub abnormalities: AnalysisOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
