pub mod analyze;
pub mod error;
pub mod extract;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod service;
pub mod store;
pub mod summarize;
pub mod values;

pub use error::PipelineError;
pub use llm::{CompletionBackend, OpenRouterBackend};
pub use models::{AbnormalityRecord, AnalysisOutcome, MedicalReport};
pub use service::{AppState, create_app};
pub use store::{InMemoryReportStore, ReportStore};
