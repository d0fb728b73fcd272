use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{info, warn};

use crate::llm::CompletionBackend;
use crate::models::{AbnormalityRecord, AnalysisOutcome};
use crate::values::extract_values;

pub const NO_VALUES_MESSAGE: &str = "No medical values found for analysis.";

/// Fixed reply schema the LLM is instructed to produce.
#[derive(Deserialize)]
struct AnalysisReply {
    abnormalities: Vec<AbnormalityRecord>,
}

/// Analyzes report text for abnormal medical values.
///
/// Re-derives the parameter map from the full text, so chunking elsewhere in
/// the pipeline never affects abnormality detection. An empty map returns
/// [`AnalysisOutcome::NoValues`] without any LLM call; a failed call or a
/// non-conforming JSON reply returns [`AnalysisOutcome::Failed`]. Nothing
/// here panics or propagates a raw error.
pub async fn detect_abnormalities(llm: &dyn CompletionBackend, text: &str) -> AnalysisOutcome {
    let values = extract_values(text);

    if values.is_empty() {
        info!("no medical values extracted, skipping LLM analysis");
        return AnalysisOutcome::NoValues {
            message: NO_VALUES_MESSAGE.to_string(),
        };
    }

    info!("analyzing {} extracted values", values.len());

    let response = match llm.complete(&analysis_prompt(&values)).await {
        Ok(response) => response,
        Err(e) => {
            warn!("abnormality analysis call failed: {}", e);
            return AnalysisOutcome::Failed {
                error: format!("LLM analysis failed: {}", e),
            };
        }
    };

    match serde_json::from_str::<AnalysisReply>(&response) {
        Ok(reply) => AnalysisOutcome::Findings {
            abnormalities: reply.abnormalities,
        },
        Err(e) => {
            warn!("abnormality analysis returned non-conforming JSON: {}", e);
            AnalysisOutcome::Failed {
                error: format!("LLM analysis failed: {}", e),
            }
        }
    }
}

fn analysis_prompt(values: &IndexMap<String, String>) -> String {
    let formatted = serde_json::to_string_pretty(values).unwrap_or_default();

    format!(
        "The following are medical test results extracted from a patient's report:\n\n\
        {}\n\n\
        Based on your medical knowledge, analyze these values and:\n\
        - Identify any abnormal values.\n\
        - Explain why they might be concerning.\n\
        - Suggest possible medical conditions related to abnormalities.\n\
        - Provide recommendations for further medical consultation.\n\n\
        Respond in valid JSON format without additional text:\n\
        {{\n\
          \"abnormalities\": [\n\
            {{\n\
              \"parameter\": \"<Test Name>\",\n\
              \"value\": \"<Test Value>\",\n\
              \"explanation\": \"<Reason why it's abnormal>\",\n\
              \"possible_conditions\": [\"Condition 1\", \"Condition 2\"],\n\
              \"recommendations\": \"Suggested medical advice\"\n\
            }}\n\
          ]\n\
        }}",
        formatted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedLlm {
        reply: Result<String, String>,
        calls: AtomicUsize,
    }

    impl CannedLlm {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for CannedLlm {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(message) => Err(anyhow::anyhow!("{}", message)),
            }
        }
    }

    #[tokio::test]
    async fn no_values_skips_llm_and_returns_exact_message() {
        let llm = CannedLlm::replying("{}");
        let outcome = detect_abnormalities(&llm, "patient is resting comfortably").await;

        match outcome {
            AnalysisOutcome::NoValues { message } => assert_eq!(message, NO_VALUES_MESSAGE),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn well_formed_reply_parses_into_findings() {
        let llm = CannedLlm::replying(
            r#"{
                "abnormalities": [
                    {
                        "parameter": "Hemoglobin",
                        "value": "9.5 g/dL",
                        "explanation": "Below the normal adult range.",
                        "possible_conditions": ["Anemia", "Chronic blood loss"],
                        "recommendations": "Consult a hematologist."
                    }
                ]
            }"#,
        );

        let outcome = detect_abnormalities(&llm, "Hemoglobin: 9.5 g/dL").await;
        match outcome {
            AnalysisOutcome::Findings { abnormalities } => {
                assert_eq!(abnormalities.len(), 1);
                assert_eq!(abnormalities[0].parameter, "Hemoglobin");
                assert_eq!(abnormalities[0].possible_conditions.len(), 2);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_abnormality_list_is_a_valid_outcome() {
        let llm = CannedLlm::replying(r#"{"abnormalities": []}"#);
        let outcome = detect_abnormalities(&llm, "Glucose: 90 mg/dL").await;
        match outcome {
            AnalysisOutcome::Findings { abnormalities } => assert!(abnormalities.is_empty()),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_json_reply_becomes_failed_outcome() {
        let llm = CannedLlm::replying("I am sorry, I cannot respond in JSON.");
        let outcome = detect_abnormalities(&llm, "Hemoglobin: 9.5 g/dL").await;
        match outcome {
            AnalysisOutcome::Failed { error } => {
                assert!(error.starts_with("LLM analysis failed:"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn backend_failure_becomes_failed_outcome() {
        let llm = CannedLlm::failing("connection refused");
        let outcome = detect_abnormalities(&llm, "Hemoglobin: 9.5 g/dL").await;
        match outcome {
            AnalysisOutcome::Failed { error } => {
                assert!(error.contains("connection refused"));
                assert!(error.starts_with("LLM analysis failed:"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
