use std::time::Duration;

use async_trait::async_trait;
use rig::{agent::Agent, client::CompletionClient, completion::Prompt, providers::openrouter};
use tokio::time::timeout;

const LLM_MODEL: &str = "openai/gpt-4o-mini";

/// Hard cap on a single completion round-trip. The core contract has no
/// retry, so a hung backend must not hold a request open indefinitely.
const LLM_TIMEOUT: Duration = Duration::from_secs(90);

/// LLM collaborator: one prompt string in, one response string out.
/// Implemented by the OpenRouter client in production and by canned mocks in
/// tests, so summarization and analysis stay deterministic under test.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

pub struct OpenRouterBackend {
    agent: Agent<openrouter::CompletionModel>,
}

impl OpenRouterBackend {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENROUTER_API_KEY not set"))?;
        let client = openrouter::Client::new(&api_key);
        let agent = client
            .agent(LLM_MODEL)
            .preamble("You are a medical AI assistant analyzing patient reports.")
            .build();
        Ok(Self { agent })
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterBackend {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let response = timeout(LLM_TIMEOUT, self.agent.prompt(prompt))
            .await
            .map_err(|_| anyhow::anyhow!("LLM request timed out after {:?}", LLM_TIMEOUT))??;
        Ok(response)
    }
}
