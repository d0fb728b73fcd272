use tracing::info;

use crate::error::PipelineError;
use crate::llm::CompletionBackend;

pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 200;

/// Splits text into overlapping windows of [`CHUNK_SIZE`] characters with
/// [`CHUNK_OVERLAP`] characters shared between consecutive chunks, so a
/// sentence or value cut at one boundary appears whole in the next chunk.
pub fn split_into_chunks(text: &str) -> Vec<String> {
    split_with(text, CHUNK_SIZE, CHUNK_OVERLAP)
}

fn split_with(text: &str, size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < size);

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= size {
        return vec![text.to_string()];
    }

    let step = size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Map-reduce summarization: each chunk is summarized independently, then the
/// partial summaries are combined by one further LLM pass. A single chunk
/// needs no reduce pass; its partial already covers the whole text.
///
/// Any backend failure in either phase surfaces as
/// [`PipelineError::Summarization`] carrying the underlying message.
pub async fn summarize(llm: &dyn CompletionBackend, text: &str) -> Result<String, PipelineError> {
    let chunks = split_into_chunks(text);
    info!("summarizing {} chunk(s)", chunks.len());

    let mut partials = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        let partial = llm
            .complete(&map_prompt(chunk))
            .await
            .map_err(|e| PipelineError::Summarization(e.to_string()))?;
        partials.push(partial);
    }

    if partials.len() == 1 {
        return Ok(partials.remove(0).trim().to_string());
    }

    let combined = llm
        .complete(&reduce_prompt(&partials))
        .await
        .map_err(|e| PipelineError::Summarization(e.to_string()))?;

    info!("reduced {} partial summaries", partials.len());
    Ok(combined.trim().to_string())
}

fn map_prompt(chunk: &str) -> String {
    format!(
        "You are a medical AI assistant. Summarize this portion of a patient's medical report. \
        Preserve every test result, measurement, and clinical finding; omit boilerplate.\n\n\
        Report portion:\n{}\n\n\
        Concise summary:",
        chunk
    )
}

fn reduce_prompt(partials: &[String]) -> String {
    let joined = partials
        .iter()
        .enumerate()
        .map(|(i, partial)| format!("Part {}:\n{}", i + 1, partial))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a medical AI assistant. The following are summaries of consecutive, \
        overlapping portions of one medical report. Combine them into a single coherent \
        summary covering all of their content, without repeating overlapping material.\n\n\
        {}\n\n\
        Combined summary:",
        joined
    )
}
