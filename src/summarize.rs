use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::llm::CompletionBackend;
use crate::loader::{Document, LoaderKind, Loaders, select_loader};
use crate::validate::validate_inputs;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes.";

pub const PROMPT_TEMPLATE: &str = "
You are an expert summarizer. Provide a clear and concise 300-word summary of the following content:
{text}
";

pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Where a run is. Every run starts and ends in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    Validating,
    Loading,
    Summarizing,
    Done,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Idle => "idle",
            RunStage::Validating => "validating",
            RunStage::Loading => "loading",
            RunStage::Summarizing => "summarizing",
            RunStage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Model output, untouched.
    pub text: String,
    pub source_url: String,
    pub loader: LoaderKind,
    pub title: Option<String>,
    pub word_count: usize,
}

pub fn render_prompt(text: &str) -> String {
    PROMPT_TEMPLATE.replace("{text}", text)
}

/// "Stuff" strategy: every document's content in one block.
pub fn stuff_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|document| document.content.as_str())
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}

/// validate → select loader → load → one completion call.
#[derive(Clone)]
pub struct SummaryPipeline {
    loaders: Loaders,
    backend: Arc<dyn CompletionBackend>,
}

impl SummaryPipeline {
    pub fn new(loaders: Loaders, backend: Arc<dyn CompletionBackend>) -> Self {
        Self { loaders, backend }
    }

    pub async fn run(&self, api_key: &str, url: &str) -> Result<Summary> {
        let outcome = self.run_stages(api_key, url).await;
        match &outcome {
            Ok(summary) => tracing::info!(
                loader = summary.loader.as_str(),
                words = summary.word_count,
                "Summary produced"
            ),
            Err(e) => tracing::warn!(kind = e.kind(), error = %e, "Summary run failed"),
        }
        transition(RunStage::Idle);
        outcome
    }

    async fn run_stages(&self, api_key: &str, url: &str) -> Result<Summary> {
        transition(RunStage::Validating);
        validate_inputs(api_key, url)?;
        let url = url.trim();
        let client = self.backend.connect(api_key)?;

        transition(RunStage::Loading);
        let choice = select_loader(url);
        tracing::info!(%url, loader = choice.kind().as_str(), "Loading content");
        let documents = self
            .loaders
            .for_choice(&choice)
            .load(choice.fetch_set())
            .await
            .map_err(|e| match e {
                AppError::Load(_) => e,
                other => AppError::Load(other.to_string()),
            })?;

        if documents.iter().all(|document| document.content.trim().is_empty()) {
            return Err(AppError::Load(format!("No content could be extracted from {}", url)));
        }

        let text = stuff_documents(&documents);
        let word_count = text.split_whitespace().count();
        let prompt = render_prompt(&text);
        tracing::debug!(documents = documents.len(), prompt_chars = prompt.len(), "Built prompt");

        transition(RunStage::Summarizing);
        let summary = client
            .complete(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| match e {
                AppError::Summarize(_) => e,
                other => AppError::Summarize(other.to_string()),
            })?;

        transition(RunStage::Done);
        Ok(Summary {
            text: summary,
            source_url: url.to_string(),
            loader: choice.kind(),
            title: documents.iter().find_map(|d| d.title()).map(str::to_string),
            word_count,
        })
    }
}

fn transition(stage: RunStage) {
    tracing::debug!(%stage, "Run stage");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_text_once() {
        let prompt = render_prompt("hello world");
        assert_eq!(
            prompt,
            "\nYou are an expert summarizer. Provide a clear and concise 300-word summary of the following content:\nhello world\n"
        );
    }

    #[test]
    fn prompt_does_not_expand_placeholders_inside_content() {
        let prompt = render_prompt("literal {text} in page");
        assert!(prompt.contains("literal {text} in page"));
    }

    #[test]
    fn documents_are_joined_with_blank_line() {
        let docs = vec![Document::new("first"), Document::new("second")];
        assert_eq!(stuff_documents(&docs), "first\n\nsecond");
        assert_eq!(stuff_documents(&[]), "");
    }

    #[test]
    fn stage_names() {
        assert_eq!(RunStage::Summarizing.to_string(), "summarizing");
        assert_eq!(RunStage::Idle.to_string(), "idle");
    }
}
