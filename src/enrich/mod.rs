//! Enrichment of detected issues with explanations and fix suggestions.
//!
//! Text comes from a [`TextGenerator`], normally the chat-completion
//! [`ChatClient`]. Every issue is enriched independently; any failure for an
//! issue yields the deterministic fallback rather than an error.

mod client;
pub mod prompts;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::detect::Issue;

pub use client::{api_key_from_env, ChatClient};
use prompts::{explanation_prompt, fixed_code, suggestion_prompt, Prompt};

/// Explanation used whenever generated text is unavailable.
pub const FALLBACK_EXPLANATION: &str =
    "This accessibility issue should be addressed to improve user experience.";

/// Errors from the text-generation endpoint.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("missing API key: set the {env_var} environment variable")]
    MissingApiKey { env_var: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("empty response")]
    Empty,
}

pub type EnrichResult<T> = Result<T, EnrichError>;

/// Source of generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt` within `max_tokens`.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> EnrichResult<String>;
}

/// The type-specific suggested value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Suggestion {
    #[serde(rename = "suggestedAltText")]
    AltText(String),
    #[serde(rename = "suggestedLabel")]
    Label(String),
    #[serde(rename = "suggestedText")]
    LinkText(String),
}

impl Suggestion {
    pub fn text(&self) -> &str {
        match self {
            Suggestion::AltText(s) | Suggestion::Label(s) | Suggestion::LinkText(s) => s,
        }
    }
}

/// Human-facing fields attached to an issue after detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub explanation: String,
    #[serde(flatten)]
    pub suggestion: Option<Suggestion>,
    #[serde(rename = "fixedCode")]
    pub fixed_code: String,
}

impl Enrichment {
    /// Fallback: generic explanation, element unchanged, no suggestion.
    pub fn fallback(issue: &Issue) -> Self {
        Self {
            explanation: FALLBACK_EXPLANATION.to_string(),
            suggestion: None,
            fixed_code: issue.element.clone(),
        }
    }
}

/// An issue together with its enrichment, serialized as one flat object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedIssue {
    #[serde(flatten)]
    pub issue: Issue,
    #[serde(flatten)]
    pub enrichment: Enrichment,
}

/// Fan-out settings.
#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions {
    pub concurrency: usize,
    pub call_timeout: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            call_timeout: Duration::from_secs(15),
        }
    }
}

/// Attaches enrichment to issues, falling back per issue on failure.
pub struct Enricher {
    generator: Option<Arc<dyn TextGenerator>>,
    options: EnrichOptions,
}

impl Enricher {
    pub fn new(generator: Arc<dyn TextGenerator>, options: EnrichOptions) -> Self {
        Self {
            generator: Some(generator),
            options,
        }
    }

    /// An enricher that never calls out and always uses the fallback.
    pub fn offline() -> Self {
        Self {
            generator: None,
            options: EnrichOptions::default(),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.generator.is_none()
    }

    /// Enrich one issue. Never fails.
    pub async fn enrich(&self, issue: &Issue) -> Enrichment {
        let Some(generator) = &self.generator else {
            return Enrichment::fallback(issue);
        };

        match self.try_enrich(generator.as_ref(), issue).await {
            Ok(enrichment) => enrichment,
            Err(e) => {
                warn!(issue_type = %issue.issue_type(), error = %e, "enrichment failed, using fallback");
                Enrichment::fallback(issue)
            }
        }
    }

    /// Enrich every issue with bounded concurrency, preserving input order.
    pub async fn enrich_all(&self, issues: Vec<Issue>) -> Vec<EnrichedIssue> {
        let concurrency = self.options.concurrency.max(1);
        debug!(issues = issues.len(), concurrency, "enriching issues");

        stream::iter(issues)
            .map(|issue| async move {
                let enrichment = self.enrich(&issue).await;
                EnrichedIssue { issue, enrichment }
            })
            .buffered(concurrency)
            .collect()
            .await
    }

    async fn try_enrich(
        &self,
        generator: &dyn TextGenerator,
        issue: &Issue,
    ) -> EnrichResult<Enrichment> {
        let suggestion = match suggestion_prompt(&issue.detail) {
            Some((kind, prompt)) => {
                let text = clean_suggestion(&self.generate(generator, &prompt).await?);
                if text.is_empty() {
                    return Err(EnrichError::Empty);
                }
                Some(kind.wrap(text))
            }
            None => None,
        };
        let explanation = self
            .generate(generator, &explanation_prompt(issue.issue_type()))
            .await?;
        let fixed_code = fixed_code(issue, suggestion.as_ref());

        Ok(Enrichment {
            explanation,
            suggestion,
            fixed_code,
        })
    }

    async fn generate(&self, generator: &dyn TextGenerator, prompt: &Prompt) -> EnrichResult<String> {
        let limit = self.options.call_timeout;
        let text = tokio::time::timeout(limit, generator.generate(&prompt.text, prompt.max_tokens))
            .await
            .map_err(|_| EnrichError::Timeout(limit))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(EnrichError::Empty);
        }
        Ok(text.to_string())
    }
}

/// Models often wrap one-line answers in quotes.
fn clean_suggestion(text: &str) -> String {
    let trimmed = text.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
