//! Role-scoped answer generation.
//!
//! The generator turns an English query into an English answer through the
//! configured inference backend. The only per-call variability in the prompt
//! is the domain role, a static instruction fragment; everything else is a
//! fixed template. Failures never escape: they are absorbed into a
//! `"[LLM error: <Kind>]"` diagnostic so the turn always has text.

use crate::backend::{normalize_completion, BackendError, DecodingParams, InferenceBackend};
use std::sync::Arc;
use tracing::{debug, error, warn};

const SYSTEM_PREAMBLE: &str =
    "You are a helpful assistant. Answer the user's question clearly and concisely.";

/// Which instruction fragment scopes the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainRole {
    General,
    Faq,
    Mentor,
    Recommender,
}

impl DomainRole {
    /// Parse a role string. Unrecognized values degrade to `General`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "" | "general" => Self::General,
            "faq" => Self::Faq,
            "mentor" => Self::Mentor,
            "recommender" => Self::Recommender,
            other => {
                debug!("Unknown domain role '{}', using general", other);
                Self::General
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Faq => "faq",
            Self::Mentor => "mentor",
            Self::Recommender => "recommender",
        }
    }

    /// The instruction fragment injected into the prompt. Empty for the
    /// general role.
    fn instruction(&self) -> &'static str {
        match self {
            Self::General => "",
            Self::Faq => {
                "Answer frequently asked questions about the platform briefly and accurately."
            }
            Self::Mentor => {
                "You are a supportive career and learning mentor. Encourage the user and \
                 suggest practical next steps."
            }
            Self::Recommender => {
                "You recommend courses and learning resources. Suggest a few options with a \
                 short reason for each."
            }
        }
    }
}

impl std::fmt::Display for DomainRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed template: preamble, role fragment, user text, answer cue.
fn build_prompt(text: &str, role: DomainRole) -> String {
    let mut prompt = String::from(SYSTEM_PREAMBLE);
    let fragment = role.instruction();
    if !fragment.is_empty() {
        prompt.push('\n');
        prompt.push_str(fragment);
    }
    prompt.push_str("\nUser: ");
    prompt.push_str(text);
    prompt.push_str("\nAssistant:");
    prompt
}

/// Generates English answers through the configured backend.
pub struct AnswerGenerator {
    backend: Arc<dyn InferenceBackend>,
    params: DecodingParams,
}

impl AnswerGenerator {
    pub fn new(backend: Arc<dyn InferenceBackend>, max_new_tokens: u32) -> Self {
        Self {
            backend,
            params: DecodingParams::generation(max_new_tokens),
        }
    }

    /// Generate an answer, propagating backend failures.
    pub async fn try_generate(
        &self,
        english_text: &str,
        role: DomainRole,
    ) -> Result<String, BackendError> {
        let prompt = build_prompt(english_text, role);
        let value = self.backend.complete(&prompt, &self.params).await?;
        Ok(normalize_completion(&value).trim().to_string())
    }

    /// Generate an answer, absorbing failures into `"[LLM error: <Kind>]"`.
    ///
    /// The result can still be empty when the model returned nothing; the
    /// orchestrator decides what an empty answer means.
    pub async fn generate(&self, english_text: &str, role: DomainRole) -> String {
        match self.try_generate(english_text, role).await {
            Ok(answer) => answer,
            Err(e) => {
                // A model that cannot load deserves a loud log line, the
                // operator has to act on it
                match &e {
                    BackendError::ModelLoad(_) => error!("Generation failed: {}", e),
                    _ => warn!("Generation failed: {}", e),
                }
                format!("[LLM error: {}]", e.kind())
            }
        }
    }
}
