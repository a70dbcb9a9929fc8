//! The turn pipeline.
//!
//! One call, [`Pipeline::handle_turn`], takes raw user text and a domain role
//! and walks the fixed sequence: detect the language, normalize to English,
//! try the rule table, otherwise generate, then translate the answer back.
//! Every step absorbs its own failures, so a turn always ends with text; the
//! record says which layer produced it.

use crate::backend::{select_backend, BackendError, InferenceBackend};
use crate::config::Config;
use crate::generator::{AnswerGenerator, DomainRole};
use crate::heuristics::HeuristicResponder;
use crate::lang::{detect, Language};
use crate::metrics::PipelineMetrics;
use crate::translation::TranslationService;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

const COULD_NOT_TRANSLATE: &str = "Could not translate your input.";
const MODEL_NO_RESPONSE: &str = "The language model did not return a response.";

/// Inputs shorter than this are too little signal to trust a default-English
/// detection over what the session spoke before.
const SHORT_INPUT_CHARS: usize = 12;

/// Which layer produced the final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnsweredVia {
    LocalHeuristic,
    Llm,
    Fallback,
}

impl AnsweredVia {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalHeuristic => "local_heuristic",
            Self::Llm => "llm",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for AnsweredVia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything one turn produced, for display and logging.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub detected_language: Language,
    pub english_query: String,
    pub english_answer: String,
    pub final_answer: String,
    pub answered_via: AnsweredVia,
    pub was_translated: bool,
    pub created_at: DateTime<Utc>,
}

/// The language this session last spoke.
pub struct SessionLanguageMemory {
    last: Mutex<Option<Language>>,
}

impl SessionLanguageMemory {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    pub fn remember(&self, language: Language) {
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(language);
    }

    pub fn recall(&self) -> Option<Language> {
        *self.last.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SessionLanguageMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// One session's turn processor.
pub struct Pipeline {
    backend: Arc<dyn InferenceBackend>,
    translator: TranslationService,
    generator: AnswerGenerator,
    memory: SessionLanguageMemory,
    default_language: Language,
}

impl Pipeline {
    /// Build a pipeline on the backend the configuration selects.
    pub fn new(config: &Config) -> Result<Self> {
        let backend = select_backend(config)?;
        Ok(Self::with_backend(backend, config))
    }

    /// Build a pipeline on a caller-supplied backend.
    pub fn with_backend(backend: Arc<dyn InferenceBackend>, config: &Config) -> Self {
        Self {
            translator: TranslationService::new(Arc::clone(&backend)),
            generator: AnswerGenerator::new(Arc::clone(&backend), config.max_new_tokens),
            memory: SessionLanguageMemory::new(),
            default_language: config.default_language,
            backend,
        }
    }

    /// Probe the backend before taking traffic. On the local backend this
    /// checks the server is up and the model is pulled.
    pub async fn ensure_ready(&self) -> Result<(), BackendError> {
        self.backend.ensure_ready().await
    }

    /// Process one turn.
    ///
    /// The turn runs in its own task so that a panic anywhere inside becomes
    /// a generic internal-error record instead of taking the caller down.
    pub async fn handle_turn(self: &Arc<Self>, text: &str, role: &str) -> TurnRecord {
        let pipeline = Arc::clone(self);
        let text = text.to_string();
        let role = role.to_string();

        let record = match tokio::spawn(async move { pipeline.run_turn(&text, &role).await }).await
        {
            Ok(record) => record,
            Err(e) => {
                let kind = if e.is_panic() { "Panic" } else { "Cancelled" };
                error!("Turn failed inside the orchestrator: {}", e);
                TurnRecord {
                    detected_language: Language::default_language(),
                    english_query: String::new(),
                    english_answer: String::new(),
                    final_answer: format!("Internal error ({}).", kind),
                    answered_via: AnsweredVia::Fallback,
                    was_translated: false,
                    created_at: Utc::now(),
                }
            }
        };

        info!(
            "Turn complete: language {}, answered via {}",
            record.detected_language, record.answered_via
        );
        record
    }

    async fn run_turn(&self, text: &str, role: &str) -> TurnRecord {
        let role = DomainRole::parse(role);
        debug!("Turn started with role '{}'", role);

        let detected = self.detect_with_memory(text);
        self.memory.remember(detected);
        debug!("Detected language: {}", detected);

        let (english_query, was_translated) = self.translator.to_english(text, detected).await;
        if english_query.trim().is_empty() {
            warn!("Turn ended early: nothing left after normalization");
            return self.record(
                detected,
                english_query,
                String::new(),
                COULD_NOT_TRANSLATE.to_string(),
                AnsweredVia::Fallback,
                was_translated,
            );
        }

        if let Some(answer) = HeuristicResponder::try_answer(&english_query) {
            PipelineMetrics::global().record_heuristic_hit();
            debug!("Rule table answered the turn");
            let final_answer = self.render_final(&answer, detected).await;
            return self.record(
                detected,
                english_query,
                answer,
                final_answer,
                AnsweredVia::LocalHeuristic,
                was_translated,
            );
        }

        let english_answer = self.generator.generate(&english_query, role).await;
        if english_answer.trim().is_empty() {
            warn!("Turn ended early: the model returned nothing");
            return self.record(
                detected,
                english_query,
                english_answer,
                MODEL_NO_RESPONSE.to_string(),
                AnsweredVia::Fallback,
                was_translated,
            );
        }

        let final_answer = self.render_final(&english_answer, detected).await;
        self.record(
            detected,
            english_query,
            english_answer,
            final_answer,
            AnsweredVia::Llm,
            was_translated,
        )
    }

    /// Detect the turn's language. A short input that detects as the default
    /// is treated as uncertain: the session's previous language wins, then
    /// the configured default.
    fn detect_with_memory(&self, text: &str) -> Language {
        let detected = detect(text);
        let trimmed_chars = text.trim().chars().count();
        if trimmed_chars >= SHORT_INPUT_CHARS || detected != Language::default_language() {
            return detected;
        }

        if let Some(remembered) = self.memory.recall() {
            debug!(
                "Short input detected as default, reusing session language {}",
                remembered
            );
            return remembered;
        }
        if self.default_language != Language::default_language() {
            debug!(
                "Short input with no session history, using configured default {}",
                self.default_language
            );
            return self.default_language;
        }
        detected
    }

    /// Translate an English answer for the user. An empty translation falls
    /// back to the English answer so the reply is never blank.
    async fn render_final(&self, english_answer: &str, target: Language) -> String {
        let translated = self.translator.from_english(english_answer, target).await;
        if translated.trim().is_empty() {
            warn!(
                "Translation back to {} produced nothing, answering in English",
                target
            );
            english_answer.to_string()
        } else {
            translated
        }
    }

    fn record(
        &self,
        detected_language: Language,
        english_query: String,
        english_answer: String,
        final_answer: String,
        answered_via: AnsweredVia,
        was_translated: bool,
    ) -> TurnRecord {
        TurnRecord {
            detected_language,
            english_query,
            english_answer,
            final_answer,
            answered_via,
            was_translated,
            created_at: Utc::now(),
        }
    }
}
