//! Translation between supported languages and English.
//!
//! A [`TranslationEngine`] handles one `(source, target)` pair: it carries the
//! instruction header that names both languages and forces the target script,
//! and it runs completions through the shared inference backend with
//! low-temperature decoding. Engines are built lazily on first use and cached
//! for the life of the process.
//!
//! [`TranslationService`] owns the cache and exposes the directional
//! conveniences the pipeline uses: `to_english` and `from_english`. Failures
//! never propagate out of the service; they come back as a short
//! `"[Translation error: <Kind>]"` diagnostic so a turn always has text.

use crate::backend::{normalize_completion, BackendError, DecodingParams, InferenceBackend};
use crate::lang::{Language, TranslationCheck};
use crate::metrics::PipelineMetrics;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Translator for one language pair.
pub struct TranslationEngine {
    source: Language,
    target: Language,
    header: String,
    backend: Arc<dyn InferenceBackend>,
}

impl TranslationEngine {
    pub fn new(source: Language, target: Language, backend: Arc<dyn InferenceBackend>) -> Self {
        let header = format!(
            "You are a professional translator. Translate the following text from {} to {}.\n\
             Write the translation in the {} script (for example: {}).\n\
             Output ONLY the translation, with no explanations or labels.",
            source.name(),
            target.name(),
            target.script().name(),
            target.script().sample(),
        );

        Self {
            source,
            target,
            header,
            backend,
        }
    }

    pub fn source(&self) -> Language {
        self.source
    }

    pub fn target(&self) -> Language {
        self.target
    }

    fn build_prompt(&self, text: &str) -> String {
        format!("{}\n\nText:\n{}\n\nTranslation:", self.header, text)
    }

    /// Translate one text. The output is trimmed; script and artifact
    /// findings are logged, never fatal.
    pub async fn translate(&self, text: &str) -> Result<String, BackendError> {
        let prompt = self.build_prompt(text);
        let value = self
            .backend
            .complete(&prompt, &DecodingParams::translation())
            .await?;
        let translated = normalize_completion(&value).trim().to_string();

        let report = TranslationCheck::validate(self.target, text, &translated);
        for finding in report.errors.iter().chain(report.warnings.iter()) {
            warn!(
                "Translation {} -> {}: {}",
                self.source, self.target, finding
            );
        }

        Ok(translated)
    }
}

/// Process-wide translation service with a cache of per-pair engines.
pub struct TranslationService {
    backend: Arc<dyn InferenceBackend>,
    engines: RwLock<HashMap<(Language, Language), Arc<TranslationEngine>>>,
}

impl TranslationService {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            backend,
            engines: RwLock::new(HashMap::new()),
        }
    }

    /// Look up or build the engine for a pair. Engine construction is cheap
    /// and synchronous, so first use is single-flight under the write lock.
    fn engine_for(&self, source: Language, target: Language) -> Arc<TranslationEngine> {
        let key = (source, target);
        let metrics = PipelineMetrics::global();

        {
            // A poisoned lock only means another thread panicked mid-insert;
            // the map itself is still usable
            let engines = self.engines.read().unwrap_or_else(|e| e.into_inner());
            if let Some(engine) = engines.get(&key) {
                metrics.record_engine_hit();
                return Arc::clone(engine);
            }
        }

        let mut engines = self.engines.write().unwrap_or_else(|e| e.into_inner());
        if let Some(engine) = engines.get(&key) {
            metrics.record_engine_hit();
            return Arc::clone(engine);
        }

        metrics.record_engine_miss();
        debug!("Building translation engine for {} -> {}", source, target);
        let engine = Arc::new(TranslationEngine::new(
            source,
            target,
            Arc::clone(&self.backend),
        ));
        engines.insert(key, Arc::clone(&engine));
        engine
    }

    /// Translate text between two supported languages.
    ///
    /// Identity pairs return the input unchanged without touching the
    /// backend. Empty input short-circuits to an empty result.
    pub async fn try_translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, BackendError> {
        if source == target {
            return Ok(text.to_string());
        }
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let engine = self.engine_for(source, target);
        engine.translate(text).await
    }

    /// Like [`try_translate`](Self::try_translate), but absorbs failures into
    /// a `"[Translation error: <Kind>]"` diagnostic.
    pub async fn translate(&self, text: &str, source: Language, target: Language) -> String {
        match self.try_translate(text, source, target).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation {} -> {} failed: {}", source, target, e);
                format!("[Translation error: {}]", e.kind())
            }
        }
    }

    /// Normalize user text to English. Returns the text and whether a
    /// translation actually happened.
    pub async fn to_english(&self, text: &str, source: Language) -> (String, bool) {
        if source == Language::ENGLISH {
            return (text.to_string(), false);
        }
        let translated = self.translate(text, source, Language::ENGLISH).await;
        (translated, true)
    }

    /// Render an English answer in the user's language.
    pub async fn from_english(&self, text: &str, target: Language) -> String {
        if target == Language::ENGLISH {
            return text.to_string();
        }
        self.translate(text, Language::ENGLISH, target).await
    }

    #[cfg(test)]
    fn engine_count(&self) -> usize {
        self.engines
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}
