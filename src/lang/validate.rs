//! Translation output validation.
//!
//! Engines are instructed to answer in the target language's script with no
//! commentary, but model output can drift: wrong script, leftover
//! "Translation:" prefixes, dropped URLs. This module checks a translation
//! against the requested target and reports what it finds. The service logs
//! the findings; nothing here rejects a translation.

use crate::lang::{Language, Script};
use regex::Regex;
use std::sync::OnceLock;

/// Validation report for a single translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// The output is not usable as-is (e.g., entirely in the wrong script)
    pub errors: Vec<String>,

    /// The output is usable but imperfect
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for translated output.
pub struct TranslationCheck;

static URL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Instruction echoes that occasionally survive in model output.
const ARTIFACT_PREFIXES: &[&str] = &[
    "translation:",
    "translated text:",
    "here is the translation",
    "the translation is",
];

impl TranslationCheck {
    /// Validate a translation against the requested target language.
    ///
    /// Checks that:
    /// - the output's dominant script matches the target's script
    /// - no instruction echo ("Translation: ...") leads the output
    /// - URLs from the source text survived
    pub fn validate(target: Language, original: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        let expected = target.script();
        if let Some(dominant) = Script::dominant(translated) {
            if dominant != expected {
                let any_target_script = translated.chars().any(|c| expected.contains_char(c));
                if any_target_script {
                    report.warnings.push(format!(
                        "Mixed script: expected {} for {}, dominant script is {}",
                        expected,
                        target.code(),
                        dominant
                    ));
                } else {
                    report.errors.push(format!(
                        "Script mismatch: expected {} for {}, got {}",
                        expected,
                        target.code(),
                        dominant
                    ));
                }
            }
        }

        let lowered = translated.trim_start().to_lowercase();
        for prefix in ARTIFACT_PREFIXES {
            if lowered.starts_with(prefix) {
                report
                    .warnings
                    .push(format!("Instruction echo in output: starts with {:?}", prefix));
                break;
            }
        }

        let orig_urls = Self::extract_urls(original);
        let trans_urls = Self::extract_urls(translated);
        if orig_urls != trans_urls {
            report.warnings.push(format!(
                "URL mismatch: source has {} URLs, translation has {}",
                orig_urls.len(),
                trans_urls.len()
            ));
        }

        report
    }

    /// Extract all URLs from text
    fn extract_urls(text: &str) -> Vec<String> {
        let regex = URL_REGEX.get_or_init(|| Regex::new(r"https?://[^\s)\]]+").unwrap());

        regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
