//! Language detection from raw text.
//!
//! Detection runs in two statistical passes. The first finds the dominant
//! script of the input by character counting; scripts used by exactly one
//! supported language settle the question immediately. Scripts shared by
//! several languages (Latin, Devanagari, Perso-Arabic) go through a second
//! pass that scores a small marker-word vocabulary per candidate. The raw
//! tag from those passes is then mapped through the registry table; anything
//! unknown, disabled, or undecidable resolves to the default language.
//! Detection never fails and never blocks a turn.

use crate::lang::{Language, LanguageRegistry, Script};
use tracing::warn;

const ENGLISH_MARKERS: &[&str] = &[
    "the", "is", "are", "was", "were", "a", "an", "of", "to", "in", "and", "what", "how", "why",
    "when", "who", "you", "your", "it", "that", "this", "for", "on", "with", "i", "my", "me",
    "can", "do", "does", "have", "has", "will",
];

const SPANISH_MARKERS: &[&str] = &[
    "el", "la", "los", "las", "un", "una", "es", "son", "está", "están", "de", "del", "en", "y",
    "que", "qué", "cómo", "cuál", "para", "por", "con", "no", "sí", "hola", "se", "mi", "tu",
    "usted", "hay", "hoy",
];

const FRENCH_MARKERS: &[&str] = &[
    "le", "la", "les", "un", "une", "des", "du", "est", "sont", "et", "que", "qui", "quoi",
    "quel", "quelle", "comment", "pourquoi", "pour", "dans", "avec", "vous", "je", "tu", "il",
    "elle", "ne", "pas", "bonjour", "c'est",
];

const GERMAN_MARKERS: &[&str] = &[
    "der", "die", "das", "ein", "eine", "ist", "sind", "und", "zu", "nicht", "ich", "du", "sie",
    "wir", "mit", "für", "auf", "wie", "was", "wer", "wo", "warum", "ja", "nein", "bitte",
    "danke", "haben", "kann",
];

const HINDI_MARKERS: &[&str] = &[
    "है", "हैं", "का", "की", "के", "में", "क्या", "कैसे", "और", "से", "को", "यह", "वह", "नहीं", "आप",
    "मैं", "हूँ", "हो", "था", "थी", "पर", "भी",
];

const MARATHI_MARKERS: &[&str] = &[
    "आहे", "आहेत", "आहात", "आणि", "मध्ये", "काय", "कसे", "कशी", "मी", "तू", "तुम्ही", "मला",
    "तुला", "चा", "ची", "चे", "नाही", "होता",
];

const ARABIC_MARKERS: &[&str] = &[
    "ما", "هو", "هي", "في", "من", "على", "هل", "إلى", "هذا", "هذه", "أنا", "أنت", "لا", "نعم",
    "كيف", "متى", "أين", "الوقت",
];

const URDU_MARKERS: &[&str] = &[
    "ہے", "ہیں", "کا", "کی", "کے", "میں", "کیا", "کیسے", "اور", "سے", "کو", "یہ", "وہ", "نہیں",
    "آپ", "ہوں", "تھا", "بھی",
];

/// Candidate order doubles as the tiebreak: a zero-score text in a shared
/// script falls to the first entry.
const LATIN_CANDIDATES: &[(&str, &[&str])] = &[
    ("en", ENGLISH_MARKERS),
    ("es", SPANISH_MARKERS),
    ("fr", FRENCH_MARKERS),
    ("de", GERMAN_MARKERS),
];

const DEVANAGARI_CANDIDATES: &[(&str, &[&str])] = &[("hi", HINDI_MARKERS), ("mr", MARATHI_MARKERS)];

const ARABIC_CANDIDATES: &[(&str, &[&str])] = &[("ar", ARABIC_MARKERS), ("ur", URDU_MARKERS)];

/// Tag for scripts written by exactly one supported language.
fn single_script_tag(script: Script) -> Option<&'static str> {
    match script {
        Script::Bengali => Some("bn"),
        Script::Tamil => Some("ta"),
        Script::Telugu => Some("te"),
        Script::Kannada => Some("kn"),
        Script::Malayalam => Some("ml"),
        Script::Gujarati => Some("gu"),
        Script::Gurmukhi => Some("pa"),
        Script::Han => Some("zh-cn"),
        _ => None,
    }
}

fn marker_score(tokens: &[String], markers: &[&str]) -> usize {
    tokens
        .iter()
        .filter(|token| markers.contains(&token.as_str()))
        .count()
}

/// The statistical identification pass: raw text to a detector tag.
///
/// Returns `None` when the text carries no script signal at all.
pub(crate) fn identify(text: &str) -> Option<&'static str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Pure-ASCII text is clearly Latin; skip the histogram
    let script = if trimmed.is_ascii() {
        Script::Latin
    } else {
        Script::dominant(trimmed)?
    };

    if let Some(tag) = single_script_tag(script) {
        return Some(tag);
    }

    let candidates = match script {
        Script::Latin => LATIN_CANDIDATES,
        Script::Devanagari => DEVANAGARI_CANDIDATES,
        Script::Arabic => ARABIC_CANDIDATES,
        _ => return None,
    };

    let tokens: Vec<String> = trimmed
        .split_whitespace()
        .map(|token| {
            token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect();

    let mut best = candidates[0].0;
    let mut best_score = 0;
    for &(tag, markers) in candidates {
        let score = marker_score(&tokens, markers);
        if score > best_score {
            best = tag;
            best_score = score;
        }
    }
    Some(best)
}

/// Map a detector tag through the registry table.
///
/// Tags without an enabled registry entry collapse to the default language.
pub(crate) fn map_tag(tag: &str) -> Language {
    match LanguageRegistry::get().get_by_tag(tag) {
        Some(profile) if profile.enabled => Language::resolve(profile.code),
        _ => {
            warn!(
                "No enabled registry entry for detected tag '{}', using default",
                tag
            );
            Language::default_language()
        }
    }
}

/// Detect the language of raw user text.
///
/// Empty input, ambiguous input, and unmapped tags all return the default
/// language.
pub fn detect(text: &str) -> Language {
    match identify(text) {
        Some(tag) => map_tag(tag),
        None => Language::default_language(),
    }
}
