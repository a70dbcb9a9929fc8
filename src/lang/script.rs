//! Script systems used by the supported languages.
//!
//! Script knowledge drives two things: the detector's cheap pre-check
//! (dominant script of the input) and the target-script line that
//! translation prompts use to pin the output script.

use serde::{Deserialize, Serialize};

/// Writing systems covered by the language registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Script {
    Latin,
    Devanagari,
    Bengali,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Gujarati,
    Gurmukhi,
    Arabic,
    Han,
}

/// Scan order for classification. Latin comes last so that ties on short
/// mixed input resolve toward the non-Latin script.
const ALL_SCRIPTS: [Script; 11] = [
    Script::Devanagari,
    Script::Bengali,
    Script::Tamil,
    Script::Telugu,
    Script::Kannada,
    Script::Malayalam,
    Script::Gujarati,
    Script::Gurmukhi,
    Script::Arabic,
    Script::Han,
    Script::Latin,
];

impl Script {
    /// Get the Unicode range for this script (first block only).
    pub fn unicode_range(&self) -> (u32, u32) {
        match self {
            Self::Latin => (0x0000, 0x024F),
            Self::Devanagari => (0x0900, 0x097F),
            Self::Bengali => (0x0980, 0x09FF),
            Self::Tamil => (0x0B80, 0x0BFF),
            Self::Telugu => (0x0C00, 0x0C7F),
            Self::Kannada => (0x0C80, 0x0CFF),
            Self::Malayalam => (0x0D00, 0x0D7F),
            Self::Gujarati => (0x0A80, 0x0AFF),
            Self::Gurmukhi => (0x0A00, 0x0A7F),
            Self::Arabic => (0x0600, 0x06FF),
            Self::Han => (0x4E00, 0x9FFF),
        }
    }

    /// Check if a character belongs to this script.
    ///
    /// Only letters count for Latin; the low Unicode blocks are full of
    /// digits, punctuation, and whitespace that every language shares.
    pub fn contains_char(&self, c: char) -> bool {
        let code = c as u32;
        let (start, end) = self.unicode_range();
        if *self == Self::Latin {
            return c.is_alphabetic() && code <= end;
        }
        code >= start && code <= end
    }

    /// Detect the dominant script of a text by character counting.
    ///
    /// Returns `None` when no character belongs to any known script
    /// (digits-only or punctuation-only input).
    pub fn dominant(text: &str) -> Option<Self> {
        let mut counts = [0usize; ALL_SCRIPTS.len()];

        for c in text.chars() {
            for (i, script) in ALL_SCRIPTS.iter().enumerate() {
                if script.contains_char(c) {
                    counts[i] += 1;
                    break;
                }
            }
        }

        let mut best: Option<(usize, usize)> = None;
        for (i, &count) in counts.iter().enumerate() {
            if count > 0 && best.map(|(_, c)| count > c).unwrap_or(true) {
                best = Some((i, count));
            }
        }
        best.map(|(i, _)| ALL_SCRIPTS[i])
    }

    /// Get the English name of the script.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Latin => "Latin",
            Self::Devanagari => "Devanagari",
            Self::Bengali => "Bengali",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Kannada => "Kannada",
            Self::Malayalam => "Malayalam",
            Self::Gujarati => "Gujarati",
            Self::Gurmukhi => "Gurmukhi",
            Self::Arabic => "Perso-Arabic",
            Self::Han => "Han",
        }
    }

    /// Get a short sample word in this script.
    ///
    /// Used as an anchor in translation prompts so the model cannot drift
    /// into transliteration.
    pub fn sample(&self) -> &'static str {
        match self {
            Self::Latin => "hello",
            Self::Devanagari => "नमस्ते",
            Self::Bengali => "বাংলা",
            Self::Tamil => "தமிழ்",
            Self::Telugu => "తెలుగు",
            Self::Kannada => "ಕನ್ನಡ",
            Self::Malayalam => "മലയാളം",
            Self::Gujarati => "ગુજરાતી",
            Self::Gurmukhi => "ਪੰਜਾਬੀ",
            Self::Arabic => "اردو",
            Self::Han => "中文",
        }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Range Tests ====================

    #[test]
    fn test_unicode_ranges_do_not_overlap_for_indic_scripts() {
        let indic = [
            Script::Devanagari,
            Script::Bengali,
            Script::Gurmukhi,
            Script::Gujarati,
            Script::Tamil,
            Script::Telugu,
            Script::Kannada,
            Script::Malayalam,
        ];

        for (i, a) in indic.iter().enumerate() {
            for b in indic.iter().skip(i + 1) {
                let (a_start, a_end) = a.unicode_range();
                let (b_start, b_end) = b.unicode_range();
                assert!(
                    a_end < b_start || b_end < a_start,
                    "{} and {} overlap",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_contains_char_devanagari() {
        assert!(Script::Devanagari.contains_char('न'));
        assert!(Script::Devanagari.contains_char('ह'));
        assert!(!Script::Devanagari.contains_char('a'));
        assert!(!Script::Devanagari.contains_char('த'));
    }

    #[test]
    fn test_contains_char_latin_letters_only() {
        assert!(Script::Latin.contains_char('a'));
        assert!(Script::Latin.contains_char('Z'));
        assert!(Script::Latin.contains_char('é'));
        assert!(Script::Latin.contains_char('ñ'));
        assert!(Script::Latin.contains_char('ß'));
        // Digits, punctuation, and whitespace are script-neutral
        assert!(!Script::Latin.contains_char('3'));
        assert!(!Script::Latin.contains_char('?'));
        assert!(!Script::Latin.contains_char(' '));
    }

    #[test]
    fn test_contains_char_han() {
        assert!(Script::Han.contains_char('中'));
        assert!(Script::Han.contains_char('文'));
        assert!(!Script::Han.contains_char('a'));
    }

    // ==================== Dominant Script Tests ====================

    #[test]
    fn test_dominant_english() {
        assert_eq!(Script::dominant("Hello world"), Some(Script::Latin));
    }

    #[test]
    fn test_dominant_hindi() {
        assert_eq!(Script::dominant("नमस्ते"), Some(Script::Devanagari));
    }

    #[test]
    fn test_dominant_tamil() {
        assert_eq!(Script::dominant("வணக்கம்"), Some(Script::Tamil));
    }

    #[test]
    fn test_dominant_arabic() {
        assert_eq!(Script::dominant("مرحبا"), Some(Script::Arabic));
    }

    #[test]
    fn test_dominant_chinese() {
        assert_eq!(Script::dominant("你好吗"), Some(Script::Han));
    }

    #[test]
    fn test_dominant_mixed_prefers_majority() {
        // Six Devanagari characters vs two Latin letters
        assert_eq!(Script::dominant("नमस्ते ok"), Some(Script::Devanagari));
    }

    #[test]
    fn test_dominant_empty_and_neutral() {
        assert_eq!(Script::dominant(""), None);
        assert_eq!(Script::dominant("   "), None);
        assert_eq!(Script::dominant("123 456 !?"), None);
    }

    #[test]
    fn test_dominant_tie_resolves_to_non_latin() {
        // Two characters each; the scan order breaks the tie
        assert_eq!(Script::dominant("हिab"), Some(Script::Devanagari));
    }

    // ==================== Name and Sample Tests ====================

    #[test]
    fn test_script_names() {
        assert_eq!(Script::Latin.name(), "Latin");
        assert_eq!(Script::Devanagari.name(), "Devanagari");
        assert_eq!(Script::Han.name(), "Han");
    }

    #[test]
    fn test_sample_is_written_in_own_script() {
        for script in ALL_SCRIPTS {
            assert_eq!(
                Script::dominant(script.sample()),
                Some(script),
                "sample for {} is not in its own script",
                script
            );
        }
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(format!("{}", Script::Gurmukhi), "Gurmukhi");
    }
}
