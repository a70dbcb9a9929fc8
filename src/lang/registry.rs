//! Language registry: single source of truth for all supported languages.
//!
//! Every language the pipeline can detect or translate into is listed here,
//! with its normalized code, detector tag, display names, and script. The
//! registry uses a singleton pattern with `OnceLock` for thread-safe
//! initialization and access.

use crate::lang::Script;
use std::sync::OnceLock;

/// Profile of a supported language.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    /// Normalized language+script code (e.g., "eng_Latn", "hin_Deva")
    pub code: &'static str,

    /// Detector-side tag (ISO 639-1 style, e.g., "en", "hi")
    pub tag: &'static str,

    /// English name of the language (e.g., "Hindi", "Tamil")
    pub name: &'static str,

    /// Native name of the language (e.g., "हिन्दी", "தமிழ்")
    pub native_name: &'static str,

    /// Script the language is written in
    pub script: Script,

    /// Whether this is the default/fallback language (only one should be true)
    pub is_default: bool,

    /// Whether this language is enabled as a detection/translation target
    pub enabled: bool,
}

/// Global language registry singleton.
///
/// Initialized once on first access and immutable thereafter.
pub struct LanguageRegistry {
    languages: Vec<LanguageProfile>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: supported_languages(),
        })
    }

    /// Get a language profile by its normalized code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageProfile> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get a language profile by its detector-side tag.
    pub fn get_by_tag(&self, tag: &str) -> Option<&LanguageProfile> {
        self.languages.iter().find(|lang| lang.tag == tag)
    }

    /// Get all enabled languages.
    pub fn list_enabled(&self) -> Vec<&LanguageProfile> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get all languages (including disabled ones).
    pub fn list_all(&self) -> Vec<&LanguageProfile> {
        self.languages.iter().collect()
    }

    /// Get all enabled languages written in the given script.
    pub fn list_enabled_with_script(&self, script: Script) -> Vec<&LanguageProfile> {
        self.languages
            .iter()
            .filter(|lang| lang.enabled && lang.script == script)
            .collect()
    }

    /// Get the default/fallback language profile.
    ///
    /// Every detection failure and every unsupported code collapses to this
    /// language. There must be exactly one.
    ///
    /// # Panics
    /// Panics if no default language is found or if multiple defaults are
    /// defined (a registry configuration error).
    pub fn default_language(&self) -> &LanguageProfile {
        let defaults: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_default)
            .collect();

        match defaults.len() {
            0 => panic!("No default language found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default languages found in registry"),
        }
    }

    /// Check if a normalized code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

/// The fixed supported set.
///
/// Traditional Chinese is listed but disabled: the detector cannot tell it
/// apart from Simplified by script alone, so it never becomes a target.
fn supported_languages() -> Vec<LanguageProfile> {
    vec![
        LanguageProfile {
            code: "eng_Latn",
            tag: "en",
            name: "English",
            native_name: "English",
            script: Script::Latin,
            is_default: true,
            enabled: true,
        },
        LanguageProfile {
            code: "spa_Latn",
            tag: "es",
            name: "Spanish",
            native_name: "Español",
            script: Script::Latin,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "fra_Latn",
            tag: "fr",
            name: "French",
            native_name: "Français",
            script: Script::Latin,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "deu_Latn",
            tag: "de",
            name: "German",
            native_name: "Deutsch",
            script: Script::Latin,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "hin_Deva",
            tag: "hi",
            name: "Hindi",
            native_name: "हिन्दी",
            script: Script::Devanagari,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "mar_Deva",
            tag: "mr",
            name: "Marathi",
            native_name: "मराठी",
            script: Script::Devanagari,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "ben_Beng",
            tag: "bn",
            name: "Bengali",
            native_name: "বাংলা",
            script: Script::Bengali,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "guj_Gujr",
            tag: "gu",
            name: "Gujarati",
            native_name: "ગુજરાતી",
            script: Script::Gujarati,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "pan_Guru",
            tag: "pa",
            name: "Punjabi",
            native_name: "ਪੰਜਾਬੀ",
            script: Script::Gurmukhi,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "tam_Taml",
            tag: "ta",
            name: "Tamil",
            native_name: "தமிழ்",
            script: Script::Tamil,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "tel_Telu",
            tag: "te",
            name: "Telugu",
            native_name: "తెలుగు",
            script: Script::Telugu,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "kan_Knda",
            tag: "kn",
            name: "Kannada",
            native_name: "ಕನ್ನಡ",
            script: Script::Kannada,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "mal_Mlym",
            tag: "ml",
            name: "Malayalam",
            native_name: "മലയാളം",
            script: Script::Malayalam,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "urd_Arab",
            tag: "ur",
            name: "Urdu",
            native_name: "اردو",
            script: Script::Arabic,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "arb_Arab",
            tag: "ar",
            name: "Arabic",
            native_name: "العربية",
            script: Script::Arabic,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "zho_Hans",
            tag: "zh-cn",
            name: "Chinese (Simplified)",
            native_name: "中文(简体)",
            script: Script::Han,
            is_default: false,
            enabled: true,
        },
        LanguageProfile {
            code: "zho_Hant",
            tag: "zh-tw",
            name: "Chinese (Traditional)",
            native_name: "中文(繁體)",
            script: Script::Han,
            is_default: false,
            enabled: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        // Should return the same instance (same memory address)
        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_english() {
        let registry = LanguageRegistry::get();
        let profile = registry.get_by_code("eng_Latn");

        assert!(profile.is_some());
        let profile = profile.unwrap();
        assert_eq!(profile.code, "eng_Latn");
        assert_eq!(profile.tag, "en");
        assert_eq!(profile.name, "English");
        assert_eq!(profile.script, Script::Latin);
        assert!(profile.is_default);
        assert!(profile.enabled);
    }

    #[test]
    fn test_get_by_code_hindi() {
        let registry = LanguageRegistry::get();
        let profile = registry.get_by_code("hin_Deva");

        assert!(profile.is_some());
        let profile = profile.unwrap();
        assert_eq!(profile.tag, "hi");
        assert_eq!(profile.name, "Hindi");
        assert_eq!(profile.native_name, "हिन्दी");
        assert_eq!(profile.script, Script::Devanagari);
        assert!(!profile.is_default);
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        let registry = LanguageRegistry::get();
        assert!(registry.get_by_code("xx_Latn").is_none());
        assert!(registry.get_by_code("").is_none());
    }

    #[test]
    fn test_get_by_tag() {
        let registry = LanguageRegistry::get();
        assert_eq!(registry.get_by_tag("ta").unwrap().code, "tam_Taml");
        assert_eq!(registry.get_by_tag("zh-cn").unwrap().code, "zho_Hans");
        assert!(registry.get_by_tag("xx").is_none());
    }

    #[test]
    fn test_list_enabled_excludes_traditional_chinese() {
        let registry = LanguageRegistry::get();
        let enabled = registry.list_enabled();

        assert_eq!(enabled.len(), 16);
        assert!(enabled.iter().any(|lang| lang.code == "zho_Hans"));
        assert!(!enabled.iter().any(|lang| lang.code == "zho_Hant"));
    }

    #[test]
    fn test_list_all_includes_disabled() {
        let registry = LanguageRegistry::get();
        let all = registry.list_all();

        assert_eq!(all.len(), 17);
        assert!(all.iter().any(|lang| lang.code == "zho_Hant"));
    }

    #[test]
    fn test_list_enabled_with_script() {
        let registry = LanguageRegistry::get();

        let latin = registry.list_enabled_with_script(Script::Latin);
        assert_eq!(latin.len(), 4);
        assert_eq!(latin[0].code, "eng_Latn");

        let devanagari = registry.list_enabled_with_script(Script::Devanagari);
        assert_eq!(devanagari.len(), 2);

        let han = registry.list_enabled_with_script(Script::Han);
        assert_eq!(han.len(), 1);
        assert_eq!(han[0].code, "zho_Hans");
    }

    #[test]
    fn test_default_language_is_english() {
        let registry = LanguageRegistry::get();
        let default = registry.default_language();

        assert_eq!(default.code, "eng_Latn");
        assert!(default.is_default);
    }

    #[test]
    fn test_exactly_one_default() {
        let registry = LanguageRegistry::get();
        let defaults = registry
            .list_all()
            .iter()
            .filter(|lang| lang.is_default)
            .count();
        assert_eq!(defaults, 1);
    }

    #[test]
    fn test_is_enabled() {
        let registry = LanguageRegistry::get();
        assert!(registry.is_enabled("eng_Latn"));
        assert!(registry.is_enabled("urd_Arab"));
        assert!(!registry.is_enabled("zho_Hant"));
        assert!(!registry.is_enabled("xx_Latn"));
    }

    #[test]
    fn test_codes_and_tags_are_unique() {
        let registry = LanguageRegistry::get();
        let all = registry.list_all();

        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i + 1) {
                assert_ne!(a.code, b.code, "duplicate code {}", a.code);
                assert_ne!(a.tag, b.tag, "duplicate tag {}", a.tag);
            }
        }
    }

    #[test]
    fn test_language_profile_clone() {
        let profile = LanguageProfile {
            code: "eng_Latn",
            tag: "en",
            name: "English",
            native_name: "English",
            script: Script::Latin,
            is_default: true,
            enabled: true,
        };

        let cloned = profile.clone();
        assert_eq!(profile.code, cloned.code);
        assert_eq!(profile.script, cloned.script);
    }
}
