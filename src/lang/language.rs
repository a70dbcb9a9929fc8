//! Language type: validated handle into the language registry.
//!
//! A `Language` can only be constructed for codes the registry knows and has
//! enabled, so anything holding one can rely on the supported-set invariant
//! without rechecking it downstream.

use crate::lang::{LanguageProfile, LanguageRegistry, Script};
use anyhow::{bail, Result};

/// A validated language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// Normalized language+script code (e.g., "eng_Latn")
    code: &'static str,
}

impl Language {
    /// The default/fallback language.
    pub const ENGLISH: Language = Language { code: "eng_Latn" };

    /// Convenience constant for Hindi.
    pub const HINDI: Language = Language { code: "hin_Deva" };

    /// Convenience constant for Spanish.
    pub const SPANISH: Language = Language { code: "spa_Latn" };

    /// Convenience constant for Tamil.
    pub const TAMIL: Language = Language { code: "tam_Taml" };

    /// Create a Language from a normalized code.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is known and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(profile) if profile.enabled => Ok(Language {
                code: profile.code, // Use the static str from the registry
            }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Resolve a code to a Language, collapsing anything unknown or disabled
    /// to the default language.
    ///
    /// This is the detection-time entry point: unsupported codes must fold to
    /// the default here and never reach the translation layer.
    pub fn resolve(code: &str) -> Language {
        Self::from_code(code).unwrap_or_else(|_| Self::default_language())
    }

    /// Get the default/fallback language from the registry.
    pub fn default_language() -> Language {
        let profile = LanguageRegistry::get().default_language();
        Language { code: profile.code }
    }

    /// Get the normalized language+script code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language profile from the registry.
    ///
    /// # Panics
    /// Panics if the code is not found in the registry. This cannot happen
    /// for a Language constructed via `from_code`, `resolve`, or the
    /// constants.
    pub fn profile(&self) -> &'static LanguageProfile {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// Get the detector-side tag (e.g., "en", "hi").
    pub fn tag(&self) -> &'static str {
        self.profile().tag
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    /// Get the native name of the language.
    pub fn native_name(&self) -> &'static str {
        self.profile().native_name
    }

    /// Get the script the language is written in.
    pub fn script(&self) -> Script {
        self.profile().script
    }

    /// Check if this is the default/fallback language.
    pub fn is_default(&self) -> bool {
        self.profile().is_default
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl serde::Serialize for Language {
    /// Serializes as the normalized code, e.g. `"hin_Deva"`.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code)
    }
}
