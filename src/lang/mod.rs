//! Language support for the turn pipeline.
//!
//! This module handles everything language-related:
//! - Script identification over Unicode ranges (`script`)
//! - The registry of supported languages (`registry`)
//! - The `Language` handle used throughout the pipeline (`language`)
//! - Input language detection (`detect`)
//! - Translation output validation (`validate`)
//!
//! The pipeline itself works in English; these types tell it which language a
//! query arrived in and whether a translation looks like it came back in the
//! right script.

pub mod detect;
pub mod language;
pub mod registry;
pub mod script;
pub mod validate;

pub use detect::detect;
pub use language::Language;
pub use registry::{LanguageProfile, LanguageRegistry};
pub use script::Script;
pub use validate::{TranslationCheck, ValidationReport};
