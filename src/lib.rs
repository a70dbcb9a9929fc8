//! Multilingual question answering over a single inference backend.
//!
//! A turn flows through a fixed pipeline: detect the input language,
//! translate the text to English, try the local rule table, ask the
//! configured model for anything the rules do not cover, then translate the
//! answer back for the user. [`pipeline::Pipeline`] ties the stages
//! together; [`config::Config`] picks the backend and [`lang`] owns the
//! supported-language set.

pub mod backend;
pub mod config;
pub mod generator;
pub mod heuristics;
pub mod lang;
pub mod metrics;
pub mod pipeline;
pub mod translation;

pub use backend::{select_backend, BackendError, DecodingParams, InferenceBackend};
pub use config::{Config, GenerationMode};
pub use generator::{AnswerGenerator, DomainRole};
pub use heuristics::HeuristicResponder;
pub use lang::{detect, Language};
pub use metrics::PipelineMetrics;
pub use pipeline::{AnsweredVia, Pipeline, SessionLanguageMemory, TurnRecord};
pub use translation::TranslationService;
