use crate::lang::Language;
use crate::metrics::PipelineMetrics;
use anyhow::{bail, Result};
use tracing::warn;

/// Which backend answers generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// A local inference server on this machine
    Local,
    /// A hosted inference endpoint, requires a credential
    Remote,
}

impl GenerationMode {
    /// Parse a mode string. Accepts the legacy aliases `local_small` and
    /// `hf_inference` alongside `local` and `remote`.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "local" | "local_small" => Ok(Self::Local),
            "remote" | "hf_inference" => Ok(Self::Remote),
            other => bail!("Unknown LLM_MODE '{}' (expected 'local' or 'remote')", other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Token values that mean "nobody configured a real credential".
const PLACEHOLDER_TOKENS: &[&str] = &[
    "changeme",
    "your-api-token-here",
    "your_token_here",
    "hf_your_token_here",
    "xxx",
];

/// Whether a credential is worth sending to the remote endpoint.
fn credential_looks_valid(token: &str) -> bool {
    let trimmed = token.trim();
    !trimmed.is_empty() && !PLACEHOLDER_TOKENS.contains(&trimmed.to_lowercase().as_str())
}

#[derive(Debug, Clone)]
pub struct Config {
    // Generation backend
    pub mode: GenerationMode,

    // Remote inference endpoint
    pub remote_api_token: Option<String>,
    pub remote_api_url: String,
    pub remote_model: String,

    // Local inference server
    pub local_api_url: String,
    pub local_model: String,

    // Pipeline
    pub default_language: Language,
    pub max_new_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Resolve configuration from the environment.
    ///
    /// Every variable has a default, so an empty environment yields a working
    /// local-mode configuration. The remote-to-local downgrade guard runs here,
    /// once: remote mode without a usable credential becomes local mode for the
    /// rest of the process.
    pub fn from_env() -> Result<Self> {
        let requested_mode = std::env::var("LLM_MODE").unwrap_or_else(|_| "local".to_string());
        let mut mode = match GenerationMode::parse(&requested_mode) {
            Ok(mode) => mode,
            Err(e) => {
                warn!("{:#}; falling back to local mode", e);
                GenerationMode::Local
            }
        };

        let remote_api_token = std::env::var("REMOTE_API_TOKEN").ok();

        if mode == GenerationMode::Remote {
            let usable = remote_api_token
                .as_deref()
                .map(credential_looks_valid)
                .unwrap_or(false);
            if !usable {
                warn!(
                    "Remote mode requested but REMOTE_API_TOKEN is unset or a placeholder; \
                     downgrading to local mode for this process"
                );
                PipelineMetrics::global().record_mode_downgrade();
                mode = GenerationMode::Local;
            }
        }

        Ok(Self {
            mode,
            remote_api_token,

            // Remote inference endpoint
            remote_api_url: std::env::var("REMOTE_API_URL")
                .unwrap_or_else(|_| "https://api-inference.huggingface.co/models".to_string()),
            remote_model: std::env::var("REMOTE_MODEL")
                .unwrap_or_else(|_| "meta-llama/Meta-Llama-3.1-8B-Instruct".to_string()),

            // Local inference server
            local_api_url: std::env::var("LOCAL_API_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            local_model: std::env::var("LOCAL_MODEL")
                .unwrap_or_else(|_| "llama3.2:3b".to_string()),

            // Pipeline
            default_language: std::env::var("DEFAULT_LANGUAGE")
                .map(|v| Language::resolve(&v))
                .unwrap_or_else(|_| Language::default_language()),
            max_new_tokens: std::env::var("MAX_NEW_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
            // Bounded so a hung endpoint cannot hang a turn
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120)
                .clamp(30, 120),
        })
    }
}
