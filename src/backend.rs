//! Inference backends.
//!
//! Answer generation and translation both go through one interface,
//! [`InferenceBackend`], with two implementations: a local inference server
//! (Ollama-style API) and a hosted inference endpoint (Hugging Face-style
//! API). The backend is selected once at startup from configuration; nothing
//! downstream knows which one it is talking to.
//!
//! Backends return the raw JSON body. Callers pass it through
//! [`normalize_completion`] to get a plain string out of whatever shape the
//! endpoint produced.

use crate::config::{Config, GenerationMode};
use crate::metrics::PipelineMetrics;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

/// Sampling controls for one completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl DecodingParams {
    /// Sampled decoding for answer generation.
    pub fn generation(max_new_tokens: u32) -> Self {
        Self {
            max_new_tokens,
            temperature: 0.7,
            top_p: 0.9,
        }
    }

    /// Low-temperature decoding for translation.
    pub fn translation() -> Self {
        Self {
            max_new_tokens: 512,
            temperature: 0.3,
            top_p: 0.9,
        }
    }
}

/// What went wrong talking to a backend.
///
/// `kind()` is the short stable name rendered into user-visible fallback
/// strings; the `Display` form carries the detail and goes to the logs.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    ModelLoad(String),
}

impl BackendError {
    /// Short stable kind name ("Http", "Timeout", "Network", "Decode",
    /// "ModelLoad").
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "Http",
            Self::Timeout(_) => "Timeout",
            Self::Network(_) => "Network",
            Self::Decode(_) => "Decode",
            Self::ModelLoad(_) => "ModelLoad",
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// A language-model backend that can run one completion.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run one completion and return the raw JSON body.
    async fn complete(&self, prompt: &str, params: &DecodingParams) -> Result<Value, BackendError>;

    /// Verify the backend can serve requests. Hosted endpoints are assumed
    /// ready; the local server is probed on first use.
    async fn ensure_ready(&self) -> Result<(), BackendError> {
        Ok(())
    }

    /// Short tag for logs ("local" or "remote").
    fn name(&self) -> &'static str;

    /// The model identifier this backend targets.
    fn model(&self) -> &str;
}

/// Build the backend the configuration selected.
pub fn select_backend(config: &Config) -> Result<Arc<dyn InferenceBackend>> {
    let backend: Arc<dyn InferenceBackend> = match config.mode {
        GenerationMode::Local => Arc::new(LocalBackend::new(config)?),
        GenerationMode::Remote => Arc::new(RemoteBackend::new(config)?),
    };
    info!(
        "Using {} inference backend with model '{}'",
        backend.name(),
        backend.model()
    );
    Ok(backend)
}

// ==================== Local backend ====================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Backend talking to a local inference server (Ollama API).
pub struct LocalBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    ready: OnceCell<()>,
}

impl LocalBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.local_api_url.trim_end_matches('/').to_string(),
            model: config.local_model.clone(),
            ready: OnceCell::new(),
        })
    }

    /// Check the server is up and the model is pulled. Runs at most once per
    /// process; a failure leaves the cell empty so the next call probes again.
    async fn probe(&self) -> Result<(), BackendError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            BackendError::ModelLoad(format!(
                "Could not reach the local inference server at {}: {}. \
                 Start it (`ollama serve`) and pull the model with `ollama pull {}`.",
                self.base_url, e, self.model
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(BackendError::ModelLoad(format!(
                "Local inference server at {} answered {} to the model listing: {}",
                self.base_url, status, body
            )));
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            BackendError::ModelLoad(format!("Could not read the local model listing: {}", e))
        })?;

        // "llama3.2" should match the listed "llama3.2:latest"
        let model_present = tags
            .models
            .iter()
            .any(|m| m.name == self.model || m.name.starts_with(&format!("{}:", self.model)));
        if !model_present {
            return Err(BackendError::ModelLoad(format!(
                "Model '{}' is not available on the local inference server at {}. \
                 Pull it with `ollama pull {}` and try again.",
                self.model, self.base_url, self.model
            )));
        }

        Ok(())
    }

    async fn generate(&self, prompt: &str, params: &DecodingParams) -> Result<Value, BackendError> {
        self.ensure_ready().await?;

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: params.temperature,
                top_p: params.top_p,
                num_predict: params.max_new_tokens,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(BackendError::Http { status, body });
        }

        let body = response.text().await.map_err(BackendError::from_reqwest)?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(value)
    }
}

#[async_trait]
impl InferenceBackend for LocalBackend {
    async fn complete(&self, prompt: &str, params: &DecodingParams) -> Result<Value, BackendError> {
        let metrics = PipelineMetrics::global();
        metrics.record_backend_call();

        let result = self.generate(prompt, params).await;
        if result.is_err() {
            metrics.record_backend_failure();
        }
        result
    }

    async fn ensure_ready(&self) -> Result<(), BackendError> {
        self.ready.get_or_try_init(|| self.probe()).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "local"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ==================== Remote backend ====================

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_full_text: bool,
}

/// Backend talking to a hosted inference endpoint (Hugging Face API).
pub struct RemoteBackend {
    client: reqwest::Client,
    api_url: String,
    model: String,
    token: String,
}

impl RemoteBackend {
    pub fn new(config: &Config) -> Result<Self> {
        // Config downgrades remote mode without a credential before we get
        // here; this guards direct construction.
        let token = config
            .remote_api_token
            .clone()
            .context("Remote mode requires REMOTE_API_TOKEN")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.remote_api_url.trim_end_matches('/').to_string(),
            model: config.remote_model.clone(),
            token,
        })
    }

    async fn infer(&self, prompt: &str, params: &DecodingParams) -> Result<Value, BackendError> {
        let request = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
                return_full_text: false,
            },
        };

        let url = format!("{}/{}", self.api_url, self.model);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(BackendError::Http { status, body });
        }

        let body = response.text().await.map_err(BackendError::from_reqwest)?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(value)
    }
}

#[async_trait]
impl InferenceBackend for RemoteBackend {
    async fn complete(&self, prompt: &str, params: &DecodingParams) -> Result<Value, BackendError> {
        let metrics = PipelineMetrics::global();
        metrics.record_backend_call();

        let result = self.infer(prompt, params).await;
        if result.is_err() {
            metrics.record_backend_failure();
        }
        result
    }

    fn name(&self) -> &'static str {
        "remote"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ==================== Output normalization ====================

/// Field names that carry the completion, checked in order.
const COMPLETION_FIELDS: &[&str] = &[
    "generated_text",
    "text",
    "response",
    "content",
    "answer",
    "message",
];

/// Upper bound on the last-resort raw dump.
const MAX_RAW_COMPLETION_CHARS: usize = 2000;

/// Coerce whatever shape a backend returned into a plain string.
///
/// A bare string is taken as-is; a sequence defers to its first element; a
/// mapping is searched for the known completion fields in order. Anything
/// else falls back to its JSON text, truncated. Null and an empty sequence
/// become the empty string so the caller's empty-answer handling applies.
pub fn normalize_completion(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => match items.first() {
            Some(first) => normalize_completion(first),
            None => String::new(),
        },
        Value::Object(map) => {
            for field in COMPLETION_FIELDS {
                if let Some(inner) = map.get(*field) {
                    return normalize_completion(inner);
                }
            }
            truncate_raw(value.to_string())
        }
        Value::Null => String::new(),
        other => truncate_raw(other.to_string()),
    }
}

fn truncate_raw(raw: String) -> String {
    if raw.chars().count() <= MAX_RAW_COMPLETION_CHARS {
        raw
    } else {
        raw.chars().take(MAX_RAW_COMPLETION_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Language;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // ==================== Test Helpers ====================

    /// Create a test config pointing both backends at the given URL
    fn create_test_config(base_url: &str) -> Config {
        Config {
            mode: GenerationMode::Local,
            remote_api_token: Some("test-token".to_string()),
            remote_api_url: base_url.to_string(),
            remote_model: "test-model".to_string(),
            local_api_url: base_url.to_string(),
            local_model: "test-model".to_string(),
            default_language: Language::ENGLISH,
            max_new_tokens: 64,
            request_timeout_secs: 30,
        }
    }

    /// Mount a model listing naming the given models
    async fn mount_tags(server: &MockServer, names: &[&str]) {
        let models: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": models })))
            .mount(server)
            .await;
    }

    // ==================== Decoding Params Tests ====================

    #[test]
    fn test_generation_params() {
        let params = DecodingParams::generation(128);
        assert_eq!(params.max_new_tokens, 128);
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.top_p, 0.9);
    }

    #[test]
    fn test_translation_params() {
        let params = DecodingParams::translation();
        assert_eq!(params.max_new_tokens, 512);
        assert_eq!(params.temperature, 0.3);
    }

    // ==================== Error Kind Tests ====================

    #[test]
    fn test_error_kinds_are_stable() {
        let http = BackendError::Http {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "bad gateway".to_string(),
        };
        assert_eq!(http.kind(), "Http");
        assert_eq!(BackendError::Timeout("t".to_string()).kind(), "Timeout");
        assert_eq!(BackendError::Network("n".to_string()).kind(), "Network");
        assert_eq!(
            BackendError::ModelLoad("m".to_string()).kind(),
            "ModelLoad"
        );

        let decode_err = serde_json::from_str::<Value>("not json").unwrap_err();
        assert_eq!(BackendError::from(decode_err).kind(), "Decode");
    }

    // ==================== Normalization Tests ====================

    #[test]
    fn test_normalize_bare_string() {
        assert_eq!(normalize_completion(&json!("Tokyo")), "Tokyo");
    }

    #[test]
    fn test_normalize_generated_text_object() {
        let value = json!({ "generated_text": "Hello there" });
        assert_eq!(normalize_completion(&value), "Hello there");
    }

    #[test]
    fn test_normalize_array_of_objects() {
        let value = json!([{ "generated_text": "First" }, { "generated_text": "Second" }]);
        assert_eq!(normalize_completion(&value), "First");
    }

    #[test]
    fn test_normalize_response_field() {
        let value = json!({ "model": "test", "response": "Local answer", "done": true });
        assert_eq!(normalize_completion(&value), "Local answer");
    }

    #[test]
    fn test_normalize_nested_message_content() {
        let value = json!({ "message": { "content": "Nested answer" } });
        assert_eq!(normalize_completion(&value), "Nested answer");
    }

    #[test]
    fn test_normalize_field_order_precedence() {
        // generated_text is checked before response
        let value = json!({ "response": "second", "generated_text": "first" });
        assert_eq!(normalize_completion(&value), "first");
    }

    #[test]
    fn test_normalize_unknown_object_dumps_json() {
        let value = json!({ "weird": "shape" });
        let normalized = normalize_completion(&value);
        assert!(normalized.contains("weird"));
        assert!(normalized.contains("shape"));
    }

    #[test]
    fn test_normalize_truncates_long_raw_dump() {
        let value = json!({ "weird": "x".repeat(5000) });
        assert_eq!(normalize_completion(&value).chars().count(), 2000);
    }

    #[test]
    fn test_normalize_null_and_empty_array() {
        assert_eq!(normalize_completion(&Value::Null), "");
        assert_eq!(normalize_completion(&json!([])), "");
    }

    #[test]
    fn test_normalize_scalar_fallback() {
        assert_eq!(normalize_completion(&json!(42)), "42");
        assert_eq!(normalize_completion(&json!(true)), "true");
    }

    // ==================== Local Backend Tests ====================

    #[tokio::test]
    async fn test_local_complete_success() {
        let mock_server = MockServer::start().await;
        mount_tags(&mock_server, &["test-model"]).await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({ "model": "test-model", "stream": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "test-model",
                "response": "Hi there.",
                "done": true
            })))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let backend = LocalBackend::new(&config).unwrap();

        let value = backend
            .complete("Say hi", &DecodingParams::generation(64))
            .await
            .unwrap();
        assert_eq!(normalize_completion(&value), "Hi there.");
    }

    #[tokio::test]
    async fn test_local_complete_http_error() {
        let mock_server = MockServer::start().await;
        mount_tags(&mock_server, &["test-model"]).await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let backend = LocalBackend::new(&config).unwrap();

        let err = backend
            .complete("Say hi", &DecodingParams::generation(64))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "Http");
        match err {
            BackendError::Http { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert!(body.contains("boom"));
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_local_ready_missing_model() {
        let mock_server = MockServer::start().await;
        mount_tags(&mock_server, &["other-model"]).await;

        let config = create_test_config(&mock_server.uri());
        let backend = LocalBackend::new(&config).unwrap();

        let err = backend.ensure_ready().await.unwrap_err();
        assert_eq!(err.kind(), "ModelLoad");
        assert!(err.to_string().contains("ollama pull test-model"));
    }

    #[tokio::test]
    async fn test_local_ready_matches_model_tag_prefix() {
        let mock_server = MockServer::start().await;
        mount_tags(&mock_server, &["test-model:latest"]).await;

        let config = create_test_config(&mock_server.uri());
        let backend = LocalBackend::new(&config).unwrap();

        assert!(backend.ensure_ready().await.is_ok());
    }

    #[tokio::test]
    async fn test_local_ready_probe_runs_once() {
        let mock_server = MockServer::start().await;

        let models = json!({ "models": [{ "name": "test-model" }] });
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(models))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let backend = LocalBackend::new(&config).unwrap();

        backend.ensure_ready().await.unwrap();
        backend.ensure_ready().await.unwrap();
        // MockServer verifies the expect(1) on drop
    }

    #[tokio::test]
    async fn test_local_ready_server_unreachable() {
        let config = create_test_config("http://127.0.0.1:1");
        let backend = LocalBackend::new(&config).unwrap();

        let err = backend.ensure_ready().await.unwrap_err();
        assert_eq!(err.kind(), "ModelLoad");
        assert!(err.to_string().contains("ollama pull test-model"));
    }

    // ==================== Remote Backend Tests ====================

    #[tokio::test]
    async fn test_remote_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/test-model"))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_partial_json(
                json!({ "parameters": { "return_full_text": false } }),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "generated_text": "Hello!" }])),
            )
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let backend = RemoteBackend::new(&config).unwrap();

        let value = backend
            .complete("Say hello", &DecodingParams::generation(64))
            .await
            .unwrap();
        assert_eq!(normalize_completion(&value), "Hello!");
    }

    #[tokio::test]
    async fn test_remote_http_error_carries_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/test-model"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model overloaded"))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&mock_server.uri());
        let backend = RemoteBackend::new(&config).unwrap();

        let err = backend
            .complete("Say hello", &DecodingParams::generation(64))
            .await
            .unwrap_err();
        match err {
            BackendError::Http { status, body } => {
                assert_eq!(status.as_u16(), 503);
                assert!(body.contains("model overloaded"));
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remote_network_error() {
        let config = create_test_config("http://127.0.0.1:1");
        let backend = RemoteBackend::new(&config).unwrap();

        let err = backend
            .complete("Say hello", &DecodingParams::generation(64))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "Network");
    }

    #[test]
    fn test_remote_requires_token() {
        let mut config = create_test_config("http://localhost:9999");
        config.remote_api_token = None;

        assert!(RemoteBackend::new(&config).is_err());
    }

    // ==================== Selection Tests ====================

    #[tokio::test]
    async fn test_select_backend_local() {
        let config = create_test_config("http://localhost:9999");
        let backend = select_backend(&config).unwrap();
        assert_eq!(backend.name(), "local");
        assert_eq!(backend.model(), "test-model");
    }

    #[tokio::test]
    async fn test_select_backend_remote() {
        let mut config = create_test_config("http://localhost:9999");
        config.mode = GenerationMode::Remote;

        let backend = select_backend(&config).unwrap();
        assert_eq!(backend.name(), "remote");
    }
}
