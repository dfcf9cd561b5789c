//! Gemini text generation client.
//!
//! One `generate` is one HTTP request. Retries belong to the caller
//! (see [`crate::retry`]).

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ta_core::{GeneratedText, LanguageModel, ServiceError};

use crate::error::ConfigurationError;

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Optional model override.
pub const MODEL_ENV: &str = "GEMINI_MODEL";
/// Optional endpoint override (proxies, tests).
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Longest error body kept from a failed request.
const ERROR_BODY_CHARS_MAX: usize = 2000;

/// Client configuration. Built once per run and not mutated afterwards.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Sampling temperature; provider default when `None`
    pub temperature: Option<f32>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            temperature: None,
        }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup` (an environment stand-in).
    ///
    /// Fails with [`ConfigurationError::MissingCredential`] when the key is
    /// absent or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = non_blank(API_KEY_ENV).ok_or(ConfigurationError::MissingCredential(API_KEY_ENV))?;
        let mut config = Self::new(api_key);

        if let Some(model) = non_blank(MODEL_ENV) {
            config.model = model;
        }
        if let Some(base_url) = non_blank(BASE_URL_ENV) {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ConfigurationError::Invalid {
                    name: BASE_URL_ENV,
                    reason: format!("expected an http(s) URL, got {:?}", base_url),
                });
            }
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `POST` target for a single generation.
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str, temperature: Option<f32>) -> Self {
        Self {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: temperature.map(|temperature| GenerationConfig { temperature }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, thoughts skipped.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// [`LanguageModel`] backed by the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigurationError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;
        Ok(Self { config, http })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn transport_error(&self, error: reqwest::Error) -> ServiceError {
        if error.is_timeout() {
            ServiceError::Timeout(self.config.timeout)
        } else {
            ServiceError::Transport(error.to_string())
        }
    }
}

impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedText, ServiceError> {
        let body = GenerateRequest::new(prompt, self.config.temperature);
        tracing::debug!(
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "Calling model"
        );

        let response = self
            .http
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_CHARS_MAX).collect(),
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| ServiceError::Malformed(e.to_string()))?;
        Ok(GeneratedText::new(parsed.into_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = ClientConfig::new("test-key")
            .with_model("test-model")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(5));
        GeminiClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_joins_text_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Explain a^2+b^2=c^2" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [
                            { "text": "planning", "thought": true },
                            { "text": "Squares on " },
                            { "text": "the legs." }
                        ]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .generate("Explain a^2+b^2=c^2")
            .await
            .unwrap();
        assert_eq!(text.as_str(), "Squares on the legs.");
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let text = client_for(&server).generate("x").await.unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("x").await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Status {
                status: 429,
                body: "quota exceeded".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("x").await.unwrap_err();
        assert!(matches!(err, ServiceError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "candidates": [] }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::new("k")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(200));
        let err = GeminiClient::new(config).unwrap().generate("x").await.unwrap_err();
        assert_eq!(err, ServiceError::Timeout(Duration::from_millis(200)));
    }

    #[test]
    fn test_missing_credential() {
        let err = ClientConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingCredential(API_KEY_ENV)));

        let err = ClientConfig::from_lookup(|name| {
            (name == API_KEY_ENV).then(|| "   ".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingCredential(_)));
    }

    #[test]
    fn test_lookup_overrides() {
        let config = ClientConfig::from_lookup(|name| match name {
            API_KEY_ENV => Some("secret".to_string()),
            MODEL_ENV => Some("gemini-2.5-pro".to_string()),
            BASE_URL_ENV => Some("http://localhost:9000/v1beta/".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(
            config.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ClientConfig::from_lookup(|name| match name {
            API_KEY_ENV => Some("secret".to_string()),
            BASE_URL_ENV => Some("localhost".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::Invalid { name: BASE_URL_ENV, .. }));
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(GenerateRequest::new("hi", Some(0.4))).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);

        let body = serde_json::to_value(GenerateRequest::new("hi", None)).unwrap();
        assert!(body.get("generationConfig").is_none());
    }
}
