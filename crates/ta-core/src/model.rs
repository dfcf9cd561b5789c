//! Language model seam.

use std::future::Future;
use std::time::Duration;

/// Raw text returned by one model call. May be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedText(String);

impl GeneratedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// True when the response carries no usable content.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Transport or provider failure of a single model call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),
}

/// A text generation service.
///
/// One call, no retries. Calls are not idempotent: the same prompt may
/// yield different text each time.
pub trait LanguageModel {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<GeneratedText, ServiceError>> + Send;
}
