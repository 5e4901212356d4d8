// Provider module
// Embedding and completion capabilities, and the HTTP client that backs them

pub mod client;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::ProviderClient;

/// A vector embedding
pub type Embedding = Vec<f32>;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4.1-nano";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Failures talking to the embedding or completion service
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("authentication rejected (HTTP {status})")]
    Authentication { status: u16 },
    #[error("rate limited by provider (HTTP 429)")]
    RateLimited,
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("provider returned HTTP {0}")]
    Status(u16),
}

impl ProviderError {
    /// Whether repeating the same request could plausibly succeed
    #[inline]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimited => true,
            Self::Status(status) => *status >= 500,
            Self::Authentication { .. } | Self::MalformedResponse(_) => false,
        }
    }
}

/// Turns text into an embedding vector
pub trait Embedder: Send + Sync {
    /// Embed a single text. Empty input is passed through to the provider.
    fn embed(&self, text: &str) -> Result<Embedding, ProviderError>;

    /// Identifier of the embedding model, recorded alongside built indexes
    fn model(&self) -> &str;
}

/// Generates answer text from a prompt
pub trait Completer: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

impl<T: Embedder + ?Sized> Embedder for Arc<T> {
    #[inline]
    fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        (**self).embed(text)
    }

    #[inline]
    fn model(&self) -> &str {
        (**self).model()
    }
}

impl<T: Completer + ?Sized> Completer for Arc<T> {
    #[inline]
    fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        (**self).complete(prompt)
    }
}

/// Parameters sent with every completion request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    #[inline]
    fn default() -> Self {
        Self {
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}
