#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use super::{Completer, Embedder, Embedding, GenerationParams, ProviderError};
use crate::config::{ConfigError, Credentials, ProviderConfig};

const EXPONENTIAL_BACKOFF_BASE: u64 = 2;
const BACKOFF_UNIT_MS: u64 = 500;
const HEALTH_CHECK_TEXT: &str = "health check";

/// Blocking HTTP client for an OpenAI-compatible embeddings and chat completions API
#[derive(Debug, Clone)]
pub struct ProviderClient {
    base_url: Url,
    embedding_model: String,
    generation: GenerationParams,
    credentials: Credentials,
    agent: ureq::Agent,
    timeout: Duration,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ProviderClient {
    #[inline]
    pub fn new(config: &ProviderConfig, credentials: Credentials) -> Result<Self, ConfigError> {
        config.validate()?;
        let base_url = config.base_url()?;
        let timeout = config.timeout();

        Ok(Self {
            base_url,
            embedding_model: config.embedding_model.clone(),
            generation: config.generation_params(),
            credentials,
            agent: build_agent(timeout),
            timeout,
            retry_attempts: config.retry_attempts,
        })
    }

    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self.timeout = timeout;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    #[inline]
    pub fn generation_params(&self) -> &GenerationParams {
        &self.generation
    }

    /// Verify the service is reachable and accepts the credential
    #[inline]
    pub fn health_check(&self) -> Result<(), ProviderError> {
        debug!("Performing health check against {}", self.base_url);

        let embedding = self.generate_embedding(HEALTH_CHECK_TEXT)?;

        info!(
            "Health check passed for {} with model {} ({} dimensions)",
            self.base_url,
            self.embedding_model,
            embedding.len()
        );
        Ok(())
    }

    /// Generate an embedding for a single text input
    #[inline]
    pub fn generate_embedding(&self, text: &str) -> Result<Embedding, ProviderError> {
        debug!("Generating embedding for text (length: {})", text.len());

        let request = EmbeddingRequest {
            input: text,
            model: &self.embedding_model,
        };
        let url = self.endpoint("embeddings")?;
        let response_text = self.post_json(&url, &request)?;

        let response: EmbeddingResponse = serde_json::from_str(&response_text).map_err(|e| {
            ProviderError::MalformedResponse(format!("invalid embedding response: {e}"))
        })?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("embedding response has no data".to_string())
            })?;

        if embedding.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "embedding vector is empty".to_string(),
            ));
        }

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    /// Generate answer text for a prompt
    #[inline]
    pub fn generate_completion(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(
            "Requesting completion from {} (prompt length: {})",
            self.generation.model,
            prompt.len()
        );

        let request = ChatRequest {
            model: &self.generation.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
        };
        let url = self.endpoint("chat/completions")?;
        let response_text = self.post_json(&url, &request)?;

        let response: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            ProviderError::MalformedResponse(format!("invalid completion response: {e}"))
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("completion response has no content".to_string())
            })?;

        debug!("Received completion (length: {})", content.len());
        Ok(content.trim().to_string())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Network(format!("failed to build {path} URL: {e}")))
    }

    fn post_json<T: Serialize>(&self, url: &Url, body: &T) -> Result<String, ProviderError> {
        let request_json = serde_json::to_string(body).map_err(|e| {
            ProviderError::MalformedResponse(format!("failed to serialize request: {e}"))
        })?;
        let authorization = self.credentials.bearer();

        self.make_request_with_retry(|| {
            self.agent
                .post(url.as_str())
                .header("Authorization", &authorization)
                .header("Content-Type", "application/json")
                .send(request_json.as_str())
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
    }

    fn make_request_with_retry<F>(&self, mut request_fn: F) -> Result<String, ProviderError>
    where
        F: FnMut() -> Result<String, ureq::Error>,
    {
        let mut attempt = 1;

        loop {
            debug!("HTTP request attempt {}/{}", attempt, self.retry_attempts);

            let error = match request_fn() {
                Ok(response_text) => {
                    debug!("Request succeeded on attempt {}", attempt);
                    return Ok(response_text);
                }
                Err(error) => classify_error(&error, self.timeout),
            };

            if !error.is_transient() {
                warn!("Non-retryable provider error: {}", error);
                return Err(error);
            }

            if attempt >= self.retry_attempts {
                error!(
                    "Request to {} failed after {} attempt(s): {}",
                    self.base_url, attempt, error
                );
                return Err(error);
            }

            warn!(
                "Transient provider error: {}, attempt {}/{}",
                error, attempt, self.retry_attempts
            );

            let delay =
                Duration::from_millis(EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * BACKOFF_UNIT_MS);
            debug!("Waiting {:?} before retry", delay);
            std::thread::sleep(delay);
            attempt += 1;
        }
    }
}

impl Embedder for ProviderClient {
    #[inline]
    fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        self.generate_embedding(text)
    }

    #[inline]
    fn model(&self) -> &str {
        &self.embedding_model
    }
}

impl Completer for ProviderClient {
    #[inline]
    fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.generate_completion(prompt)
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

fn classify_error(error: &ureq::Error, timeout: Duration) -> ProviderError {
    match error {
        ureq::Error::StatusCode(status @ (401 | 403)) => {
            ProviderError::Authentication { status: *status }
        }
        ureq::Error::StatusCode(429) => ProviderError::RateLimited,
        ureq::Error::StatusCode(status) => ProviderError::Status(*status),
        ureq::Error::Timeout(_) => ProviderError::Timeout(format!("no response within {timeout:?}")),
        ureq::Error::Io(e) if e.kind() == io::ErrorKind::TimedOut => {
            ProviderError::Timeout(format!("no response within {timeout:?}"))
        }
        other => ProviderError::Network(other.to_string()),
    }
}
