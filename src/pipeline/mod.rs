//! Question answering pipeline
//!
//! One call to [`Assistant::answer`] runs the full round trip for a question:
//!
//! 1. validate the raw query
//! 2. embed it and retrieve the nearest chunks
//! 3. build a grounded prompt from those chunks
//! 4. ask the completion service for an answer
//!
//! Every step is synchronous. The only state shared between concurrent calls is the
//! read-only index, so an `Arc<Assistant>` can serve many questions at once.


use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError, Credentials};
use crate::index::{IndexError, IndexStore};
use crate::prompt::{PromptBuilder, PromptConfig};
use crate::provider::{Completer, Embedder, ProviderClient, ProviderError};
use crate::retrieval::{RetrievalConfig, RetrievalError, Retriever};
use crate::validation::{InputError, validate_query};
use crate::{AssistantError, Stage};

/// A generated answer and the passages it was grounded on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub answer: String,
    /// Retrieved chunk texts, most relevant first
    pub sources: Vec<String>,
}

/// Why a single question could not be answered
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("invalid question: {0}")]
    Input(#[from] InputError),
    #[error("embedding failed: {0}")]
    Embedding(#[source] ProviderError),
    #[error("retrieval failed: {0}")]
    Retrieval(#[source] IndexError),
    #[error("completion failed: {0}")]
    Completion(#[source] ProviderError),
}

impl AnswerError {
    /// Provider call the failure came from, if any
    #[inline]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Embedding(_) => Some(Stage::Embedding),
            Self::Completion(_) => Some(Stage::Completion),
            Self::Input(_) | Self::Retrieval(_) => None,
        }
    }

    /// Short message suitable for showing to the person who asked
    #[inline]
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(e) => format!("Please rephrase your question: {e}"),
            Self::Embedding(_) => {
                "Sorry, I could not understand the question right now. Please try again."
                    .to_string()
            }
            Self::Retrieval(_) => {
                "Sorry, I could not search the knowledge base for that question.".to_string()
            }
            Self::Completion(_) => {
                "Sorry, I could not generate an answer right now. Please try again.".to_string()
            }
        }
    }
}

impl From<RetrievalError> for AnswerError {
    #[inline]
    fn from(error: RetrievalError) -> Self {
        match error {
            RetrievalError::Embedding(e) => Self::Embedding(e),
            RetrievalError::Index(e) => Self::Retrieval(e),
        }
    }
}

/// Answers questions about the profile using retrieval plus generation
pub struct Assistant {
    retriever: Retriever,
    completer: Arc<dyn Completer>,
    prompt: PromptBuilder,
    top_k: usize,
    max_query_chars: usize,
}

impl Assistant {
    #[inline]
    pub fn new(
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
        store: Arc<IndexStore>,
        retrieval: &RetrievalConfig,
        prompt: &PromptConfig,
    ) -> Self {
        Self {
            retriever: Retriever::new(embedder, store),
            completer,
            prompt: PromptBuilder::new(prompt),
            top_k: retrieval.top_k,
            max_query_chars: retrieval.max_query_chars,
        }
    }

    /// Build an assistant from configuration, reading the credential from the environment.
    ///
    /// Fails before serving anything if the credential is missing, the index cannot be
    /// loaded or is inconsistent, or the index was built with a different embedding model.
    #[inline]
    pub fn from_config(config: &Config) -> Result<Self, AssistantError> {
        let credentials = Credentials::from_env(&config.provider.api_key_env)?;
        Self::with_credentials(config, credentials)
    }

    #[inline]
    pub fn with_credentials(
        config: &Config,
        credentials: Credentials,
    ) -> Result<Self, AssistantError> {
        config.validate()?;

        let index_path = config.index_path();
        let store = IndexStore::load(&index_path)?;

        if store.model() != config.provider.embedding_model {
            return Err(ConfigError::ModelMismatch {
                index: store.model().to_string(),
                configured: config.provider.embedding_model.clone(),
            }
            .into());
        }

        if store.metric() != config.retrieval.metric {
            warn!(
                "Index at {} uses the {} metric; configured metric {} only applies to new builds",
                index_path.display(),
                store.metric(),
                config.retrieval.metric
            );
        }

        let client = Arc::new(ProviderClient::new(&config.provider, credentials)?);

        info!(
            "Assistant ready with {} indexed chunks from {}",
            store.len(),
            index_path.display()
        );

        Ok(Self::new(
            Arc::<ProviderClient>::clone(&client),
            client,
            Arc::new(store),
            &config.retrieval,
            &config.prompt,
        ))
    }

    /// Answer one question.
    ///
    /// No network call is made for a query that fails validation.
    #[inline]
    pub fn answer(&self, query: &str) -> Result<Answer, AnswerError> {
        let query = validate_query(query, self.max_query_chars)?;

        let retrieved = self.retriever.retrieve(query, self.top_k).map_err(|e| {
            warn!("Retrieval failed: {}", e);
            AnswerError::from(e)
        })?;

        let sources: Vec<String> = retrieved.into_iter().map(|r| r.text).collect();
        let prompt = self.prompt.build(&sources, query);
        debug!(
            "Built prompt with {} source(s) (length: {})",
            sources.len(),
            prompt.len()
        );

        let answer = self.completer.complete(&prompt).map_err(|e| {
            warn!("Completion failed: {}", e);
            AnswerError::Completion(e)
        })?;

        info!(
            "Answered query (length: {}) with {} source(s)",
            query.len(),
            sources.len()
        );
        Ok(Answer { answer, sources })
    }

    #[inline]
    pub fn index(&self) -> &IndexStore {
        self.retriever.store()
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }
}
