//! Retrieval
//!
//! Embeds a query with the same model the index was built with, then asks the
//! [`IndexStore`] for the nearest chunks.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::index::{IndexError, IndexStore, Metric, ScoredChunk};
use crate::provider::{Embedder, ProviderError};
use crate::validation::DEFAULT_MAX_QUERY_CHARS;

/// Default number of chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Longest question accepted, in characters
    pub max_query_chars: usize,
    /// Metric used when building a new index; a loaded index keeps its own
    pub metric: Metric,
}

impl Default for RetrievalConfig {
    #[inline]
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_query_chars: DEFAULT_MAX_QUERY_CHARS,
            metric: Metric::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("failed to embed query: {0}")]
    Embedding(#[source] ProviderError),
    #[error("index query failed: {0}")]
    Index(#[source] IndexError),
}

/// Finds the chunks most relevant to a question
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<IndexStore>,
}

impl Retriever {
    #[inline]
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<IndexStore>) -> Self {
        Self { embedder, store }
    }

    /// Embed `query` and return up to `k` chunks, most similar first
    #[inline]
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, RetrievalError> {
        let vector = self
            .embedder
            .embed(query)
            .map_err(RetrievalError::Embedding)?;

        let results = self.store.query(&vector, k).map_err(RetrievalError::Index)?;

        debug!(
            "Retrieved {} chunk(s) for query (length: {}), best score {:?}",
            results.len(),
            query.len(),
            results.first().map(|r| r.score)
        );
        Ok(results)
    }

    #[inline]
    pub fn store(&self) -> &IndexStore {
        &self.store
    }
}
