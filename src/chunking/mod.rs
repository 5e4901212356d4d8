#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::validation::InputError;

/// Default maximum number of words per chunk
pub const DEFAULT_MAX_WORDS: usize = 100;

/// A passage of corpus text, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The words of this chunk joined by single spaces
    pub text: String,
    /// Ordinal position of this chunk within the corpus
    pub position: usize,
    /// Number of words in this chunk
    pub word_count: usize,
}

/// Configuration for corpus chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum number of whitespace-delimited words per chunk
    pub max_words: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
        }
    }
}

/// Split corpus text into consecutive, non-overlapping chunks of at most `max_words` words.
///
/// Words are runs of non-whitespace characters, so a chunk boundary never falls inside a
/// word. Whitespace between words is normalized to a single space.
#[inline]
pub fn chunk_text(text: &str, max_words: usize) -> Result<Vec<Chunk>, InputError> {
    if max_words == 0 {
        return Err(InputError::ZeroMaxWords);
    }

    let words: Vec<&str> = text.split_whitespace().collect();

    let chunks: Vec<Chunk> = words
        .chunks(max_words)
        .enumerate()
        .map(|(position, words)| Chunk {
            text: words.join(" "),
            position,
            word_count: words.len(),
        })
        .collect();

    debug!(
        "Chunked {} words into {} chunks (max {} words each)",
        words.len(),
        chunks.len(),
        max_words
    );

    Ok(chunks)
}
