//! Input validation
//!
//! Checks that run before any network call is made. A query that fails here never
//! reaches the embedding service.


use thiserror::Error;
use tracing::debug;

/// Default upper bound on query length, in characters
pub const DEFAULT_MAX_QUERY_CHARS: usize = 2000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Chunk size must be at least one word")]
    ZeroMaxWords,
    #[error("Question is empty")]
    EmptyQuery,
    #[error("Question is too long: {length} characters (limit is {limit})")]
    QueryTooLong { length: usize, limit: usize },
    #[error("Question contains control characters")]
    ControlCharacters,
}

/// Validate a raw query and return it with surrounding whitespace removed
#[inline]
pub fn validate_query(query: &str, max_chars: usize) -> Result<&str, InputError> {
    let trimmed = query.trim();

    if trimmed.is_empty() {
        return Err(InputError::EmptyQuery);
    }

    let length = trimmed.chars().count();
    if length > max_chars {
        debug!("Rejecting query of {} characters", length);
        return Err(InputError::QueryTooLong {
            length,
            limit: max_chars,
        });
    }

    // Tabs and newlines are fine; anything else in the control range is not
    if trimmed
        .chars()
        .any(|c| c.is_control() && !c.is_whitespace())
    {
        return Err(InputError::ControlCharacters);
    }

    Ok(trimmed)
}
