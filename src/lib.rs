use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::index::IndexError;
use crate::pipeline::AnswerError;
use crate::provider::ProviderError;
use crate::validation::InputError;

pub type Result<T> = std::result::Result<T, AssistantError>;

/// Which external call a provider failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Embedding,
    Completion,
}

impl fmt::Display for Stage {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedding => f.write_str("embedding"),
            Self::Completion => f.write_str("completion"),
        }
    }
}

/// Broad failure classes used to decide whether an error is fatal to the process
/// or only to a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Upstream,
    Input,
    IndexIntegrity,
    Other,
}

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Configuration error: index artifact unavailable: {0}")]
    IndexUnavailable(#[source] IndexError),

    #[error("Upstream {stage} service error: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: ProviderError,
    },

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Index integrity error: {0}")]
    IndexIntegrity(#[source] IndexError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl AssistantError {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::IndexUnavailable(_) => ErrorKind::Configuration,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Input(_) => ErrorKind::Input,
            Self::IndexIntegrity(_) => ErrorKind::IndexIntegrity,
            Self::Io(_) | Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Whether the process can keep serving other queries after this error.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Upstream | ErrorKind::Input)
    }
}

impl From<IndexError> for AssistantError {
    #[inline]
    fn from(error: IndexError) -> Self {
        match error {
            IndexError::Embedding(source) => Self::Upstream {
                stage: Stage::Embedding,
                source,
            },
            error if error.is_integrity_violation() => Self::IndexIntegrity(error),
            error => Self::IndexUnavailable(error),
        }
    }
}

impl From<AnswerError> for AssistantError {
    #[inline]
    fn from(error: AnswerError) -> Self {
        match error {
            AnswerError::Input(e) => Self::Input(e),
            AnswerError::Embedding(source) => Self::Upstream {
                stage: Stage::Embedding,
                source,
            },
            AnswerError::Retrieval(e) => e.into(),
            AnswerError::Completion(source) => Self::Upstream {
                stage: Stage::Completion,
                source,
            },
        }
    }
}

pub mod chunking;
pub mod commands;
pub mod config;
pub mod history;
pub mod index;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod retrieval;
pub mod validation;
