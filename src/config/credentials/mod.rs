
use std::env;
use std::fmt;

use tracing::debug;

use super::ConfigError;

/// Bearer credential for the embedding and completion provider
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    #[inline]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Read the credential from the process environment
    #[inline]
    pub fn from_env(var: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(var, |name| env::var(name).ok())
    }

    /// Read the credential through `lookup`, treating unset and blank values the same
    #[inline]
    pub fn from_lookup<F>(var: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(var) {
            Some(value) if !value.trim().is_empty() => {
                debug!("Loaded provider credential from {}", var);
                Ok(Self::new(value.trim()))
            }
            _ => Err(ConfigError::MissingCredential(var.to_string())),
        }
    }

    #[inline]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl fmt::Debug for Credentials {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
