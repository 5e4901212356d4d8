#[cfg(test)]
mod tests;

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Default name of the person the knowledge base describes
pub const DEFAULT_SUBJECT: &str = "Nahiyan";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PromptConfig {
    /// Whose profile the assistant answers questions about
    pub subject: String,
}

impl Default for PromptConfig {
    #[inline]
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

/// Builds the grounded prompt sent to the completion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    subject: String,
}

impl PromptBuilder {
    #[inline]
    pub fn new(config: &PromptConfig) -> Self {
        Self {
            subject: config.subject.clone(),
        }
    }

    /// Assemble instructions, labeled context and the question into one prompt.
    ///
    /// The output depends only on the arguments. An empty `context` still yields a
    /// context section telling the model that nothing relevant was found.
    #[inline]
    pub fn build(&self, context: &[String], query: &str) -> String {
        let mut prompt = format!(
            "You are a helpful assistant that answers questions about {subject} using \
             information from {subject}'s profile.\n\
             Answer only from the provided context. If the context is insufficient to \
             answer the question, say that you do not have enough information.\n\n",
            subject = self.subject
        );

        prompt.push_str("Context:\n");
        if context.is_empty() {
            prompt.push_str(
                "No relevant context was found. Tell the user you do not have sufficient \
                 information to answer.\n",
            );
        } else {
            for (i, chunk) in context.iter().enumerate() {
                // Writing to a String cannot fail
                let _ = writeln!(prompt, "[Source {}]\n{}\n", i + 1, chunk);
            }
        }

        let _ = write!(prompt, "\nQuestion: {query}\n\nAnswer:");
        prompt
    }
}

impl Default for PromptBuilder {
    #[inline]
    fn default() -> Self {
        Self::new(&PromptConfig::default())
    }
}

/// [`PromptBuilder::build`] with the default subject
#[inline]
pub fn build_prompt(context: &[String], query: &str) -> String {
    PromptBuilder::default().build(context, query)
}
