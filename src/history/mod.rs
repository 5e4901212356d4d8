// Conversation history
// Append-only record of answered questions for an interactive session


use chrono::{DateTime, Local, TimeDelta};

use crate::pipeline::Answer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    pub query: String,
    pub answer: String,
    pub sources: Vec<String>,
    pub timestamp: DateTime<Local>,
}

/// Successful question and answer exchanges, in the order they happened
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    records: Vec<ConversationRecord>,
}

impl ConversationLog {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed exchange. Failed questions are never recorded.
    #[inline]
    pub fn record(&mut self, query: &str, answer: &Answer) -> &ConversationRecord {
        self.push(ConversationRecord {
            query: query.to_string(),
            answer: answer.answer.clone(),
            sources: answer.sources.clone(),
            timestamp: Local::now(),
        })
    }

    #[inline]
    pub fn push(&mut self, record: ConversationRecord) -> &ConversationRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Records from newest to oldest
    #[inline]
    pub fn newest_first(&self) -> impl Iterator<Item = &ConversationRecord> {
        self.records.iter().rev()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Counters shown in the chat session footer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub total_queries: usize,
    pub started_at: DateTime<Local>,
}

impl SessionStats {
    #[inline]
    pub fn start() -> Self {
        Self::started_at(Local::now())
    }

    #[inline]
    pub fn started_at(started_at: DateTime<Local>) -> Self {
        Self {
            total_queries: 0,
            started_at,
        }
    }

    #[inline]
    pub fn record_query(&mut self) {
        self.total_queries += 1;
    }

    #[inline]
    pub fn elapsed(&self, now: DateTime<Local>) -> TimeDelta {
        now.signed_duration_since(self.started_at)
            .max(TimeDelta::zero())
    }

    /// Footer text such as `3 queries • 12m active`
    #[inline]
    pub fn summary(&self, now: DateTime<Local>) -> String {
        let noun = if self.total_queries == 1 {
            "query"
        } else {
            "queries"
        };
        format!(
            "{} {} • {}m active",
            self.total_queries,
            noun,
            self.elapsed(now).num_minutes()
        )
    }
}
