//! Rolling conversation history

use std::collections::VecDeque;

use serde::Serialize;

/// Entries kept between turns (five user/assistant pairs)
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Largest history a configuration may ask for
pub const MAX_HISTORY_LIMIT: usize = 200;

/// Message author on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One conversation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub(crate) fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Most recent turns, oldest first, never longer than the limit
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    limit: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl ConversationHistory {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            limit,
        }
    }

    /// Record a completed exchange, dropping the oldest entries past the limit
    pub fn push_exchange(&mut self, prompt: &str, reply: &str) {
        self.turns.push_back(Turn::user(prompt));
        self.turns.push_back(Turn::assistant(reply));

        while self.turns.len() > self.limit {
            self.turns.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_limit_allocates_lazily() {
        let mut history = ConversationHistory::new(usize::MAX);
        history.push_exchange("q", "a");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn exchange_appends_user_then_assistant() {
        let mut history = ConversationHistory::default();
        history.push_exchange("hi there", "Hello!");

        let turns: Vec<&Turn> = history.iter().collect();
        assert_eq!(turns[0], &Turn::user("hi there"));
        assert_eq!(turns[1], &Turn::assistant("Hello!"));
    }

    #[test]
    fn six_exchanges_keep_ten_most_recent() {
        let mut history = ConversationHistory::default();
        for i in 1..=6 {
            history.push_exchange(&format!("q{i}"), &format!("a{i}"));
        }

        assert_eq!(history.len(), 10);
        let contents: Vec<&str> = history.iter().map(Turn::content).collect();
        assert_eq!(
            contents,
            vec!["q2", "a2", "q3", "a3", "q4", "a4", "q5", "a5", "q6", "a6"]
        );
    }

    #[test]
    fn never_exceeds_limit() {
        let mut history = ConversationHistory::default();
        for i in 0..50 {
            history.push_exchange(&i.to_string(), "ok");
            assert!(history.len() <= DEFAULT_HISTORY_LIMIT);
        }
    }

    #[test]
    fn odd_limit_trims_oldest_entry() {
        let mut history = ConversationHistory::new(3);
        history.push_exchange("q1", "a1");
        history.push_exchange("q2", "a2");

        let contents: Vec<&str> = history.iter().map(Turn::content).collect();
        assert_eq!(contents, vec!["a1", "q2", "a2"]);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(Turn::assistant("x")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "x"}));
    }
}
