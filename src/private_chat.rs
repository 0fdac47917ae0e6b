//! Private conversation history
//!
//! Keeps an append-only log per pair of participants. Logs are created on
//! the first private message between two names and live for the whole
//! process.

use std::collections::HashMap;

/// Unordered pair of participant names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatKey(String, String);

impl ChatKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

/// One exchanged private message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateEntry {
    pub from: String,
    pub body: String,
    pub timestamp: String,
}

/// All private conversations
#[derive(Debug, Default)]
pub struct PrivateChats {
    logs: HashMap<ChatKey, Vec<PrivateEntry>>,
}

impl PrivateChats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message from `from` to `to`
    pub fn record(&mut self, from: &str, to: &str, body: &str, timestamp: &str) {
        self.logs
            .entry(ChatKey::new(from, to))
            .or_default()
            .push(PrivateEntry {
                from: from.to_string(),
                body: body.to_string(),
                timestamp: timestamp.to_string(),
            });
    }

    /// Log between two names, in either order
    pub fn history(&self, a: &str, b: &str) -> &[PrivateEntry] {
        self.logs
            .get(&ChatKey::new(a, b))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of conversations started so far
    pub fn conversation_count(&self) -> usize {
        self.logs.len()
    }
}
