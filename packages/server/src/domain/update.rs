//! Update: a single accepted post.

use serde::Serialize;

/// A chat update, immutable once created.
///
/// `message` is stored already HTML-escaped and trimmed; rendering inserts it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update {
    timestamp: String,
    message: String,
}

impl Update {
    /// Create a new update from an escaped message and its rendered UTC timestamp
    pub fn new(timestamp: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            message: message.into(),
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
