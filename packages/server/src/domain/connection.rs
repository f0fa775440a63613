//! Connection identity and lifecycle states.

use std::fmt;

/// Unique identifier for a streaming connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of one long-lived response.
///
/// ```text
/// Opening -> Replaying -> Live -> Closed
///    |           |                  ^
///    +-----------+------------------+
/// ```
///
/// `Closed` is terminal and reachable from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Queue created, nothing written yet
    Opening,
    /// Preamble and history are being written
    Replaying,
    /// Draining the queue, pinging when idle
    Live,
    /// Left the registry; the response is finished
    Closed,
}

impl ConnectionState {
    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Opening, Replaying) | (Replaying, Live) | (Opening | Replaying | Live, Closed)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Opening => "OPENING",
            ConnectionState::Replaying => "REPLAYING",
            ConnectionState::Live => "LIVE",
            ConnectionState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}
