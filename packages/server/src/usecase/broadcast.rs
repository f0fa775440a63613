//! Broadcaster: non-blocking fan-out of message and count fragments.

use std::sync::Arc;

use crate::{
    domain::{Fragment, Update},
    infrastructure::{ConnectionRegistry, Delivery, History},
};

/// Pushes rendered fragments to every registered connection queue.
///
/// Never waits on a queue: a connection whose queue is full misses that
/// fragment and the producer moves on.
pub struct Broadcaster {
    history: Arc<History>,
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(history: Arc<History>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { history, registry }
    }

    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Append `update` to history and offer it to every live connection as a new message.
    ///
    /// The fan-out happens inside the history write section, so a connection
    /// replaying history sees the update either in its snapshot or live, never
    /// both and never neither.
    pub fn broadcast_message(&self, update: Update) -> Delivery {
        let delivery = self.history.append_then(update, |update| {
            let payload = Fragment::NewMessage(update).to_bytes();
            self.registry.deliver(&payload)
        });
        tracing::debug!(
            "Broadcasted message to {} connection(s), {} dropped",
            delivery.delivered,
            delivery.dropped
        );
        delivery
    }

    /// Offer the current connection count to every live connection
    pub fn broadcast_count(&self) -> Delivery {
        let delivery = self
            .registry
            .deliver_with(|count| Fragment::Count(count).to_bytes());
        tracing::trace!(
            "Broadcasted connection count to {} connection(s), {} dropped",
            delivery.delivered,
            delivery.dropped
        );
        delivery
    }
}
