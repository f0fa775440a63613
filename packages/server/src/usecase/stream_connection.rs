//! UseCase: one long-lived streaming response per client.
//!
//! The response body is a stream of chunks driven by the HTTP transport.
//! Each yielded chunk is written and flushed before the stream is polled
//! again, and a failed write makes the transport drop the stream. Dropping
//! is therefore the only cancellation signal, and cleanup lives in
//! [`Session`]'s `Drop` so it runs exactly once on every exit path.

use std::{convert::Infallible, pin::Pin, sync::Arc, time::Duration};

use async_stream::stream;
use axum::body::Bytes;
use futures_util::Stream;
use tokio::sync::mpsc;

use crate::{
    config::Limits,
    domain::{ConnectionId, ConnectionState, Fragment, fragment::PING},
    infrastructure::Queue,
};

use super::Broadcaster;

/// Body of one streaming response
pub type ConnectionStream = Pin<Box<dyn Stream<Item = Result<Bytes, Infallible>> + Send>>;

/// 接続ごとのストリーミング応答を生成するユースケース
pub struct StreamConnectionUseCase {
    broadcaster: Arc<Broadcaster>,
    /// Static page head written before history (opaque to this layer)
    preamble: Bytes,
    ping_rate: Duration,
    buffer_size: usize,
}

impl StreamConnectionUseCase {
    pub fn new(broadcaster: Arc<Broadcaster>, preamble: Bytes, limits: &Limits) -> Self {
        Self {
            broadcaster,
            preamble,
            ping_rate: limits.ping_rate,
            buffer_size: limits.buffer_size,
        }
    }

    /// Open a connection and return its response body.
    ///
    /// Nothing is registered until the body is first polled. The first chunk
    /// is the preamble followed by the replayed history; after that come live
    /// fragments in queue order, or a single space whenever nothing arrived
    /// within the ping interval.
    pub fn execute(&self) -> ConnectionStream {
        let connection_id = ConnectionId::new();
        let (queue, mut receiver) = mpsc::channel(self.buffer_size);
        let broadcaster = self.broadcaster.clone();
        let preamble = self.preamble.clone();
        let ping_rate = self.ping_rate;

        tracing::debug!("Connection '{}' is {}", connection_id, ConnectionState::Opening);

        Box::pin(stream! {
            let mut session = Session::new(connection_id, broadcaster);

            session.transition(ConnectionState::Replaying);
            let replay = session.join_and_replay(queue, &preamble);
            yield Ok::<_, Infallible>(replay);

            session.transition(ConnectionState::Live);
            session.broadcaster.broadcast_count();

            loop {
                match tokio::time::timeout(ping_rate, receiver.recv()).await {
                    Ok(Some(chunk)) => {
                        yield Ok(chunk);
                    }
                    Ok(None) => {
                        tracing::debug!("Queue of connection '{}' was closed", session.connection_id);
                        break;
                    }
                    Err(_elapsed) => {
                        yield Ok(Bytes::from_static(PING));
                    }
                }
            }
        })
    }
}

/// Registry membership of one connection, released on drop
struct Session {
    connection_id: ConnectionId,
    state: ConnectionState,
    broadcaster: Arc<Broadcaster>,
}

impl Session {
    fn new(connection_id: ConnectionId, broadcaster: Arc<Broadcaster>) -> Self {
        Self {
            connection_id,
            state: ConnectionState::Opening,
            broadcaster,
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(
            "Connection '{}': {} -> {}",
            self.connection_id,
            self.state,
            next
        );
        self.state = next;
    }

    /// Join the registry and render preamble plus history as one chunk.
    ///
    /// Joining happens while the history read lock is held, so an update
    /// broadcast concurrently is either part of this replay or delivered to
    /// `queue` afterwards.
    fn join_and_replay(&self, queue: Queue, preamble: &Bytes) -> Bytes {
        let history = self.broadcaster.history();
        let registry = self.broadcaster.registry();
        history.snapshot_then(|updates| {
            registry.join(self.connection_id.clone(), queue);
            let mut page = preamble.to_vec();
            for update in updates {
                page.extend_from_slice(Fragment::Replayed(update).to_string().as_bytes());
            }
            Bytes::from(page)
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.broadcaster.registry().leave(&self.connection_id);
        self.transition(ConnectionState::Closed);
        self.broadcaster.broadcast_count();
    }
}
