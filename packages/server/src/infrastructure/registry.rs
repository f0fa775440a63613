//! Registry of live connection queues.
//!
//! Each open connection owns a bounded queue of rendered chunks. The registry
//! only keeps the sending half, and only ever sends into it without waiting.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use axum::body::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::ConnectionId;

/// Sending half of a connection's delivery queue
pub type Queue = mpsc::Sender<Bytes>;

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Queues that accepted the payload
    pub delivered: usize,
    /// Queues that were full (or already closed) and skipped it
    pub dropped: usize,
}

/// The set of currently open connections.
///
/// Fan-outs take the read lock and may run concurrently; join and leave are exclusive.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    members: RwLock<Members>,
}

#[derive(Debug, Default)]
struct Members {
    queues: HashMap<ConnectionId, Queue>,
    /// Set by `close_all`; later joins are refused
    closed: bool,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection's queue; subsequent deliveries reach it.
    ///
    /// After [`close_all`](Self::close_all) the queue is dropped instead, which
    /// ends the connection as soon as it drains.
    pub fn join(&self, connection_id: ConnectionId, queue: Queue) {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        if members.closed {
            tracing::debug!("Registry is closed, connection '{}' not joined", connection_id);
            return;
        }
        members.queues.insert(connection_id.clone(), queue);
        tracing::debug!(
            "Connection '{}' joined the registry ({} open)",
            connection_id,
            members.queues.len()
        );
    }

    /// Remove a connection's queue. Returns `false` if it was already absent.
    pub fn leave(&self, connection_id: &ConnectionId) -> bool {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        let removed = members.queues.remove(connection_id).is_some();
        if removed {
            tracing::debug!(
                "Connection '{}' left the registry ({} open)",
                connection_id,
                members.queues.len()
            );
        }
        removed
    }

    /// Number of currently joined connections
    pub fn size(&self) -> usize {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .queues
            .len()
    }

    /// Offer `payload` to every joined queue without waiting.
    ///
    /// A full queue simply misses this payload; the slow consumer never stalls the caller.
    pub fn deliver(&self, payload: &Bytes) -> Delivery {
        self.deliver_with(|_| payload.clone())
    }

    /// Like [`deliver`](Self::deliver), rendering the payload from the member count.
    ///
    /// The count is read under the same lock as the fan-out, so it matches the
    /// set of queues the payload is offered to.
    pub fn deliver_with(&self, render: impl FnOnce(usize) -> Bytes) -> Delivery {
        let members = self.members.read().unwrap_or_else(PoisonError::into_inner);
        let payload = render(members.queues.len());
        let mut delivery = Delivery::default();
        for (connection_id, queue) in members.queues.iter() {
            match queue.try_send(payload.clone()) {
                Ok(()) => delivery.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::trace!("Queue of connection '{}' is full, dropping", connection_id);
                    delivery.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::trace!("Queue of connection '{}' is closed, dropping", connection_id);
                    delivery.dropped += 1;
                }
            }
        }
        delivery
    }

    /// Drop every queue and refuse further joins, ending all live connections.
    ///
    /// Returns how many queues were removed.
    pub fn close_all(&self) -> usize {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        members.closed = true;
        let closed = members.queues.len();
        members.queues.clear();
        tracing::info!("Registry closed, {} connection(s) released", closed);
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - join / leave / size の整合性
    // - deliver のノンブロッキング配信と満杯時のドロップ
    // - close_all による全接続の終了
    //
    // 【なぜこのテストが必要か】
    // - 接続数の表示と配信先は registry のメンバーシップで決まる
    // - 遅いクライアントがブロードキャストを止めてはならない
    // ========================================

    fn payload(text: &'static str) -> Bytes {
        Bytes::from_static(text.as_bytes())
    }

    #[test]
    fn test_join_and_leave_update_size() {
        // テスト項目: join で増え、leave で減る
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let alice = ConnectionId::new();
        let bob = ConnectionId::new();
        let (tx1, _rx1) = mpsc::channel(5);
        let (tx2, _rx2) = mpsc::channel(5);

        // when (操作):
        registry.join(alice.clone(), tx1);
        registry.join(bob.clone(), tx2);
        let after_join = registry.size();
        let removed = registry.leave(&alice);

        // then (期待する結果):
        assert_eq!(after_join, 2);
        assert!(removed);
        assert_eq!(registry.size(), 1);
    }

    #[test]
    fn test_leave_is_idempotent() {
        // テスト項目: 既に存在しない接続を leave してもエラーにならない
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let alice = ConnectionId::new();
        let (tx, _rx) = mpsc::channel(5);
        registry.join(alice.clone(), tx);
        registry.leave(&alice);

        // when (操作):
        let removed_again = registry.leave(&alice);

        // then (期待する結果):
        assert!(!removed_again);
        assert_eq!(registry.size(), 0);
    }

    #[tokio::test]
    async fn test_deliver_reaches_every_queue_once() {
        // テスト項目: 1 回の deliver で各キューにちょうど 1 件届く
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let mut receivers = Vec::new();
        for _ in 0..4 {
            let (tx, rx) = mpsc::channel(5);
            registry.join(ConnectionId::new(), tx);
            receivers.push(rx);
        }

        // when (操作):
        let delivery = registry.deliver(&payload("hello"));

        // then (期待する結果):
        assert_eq!(delivery, Delivery { delivered: 4, dropped: 0 });
        for rx in receivers.iter_mut() {
            assert_eq!(rx.try_recv().unwrap(), payload("hello"));
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_deliver_drops_for_full_queue_only() {
        // テスト項目: 満杯のキューだけがその配信を取りこぼし、他は受け取る
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (slow_tx, mut slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(5);
        registry.join(ConnectionId::new(), slow_tx);
        registry.join(ConnectionId::new(), fast_tx);
        registry.deliver(&payload("first"));

        // when (操作):
        let delivery = registry.deliver(&payload("second"));

        // then (期待する結果):
        assert_eq!(delivery, Delivery { delivered: 1, dropped: 1 });
        assert_eq!(slow_rx.try_recv().unwrap(), payload("first"));
        assert!(slow_rx.try_recv().is_err());
        assert_eq!(fast_rx.try_recv().unwrap(), payload("first"));
        assert_eq!(fast_rx.try_recv().unwrap(), payload("second"));
    }

    #[tokio::test]
    async fn test_deliver_to_closed_queue_is_dropped() {
        // テスト項目: 受信側が既に破棄されたキューへの配信はドロップとして数えられる
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::channel(5);
        registry.join(ConnectionId::new(), tx);
        drop(rx);

        // when (操作):
        let delivery = registry.deliver(&payload("hello"));

        // then (期待する結果):
        assert_eq!(delivery, Delivery { delivered: 0, dropped: 1 });
    }

    #[tokio::test]
    async fn test_deliver_with_renders_from_member_count() {
        // テスト項目: deliver_with には配信時点の接続数が渡される
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::channel(5);
        let (tx2, _rx2) = mpsc::channel(5);
        registry.join(ConnectionId::new(), tx1);
        registry.join(ConnectionId::new(), tx2);

        // when (操作):
        let delivery = registry.deliver_with(|count| Bytes::from(count.to_string()));

        // then (期待する結果):
        assert_eq!(delivery.delivered, 2);
        assert_eq!(rx1.try_recv().unwrap(), payload("2"));
    }

    #[test]
    fn test_deliver_with_no_connections() {
        // テスト項目: 接続がなくても deliver は何もせず成功する
        let registry = ConnectionRegistry::new();

        assert_eq!(registry.deliver(&payload("hello")), Delivery::default());
    }

    #[tokio::test]
    async fn test_close_all_ends_every_queue() {
        // テスト項目: close_all で全キューの送信側が破棄され、受信側が終了を検知する
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::channel(5);
        let (tx2, mut rx2) = mpsc::channel(5);
        registry.join(ConnectionId::new(), tx1);
        registry.join(ConnectionId::new(), tx2);

        // when (操作):
        let closed = registry.close_all();

        // then (期待する結果):
        assert_eq!(closed, 2);
        assert_eq!(registry.size(), 0);
        assert_eq!(rx1.recv().await, None);
        assert_eq!(rx2.recv().await, None);
    }

    #[tokio::test]
    async fn test_join_after_close_all_is_refused() {
        // テスト項目: close_all 後の join は登録されず、キューは即座に閉じられる
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        registry.close_all();
        let (tx, mut rx) = mpsc::channel(5);

        // when (操作):
        registry.join(ConnectionId::new(), tx);

        // then (期待する結果):
        assert_eq!(registry.size(), 0);
        assert_eq!(rx.recv().await, None);
    }
}
