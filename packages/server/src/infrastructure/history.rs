//! Bounded append log replayed to every newly opened connection.

use std::{
    collections::{VecDeque, vec_deque},
    sync::{PoisonError, RwLock},
};

use crate::domain::Update;

/// The last `limit` updates, oldest first.
///
/// Snapshots may run concurrently; appends are exclusive.
#[derive(Debug)]
pub struct History {
    limit: usize,
    updates: RwLock<VecDeque<Update>>,
}

impl History {
    /// Create an empty history keeping at most `limit` updates
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            updates: RwLock::new(VecDeque::with_capacity(limit)),
        }
    }

    /// Append an update, discarding the oldest entries beyond the limit
    pub fn append(&self, update: Update) {
        self.append_then(update, |_| ());
    }

    /// Append an update and run `f` on it before the write lock is released.
    ///
    /// No snapshot can observe the history between the append and the end of `f`.
    pub fn append_then<R>(&self, update: Update, f: impl FnOnce(&Update) -> R) -> R {
        let mut updates = self.updates.write().unwrap_or_else(PoisonError::into_inner);
        let result = f(&update);
        updates.push_back(update);
        while updates.len() > self.limit {
            updates.pop_front();
        }
        result
    }

    /// Point-in-time copy of the current contents, oldest first
    pub fn snapshot(&self) -> Vec<Update> {
        self.snapshot_then(|updates| updates.cloned().collect())
    }

    /// Run `f` over the current contents while holding the read lock.
    ///
    /// No append can happen until `f` returns.
    pub fn snapshot_then<R>(&self, f: impl FnOnce(vec_deque::Iter<'_, Update>) -> R) -> R {
        let updates = self.updates.read().unwrap_or_else(PoisonError::into_inner);
        f(updates.iter())
    }

}

#[cfg(test)]
impl History {
    pub(crate) fn len(&self) -> usize {
        self.updates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - History の上限付き追記 (スライディングウィンドウ)
    // - snapshot が挿入順を保った一貫したビューを返すこと
    //
    // 【なぜこのテストが必要か】
    // - 新規接続は snapshot を再送するため、上限と順序が表示内容を決める
    //
    // 【どのようなシナリオをテストするか】
    // 1. 上限以下の追記
    // 2. 上限を超える追記で古いものから捨てられる
    // 3. 並行追記でも上限を超えない
    // ========================================

    fn update(n: usize) -> Update {
        Update::new("2023-01-01 00:00:00", format!("message {n}"))
    }

    #[test]
    fn test_new_history_is_empty() {
        // テスト項目: 生成直後の History は空
        // given (前提条件):
        let history = History::new(20);

        // when (操作):
        let snapshot = history.snapshot();

        // then (期待する結果):
        assert!(history.is_empty());
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_append_within_limit_keeps_everything_in_order() {
        // テスト項目: 上限以下なら全ての更新が挿入順に保持される
        // given (前提条件):
        let history = History::new(20);

        // when (操作):
        for n in 0..3 {
            history.append(update(n));
        }

        // then (期待する結果):
        assert_eq!(history.snapshot(), vec![update(0), update(1), update(2)]);
    }

    #[test]
    fn test_append_beyond_limit_keeps_last_entries() {
        // テスト項目: 上限 + k 件追記すると最後の上限件だけが元の順序で残る
        // given (前提条件):
        let limit = 20;
        let extra = 7;
        let history = History::new(limit);

        // when (操作):
        for n in 0..limit + extra {
            history.append(update(n));
        }

        // then (期待する結果):
        let expected: Vec<Update> = (extra..limit + extra).map(update).collect();
        assert_eq!(history.len(), limit);
        assert_eq!(history.snapshot(), expected);
    }

    #[test]
    fn test_append_then_runs_under_the_write_lock() {
        // テスト項目: append_then のクロージャに追記対象の更新が渡され、戻り値が返る
        // given (前提条件):
        let history = History::new(2);

        // when (操作):
        let message = history.append_then(update(1), |u| u.message().to_string());

        // then (期待する結果):
        assert_eq!(message, "message 1");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_snapshot_then_sees_current_contents() {
        // テスト項目: snapshot_then は読み取りロック中の内容を走査できる
        // given (前提条件):
        let history = History::new(5);
        history.append(update(1));
        history.append(update(2));

        // when (操作):
        let messages: Vec<String> =
            history.snapshot_then(|updates| updates.map(|u| u.message().to_string()).collect());

        // then (期待する結果):
        assert_eq!(messages, vec!["message 1", "message 2"]);
    }

    #[test]
    fn test_concurrent_appends_never_exceed_limit() {
        // テスト項目: 複数スレッドから同時に追記しても上限を超えない
        // given (前提条件):
        let history = Arc::new(History::new(20));

        // when (操作):
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let history = history.clone();
                std::thread::spawn(move || {
                    for n in 0..50 {
                        history.append(update(t * 100 + n));
                        assert!(history.len() <= 20);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // then (期待する結果):
        assert_eq!(history.len(), 20);
    }
}
