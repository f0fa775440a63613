//! UseCase: 投稿されたメッセージの受付
//!
//! ## 処理の流れ
//!
//! 1. 生の入力長 (バイト数) が上限を超えていれば拒否
//! 2. HTML エスケープしてから前後の空白を除去
//! 3. 空でなければ現在時刻 (UTC) を付けて `Broadcaster` へ渡す
//!
//! 拒否は投稿者には見えない: HTTP 層はどの結果でも 302 でリダイレクトする。

use std::sync::Arc;

use kairan_shared::time::{Clock, format_utc_timestamp};

use crate::domain::{Update, escape_html};

use super::{Broadcaster, error::SubmitError};

/// メッセージ投稿のユースケース
pub struct SubmitMessageUseCase {
    /// Broadcaster（履歴への追記と全接続への配信）
    broadcaster: Arc<Broadcaster>,
    /// Clock（タイムスタンプの取得）
    clock: Arc<dyn Clock>,
    /// 受け付ける最大バイト数（エスケープ前）
    max_msg_len: usize,
}

impl SubmitMessageUseCase {
    pub fn new(broadcaster: Arc<Broadcaster>, clock: Arc<dyn Clock>, max_msg_len: usize) -> Self {
        Self {
            broadcaster,
            clock,
            max_msg_len,
        }
    }

    /// 投稿を検証し、受理されたら配信する
    ///
    /// # Arguments
    ///
    /// * `raw` - フォームの `msg` フィールドの値（未加工）
    ///
    /// # Returns
    ///
    /// * `Ok(Update)` - 受理され、履歴に追記・配信された更新
    /// * `Err(SubmitError)` - 拒否（何も配信されない）
    pub fn execute(&self, raw: &str) -> Result<Update, SubmitError> {
        if raw.len() > self.max_msg_len {
            return Err(SubmitError::TooLong {
                len: raw.len(),
                max: self.max_msg_len,
            });
        }

        let escaped = escape_html(raw);
        let message = escaped.trim();
        if message.is_empty() {
            return Err(SubmitError::Empty);
        }

        let update = Update::new(format_utc_timestamp(self.clock.now_utc()), message);
        self.broadcaster.broadcast_message(update.clone());

        Ok(update)
    }
}
