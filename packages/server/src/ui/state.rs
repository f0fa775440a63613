//! Server state shared by every handler.

use std::sync::Arc;

use crate::usecase::{Broadcaster, StreamConnectionUseCase, SubmitMessageUseCase};

/// Shared application state
pub struct AppState {
    /// SubmitMessageUseCase（投稿受付のユースケース）
    pub submit_message_usecase: Arc<SubmitMessageUseCase>,
    /// StreamConnectionUseCase（接続ごとのストリーミング応答のユースケース）
    pub stream_connection_usecase: Arc<StreamConnectionUseCase>,
    /// Broadcaster（デバッグ用に履歴と接続数を参照する）
    pub broadcaster: Arc<Broadcaster>,
}
