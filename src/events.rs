//! Event Module
//!
//! バッチ処理中の進捗・エラー・完了を呼び出し側へ通知するための型。

use crate::types::Question;

/// バッチ処理の通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// 進捗メッセージ（ファイルの読み込み・処理状況）
    Progress { message: String },

    /// エラーメッセージ。行数上限の場合を除き、バッチは継続する
    Error { message: String },

    /// バッチ終了時に必ず1回だけ送られる
    Done { xml: String, questions: Vec<Question> },
}

impl ProcessEvent {
    pub(crate) fn progress(message: impl Into<String>) -> Self {
        ProcessEvent::Progress {
            message: message.into(),
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        ProcessEvent::Error {
            message: message.into(),
        }
    }

    /// Progress/Errorのメッセージ（Doneでは`None`）
    pub fn message(&self) -> Option<&str> {
        match self {
            ProcessEvent::Progress { message } | ProcessEvent::Error { message } => Some(message),
            ProcessEvent::Done { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ProcessEvent::Error { .. })
    }
}

/// 通知の受け取り先
///
/// `Vec<ProcessEvent>`（記録用）と任意の`FnMut(ProcessEvent)`クロージャに実装されています。
pub trait EventSink {
    fn emit(&mut self, event: ProcessEvent);
}

impl EventSink for Vec<ProcessEvent> {
    fn emit(&mut self, event: ProcessEvent) {
        self.push(event);
    }
}

impl<F: FnMut(ProcessEvent)> EventSink for F {
    fn emit(&mut self, event: ProcessEvent) {
        self(event)
    }
}

/// 通知を破棄するシンク
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: ProcessEvent) {}
}
