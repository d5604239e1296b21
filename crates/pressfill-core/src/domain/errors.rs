//! Errors - エラー型と分類
//!
//! # 分類
//! - Configuration: 入力不足（致命的、ネットワーク前に検出）
//! - Network: 通信レベルの失敗（致命的、残りのアイテムを中断）
//! - Upstream: completion API がエラーまたは空の応答を返した（致命的）
//! - Parse: モデル出力が壊れている（回復可能、そのアイテムだけスキップ）
//! - Storage / Cache: 投稿の保存・キャッシュファイルの読み書きに失敗（致命的）

use thiserror::Error;

use super::content::ParseError;
use crate::ports::{CacheError, CompletionError, StorageError};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

impl GenerateError {
    /// ループを続行してよいエラーかどうか
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GenerateError::Parse(_))
    }
}

impl From<CompletionError> for GenerateError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Network(msg) => GenerateError::Network(msg),
            CompletionError::Upstream(msg) => GenerateError::Upstream(msg),
        }
    }
}
