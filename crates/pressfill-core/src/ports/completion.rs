//! CompletionClient port - 言語モデルの completion API

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// 接続失敗・タイムアウトなど、応答を受け取れなかった
    #[error("{0}")]
    Network(String),

    /// 応答は受け取ったが、エラーステータスまたは使えるテキストがなかった
    #[error("{0}")]
    Upstream(String),
}

/// CompletionClient はプロンプトを送り、最初の候補のテキストを返す
///
/// # 設計原則
/// - リトライしない（失敗はそのまま呼び出し側へ）
/// - API キーはリクエストごとに渡す（クライアント自体はキーを持たない）
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, CompletionError>;
}
