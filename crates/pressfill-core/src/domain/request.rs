//! GenerationRequest - 1 回の `create` 実行に対する入力
//!
//! 構築後は不変。検証（validate）はネットワークに触れる前に行います。

use md5::{Digest, Md5};

use super::errors::GenerateError;

/// 1 回の生成実行の入力
///
/// # 不変条件
/// - フィールドは構築後に変更できない（getter のみ公開）
/// - `validate()` が Ok を返すまでは completion API を呼ばない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    topic: String,
    count: u32,
    target_type: String,
    api_key: String,
}

impl GenerationRequest {
    pub fn new(
        topic: impl Into<String>,
        count: u32,
        target_type: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            count,
            target_type: target_type.into(),
            api_key: api_key.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// キャッシュのキー（topic 文字列の MD5）
    pub fn cache_key(&self) -> String {
        topic_hash(&self.topic)
    }

    /// 事前検証（Fail-fast）
    ///
    /// topic / api_key / target_type のいずれかが空（空白のみを含む）なら
    /// `GenerateError::Configuration` を返す。
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.topic.trim().is_empty() {
            return Err(GenerateError::Configuration("topic is required".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(GenerateError::Configuration("api key is required".to_string()));
        }
        if self.target_type.trim().is_empty() {
            return Err(GenerateError::Configuration("post type is required".to_string()));
        }
        Ok(())
    }
}

/// topic 文字列を lowercase hex の MD5 に変換
///
/// キャッシュファイルのキー形式。trim などの正規化はしない（完全一致の topic が同じキーになる）。
pub fn topic_hash(topic: &str) -> String {
    hex::encode(Md5::digest(topic.as_bytes()))
}
