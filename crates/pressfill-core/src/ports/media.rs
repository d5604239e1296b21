//! MediaRepository port - 既存メディアライブラリの参照

use async_trait::async_trait;

use super::storage::StorageError;
use crate::domain::MediaId;

/// MediaRepository はアイキャッチ候補の画像を返す
///
/// 返す件数は `limit` 以下。候補が 0 件でもエラーではない。
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn image_candidates(&self, limit: usize) -> Result<Vec<MediaId>, StorageError>;
}
