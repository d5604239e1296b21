//! StorageRepository port - 投稿の保存先（WordPress または InMemory）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{MediaId, NewPost, PostRef};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// StorageRepository は投稿の作成・マーカー付与・検索・削除を提供
///
/// # 設計原則
/// - 削除は常に完全削除（ゴミ箱を経由しない）
/// - マーカーは bool のカスタム属性（WordPress では post meta）
#[async_trait]
pub trait StorageRepository: Send + Sync {
    async fn create_post(&self, post: &NewPost) -> Result<PostRef, StorageError>;

    async fn set_featured_image(&self, post: &PostRef, media: MediaId) -> Result<(), StorageError>;

    async fn set_marker(&self, post: &PostRef, key: &str, value: bool) -> Result<(), StorageError>;

    /// 全 post type から `key == true` の投稿を探す
    async fn find_marked(&self, key: &str) -> Result<Vec<PostRef>, StorageError>;

    async fn delete_permanently(&self, post: &PostRef) -> Result<(), StorageError>;
}
