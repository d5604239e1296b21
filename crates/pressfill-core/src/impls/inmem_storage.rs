//! InMemoryStorage - 開発用の投稿ストア + メディアライブラリ
//!
//! # 実装詳細
//! - BTreeMap<PostId, StoredPost> で投稿を管理（ID 順に列挙できる）
//! - tokio::sync::Mutex で排他制御
//! - 失敗注入（fail_markers / fail_image_listing / fail_featured_images）で各書き込み・参照の失敗を再現できる

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MediaId, NewPost, PostId, PostRef};
use crate::ports::{MediaRepository, StorageError, StorageRepository};

/// 保存された投稿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPost {
    pub post: NewPost,
    pub featured_media: Option<MediaId>,
    pub markers: HashMap<String, bool>,
}

struct InMemoryState {
    posts: BTreeMap<PostId, StoredPost>,
    images: Vec<MediaId>,
    next_id: u64,
    fail_markers: bool,
    fail_image_listing: bool,
    fail_featured_images: bool,
}

pub struct InMemoryStorage {
    state: Mutex<InMemoryState>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_images(Vec::new())
    }

    /// メディアライブラリに画像を追加した状態で作成
    pub fn with_images(images: impl IntoIterator<Item = MediaId>) -> Self {
        Self {
            state: Mutex::new(InMemoryState {
                posts: BTreeMap::new(),
                images: images.into_iter().collect(),
                next_id: 1,
                fail_markers: false,
                fail_image_listing: false,
                fail_featured_images: false,
            }),
        }
    }

    /// 以降の set_marker を失敗させる
    pub async fn fail_markers(&self, fail: bool) {
        self.state.lock().await.fail_markers = fail;
    }

    /// 以降の image_candidates を失敗させる
    pub async fn fail_image_listing(&self, fail: bool) {
        self.state.lock().await.fail_image_listing = fail;
    }

    /// 以降の set_featured_image を失敗させる
    pub async fn fail_featured_images(&self, fail: bool) {
        self.state.lock().await.fail_featured_images = fail;
    }

    /// マーカーなしの投稿を直接追加（利用者が手で書いた記事の代わり）
    pub async fn insert_unmarked(&self, post: NewPost) -> PostRef {
        let mut state = self.state.lock().await;
        Self::insert(&mut state, post)
    }

    pub async fn get(&self, id: PostId) -> Option<StoredPost> {
        self.state.lock().await.posts.get(&id).cloned()
    }

    pub async fn post_count(&self) -> usize {
        self.state.lock().await.posts.len()
    }

    fn insert(state: &mut InMemoryState, post: NewPost) -> PostRef {
        let id = PostId::new(state.next_id);
        state.next_id += 1;
        let post_ref = PostRef::new(id, post.post_type.clone());
        state.posts.insert(
            id,
            StoredPost {
                post,
                featured_media: None,
                markers: HashMap::new(),
            },
        );
        post_ref
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageRepository for InMemoryStorage {
    async fn create_post(&self, post: &NewPost) -> Result<PostRef, StorageError> {
        let mut state = self.state.lock().await;
        Ok(Self::insert(&mut state, post.clone()))
    }

    async fn set_featured_image(&self, post: &PostRef, media: MediaId) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        if state.fail_featured_images {
            return Err(StorageError::Rejected {
                status: 500,
                message: "featured image write disabled".to_string(),
            });
        }
        let stored = state
            .posts
            .get_mut(&post.id)
            .ok_or_else(|| StorageError::NotFound(post.id.to_string()))?;
        stored.featured_media = Some(media);
        Ok(())
    }

    async fn set_marker(&self, post: &PostRef, key: &str, value: bool) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        if state.fail_markers {
            return Err(StorageError::Rejected {
                status: 500,
                message: "marker write disabled".to_string(),
            });
        }
        let stored = state
            .posts
            .get_mut(&post.id)
            .ok_or_else(|| StorageError::NotFound(post.id.to_string()))?;
        stored.markers.insert(key.to_string(), value);
        Ok(())
    }

    async fn find_marked(&self, key: &str) -> Result<Vec<PostRef>, StorageError> {
        let state = self.state.lock().await;
        Ok(state
            .posts
            .iter()
            .filter(|(_, stored)| stored.markers.get(key).copied().unwrap_or(false))
            .map(|(id, stored)| PostRef::new(*id, stored.post.post_type.clone()))
            .collect())
    }

    async fn delete_permanently(&self, post: &PostRef) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        state
            .posts
            .remove(&post.id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(post.id.to_string()))
    }
}

#[async_trait]
impl MediaRepository for InMemoryStorage {
    async fn image_candidates(&self, limit: usize) -> Result<Vec<MediaId>, StorageError> {
        let state = self.state.lock().await;
        if state.fail_image_listing {
            return Err(StorageError::Transport("media library unavailable".to_string()));
        }
        Ok(state.images.iter().take(limit).copied().collect())
    }
}
