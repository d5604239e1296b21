//! Content records - 作成する投稿と、作成済み投稿への参照

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::GeneratedContent;
use super::ids::{MediaId, PostId};

/// 生成した投稿に付けるマーカー属性のキー（値は `true`）
///
/// cleanup はこのマーカーだけを頼りに削除対象を探す。
pub const GENERATED_MARKER: &str = "generated";

/// 投稿ステータス（WordPress の post_status）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Publish,
}

/// 投稿への参照
///
/// REST API は post type ごとにエンドポイントが分かれているため、ID と type をセットで持つ。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostRef {
    pub id: PostId,
    pub post_type: String,
}

impl PostRef {
    pub fn new(id: PostId, post_type: impl Into<String>) -> Self {
        Self {
            id,
            post_type: post_type.into(),
        }
    }
}

/// これから作成する投稿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub status: PostStatus,
    pub post_type: String,
    pub published_at: DateTime<Utc>,
}

impl NewPost {
    /// 生成コンテンツから公開状態の投稿を組み立てる
    pub fn published(
        content: &GeneratedContent,
        post_type: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: content.title.clone(),
            content: content.body.clone(),
            excerpt: content.excerpt.clone(),
            status: PostStatus::Publish,
            post_type: post_type.into(),
            published_at,
        }
    }
}

/// 1 アイテム分の作成結果（マーカー付与まで完了したもの）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRecord {
    pub post: PostRef,
    pub title: String,
    pub published_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<MediaId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn published_post_copies_content() {
        let content = GeneratedContent {
            title: "T".into(),
            excerpt: "E".into(),
            body: "B".into(),
        };
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let post = NewPost::published(&content, "page", at);

        assert_eq!(post.title, "T");
        assert_eq!(post.excerpt, "E");
        assert_eq!(post.content, "B");
        assert_eq!(post.status, PostStatus::Publish);
        assert_eq!(post.post_type, "page");
        assert_eq!(post.published_at, at);
    }

    #[test]
    fn status_serializes_as_wordpress_name() {
        assert_eq!(serde_json::to_string(&PostStatus::Publish).unwrap(), "\"publish\"");
    }
}
