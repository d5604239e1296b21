//! WpRestStorage - WordPress REST API（`/wp-json/wp/v2`）による StorageRepository / MediaRepository
//!
//! # 前提
//! - 認証はアプリケーションパスワード（HTTP Basic）
//! - マーカーは post meta `generated`。サイト側で `register_post_meta(..., ['show_in_rest' => true, 'type' => 'boolean'])`
//!   しておく必要がある
//!
//! # エンドポイント
//! - post type → rest_base の解決: `GET /types/{type}`（結果はメモ化）
//! - 作成: `POST /{rest_base}`
//! - アイキャッチ・マーカー: `POST /{rest_base}/{id}`
//! - マーカー検索: `GET /types` → 各コレクションを `context=edit&status=any` でページング
//! - 削除: `DELETE /{rest_base}/{id}?force=true`（ゴミ箱を経由しない）
//! - 画像候補: `GET /media?media_type=image&per_page={limit}`

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::domain::{MediaId, NewPost, PostId, PostRef};
use crate::ports::{MediaRepository, StorageError, StorageRepository};

/// 1 ページの最大件数（WordPress の per_page 上限）
pub const MAX_PER_PAGE: usize = 100;

/// 検索・削除の対象外にする post type
const SKIPPED_TYPES: [&str; 1] = ["attachment"];

#[derive(Debug, Clone)]
pub struct WpRestConfig {
    /// サイトのルート URL（例: `https://example.com`）
    pub site_url: String,
    pub username: String,
    pub app_password: String,
    pub timeout: Duration,
}

impl WpRestConfig {
    pub fn new(
        site_url: impl Into<String>,
        username: impl Into<String>,
        app_password: impl Into<String>,
    ) -> Self {
        Self {
            site_url: site_url.into(),
            username: username.into(),
            app_password: app_password.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Deserialize)]
struct TypeInfo {
    #[serde(default)]
    rest_base: Option<String>,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: u64,
}

#[derive(Deserialize)]
struct MediaItem {
    id: u64,
}

#[derive(Deserialize)]
struct WpErrorBody {
    #[serde(default)]
    code: String,
    message: String,
}

pub struct WpRestStorage {
    config: WpRestConfig,
    client: Client,
    /// post type → rest_base
    rest_bases: Mutex<HashMap<String, String>>,
}

impl WpRestStorage {
    pub fn new(config: WpRestConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorageError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            client,
            rest_bases: Mutex::new(HashMap::new()),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/wp-json/wp/v2/{}",
            self.config.site_url.trim_end_matches('/'),
            path
        )
    }

    /// 認証を付けて送信し、2xx 以外は Rejected に変換
    async fn send(&self, req: RequestBuilder) -> Result<Response, StorageError> {
        let res = req
            .basic_auth(&self.config.username, Some(&self.config.app_password))
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<WpErrorBody>(&body) {
            Ok(err) if err.code.is_empty() => err.message,
            Ok(err) => format!("{} ({})", err.message, err.code),
            Err(_) => body,
        };
        Err(StorageError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(res: Response) -> Result<T, StorageError> {
        res.json::<T>()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))
    }

    /// post type の rest_base を解決（メモ化）
    async fn rest_base(&self, post_type: &str) -> Result<String, StorageError> {
        if let Some(base) = self.rest_bases.lock().await.get(post_type) {
            return Ok(base.clone());
        }

        let res = self
            .send(self.client.get(self.endpoint(&format!("types/{post_type}"))))
            .await?;
        let info: TypeInfo = Self::read_json(res).await?;
        let base = info
            .rest_base
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                StorageError::NotFound(format!("post type `{post_type}` is not exposed over REST"))
            })?;

        self.rest_bases
            .lock()
            .await
            .insert(post_type.to_string(), base.clone());
        Ok(base)
    }

    /// 投稿を更新し、更新後の投稿（JSON）を返す
    async fn update_post(&self, post: &PostRef, body: Value) -> Result<Value, StorageError> {
        let base = self.rest_base(&post.post_type).await?;
        let url = self.endpoint(&format!("{base}/{}", post.id.get()));
        let res = self.send(self.client.post(url).json(&body)).await?;
        Self::read_json(res).await
    }

    /// 1 つのコレクションをページングしながら `meta[key] == true` の投稿を集める
    async fn collect_marked(
        &self,
        post_type: &str,
        rest_base: &str,
        key: &str,
    ) -> Result<Vec<PostRef>, StorageError> {
        let per_page = MAX_PER_PAGE.to_string();
        let mut found = Vec::new();
        let mut page = 1usize;

        loop {
            let page_param = page.to_string();
            let req = self.client.get(self.endpoint(rest_base)).query(&[
                ("context", "edit"),
                ("status", "any"),
                ("per_page", per_page.as_str()),
                ("page", page_param.as_str()),
            ]);
            let res = self.send(req).await?;
            let total_pages = res
                .headers()
                .get("x-wp-totalpages")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(1);
            let items: Vec<Value> = Self::read_json(res).await?;

            found.extend(items.iter().filter_map(|item| {
                let marked = item["meta"][key].as_bool().unwrap_or(false);
                let id = item["id"].as_u64()?;
                marked.then(|| PostRef::new(PostId::new(id), post_type))
            }));

            if items.is_empty() || page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(found)
    }
}

#[async_trait]
impl StorageRepository for WpRestStorage {
    async fn create_post(&self, post: &NewPost) -> Result<PostRef, StorageError> {
        let base = self.rest_base(&post.post_type).await?;
        let body = json!({
            "title": post.title,
            "content": post.content,
            "excerpt": post.excerpt,
            "status": post.status,
            "date_gmt": post.published_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        });

        let res = self
            .send(self.client.post(self.endpoint(&base)).json(&body))
            .await?;
        let created: CreatedPost = Self::read_json(res).await?;
        tracing::debug!(id = created.id, post_type = %post.post_type, "created post over REST");
        Ok(PostRef::new(PostId::new(created.id), post.post_type.clone()))
    }

    async fn set_featured_image(&self, post: &PostRef, media: MediaId) -> Result<(), StorageError> {
        self.update_post(post, json!({ "featured_media": media }))
            .await
            .map(|_| ())
    }

    /// WordPress は未登録の meta キーを黙って捨てて 200 を返すため、
    /// 更新後の投稿に値が反映されていなければ InvalidResponse を返す
    async fn set_marker(&self, post: &PostRef, key: &str, value: bool) -> Result<(), StorageError> {
        let updated = self.update_post(post, json!({ "meta": { key: value } })).await?;
        if updated["meta"][key].as_bool() != Some(value) {
            return Err(StorageError::InvalidResponse(format!(
                "post {} did not keep meta `{key}`; register it with show_in_rest",
                post.id.get()
            )));
        }
        Ok(())
    }

    async fn find_marked(&self, key: &str) -> Result<Vec<PostRef>, StorageError> {
        let res = self
            .send(self.client.get(self.endpoint("types")).query(&[("context", "edit")]))
            .await?;
        let types: BTreeMap<String, TypeInfo> = Self::read_json(res).await?;

        let mut found = Vec::new();
        for (post_type, info) in types {
            if SKIPPED_TYPES.contains(&post_type.as_str()) {
                continue;
            }
            let Some(base) = info.rest_base.filter(|b| !b.is_empty()) else {
                continue;
            };
            self.rest_bases
                .lock()
                .await
                .insert(post_type.clone(), base.clone());

            match self.collect_marked(&post_type, &base, key).await {
                Ok(refs) => found.extend(refs),
                // テンプレート系など、一覧を返さない type は対象外
                Err(StorageError::Rejected { status, message }) if status < 500 => {
                    tracing::warn!(%post_type, status, %message, "skipping post type that cannot be listed");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(found)
    }

    async fn delete_permanently(&self, post: &PostRef) -> Result<(), StorageError> {
        let base = self.rest_base(&post.post_type).await?;
        let url = self.endpoint(&format!("{base}/{}", post.id.get()));
        self.send(self.client.delete(url).query(&[("force", "true")]))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MediaRepository for WpRestStorage {
    async fn image_candidates(&self, limit: usize) -> Result<Vec<MediaId>, StorageError> {
        let per_page = limit.clamp(1, MAX_PER_PAGE).to_string();
        let req = self.client.get(self.endpoint("media")).query(&[
            ("media_type", "image"),
            ("per_page", per_page.as_str()),
            ("_fields", "id"),
        ]);
        let res = self.send(req).await?;
        let items: Vec<MediaItem> = Self::read_json(res).await?;
        Ok(items.into_iter().map(|m| MediaId::new(m.id)).collect())
    }
}
