//! PlaceholderGenerator - generate / cleanup ワークフロー
//!
//! # generate の流れ（1 アイテムごと、逐次実行）
//! 1. プロンプトを組み立てる（topic のみ置換）
//! 2. completion API を呼ぶ（通信失敗・空応答は実行全体を中断）
//! 3. フェンスを剥がして JSON をパース（失敗はそのアイテムだけスキップ）
//! 4. topic ハッシュをキーにキャッシュへ保存（上書き）
//! 5. 投稿を作成（公開日は過去 6 か月からランダム）
//! 6. 既存画像からランダムに 1 枚をアイキャッチに設定（なければスキップ）
//! 7. `generated=true` マーカーを付与
//!
//! 途中で致命的エラーが起きても、それまでに作成した投稿はロールバックしない。

use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::prompt::build_prompt;
use crate::domain::{
    CreatedRecord, GENERATED_MARKER, GenerateError, GeneratedContent, GenerationReport,
    GenerationRequest, MediaId, NewPost, PostRef, topic_hash,
};
use crate::ports::{
    Clock, CompletionClient, ContentCache, MediaRepository, Reporter, StorageRepository,
};

/// アイキャッチ候補として取得する画像の上限
pub const IMAGE_CANDIDATE_LIMIT: usize = 100;

/// 公開日をばらつかせる期間（現在時刻からさかのぼる月数）
pub const PUBLISH_WINDOW_MONTHS: u32 = 6;

pub struct PlaceholderGenerator {
    pub(super) completion: Option<Arc<dyn CompletionClient>>,
    pub(super) storage: Arc<dyn StorageRepository>,
    pub(super) media: Option<Arc<dyn MediaRepository>>,
    pub(super) cache: Option<Box<dyn ContentCache>>,
    pub(super) reporter: Arc<dyn Reporter>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) rng: StdRng,
}

impl PlaceholderGenerator {
    /// `request.count()` 件の投稿を生成する
    ///
    /// # Errors
    /// - 入力不足、または completion client / cache なしで構築された場合は `Configuration`
    ///   （API は一度も呼ばない）
    /// - `Network` / `Upstream` / `Storage` / `Cache` は残りのアイテムを中断して返す
    /// - `Parse` は返さない（警告を出してスキップし、report に記録する）
    pub async fn generate(
        &mut self,
        request: &GenerationRequest,
    ) -> Result<GenerationReport, GenerateError> {
        request.validate()?;
        let completion = self.completion.clone().ok_or_else(|| {
            GenerateError::Configuration("generator was built without a completion client".into())
        })?;
        if self.cache.is_none() {
            return Err(GenerateError::Configuration(
                "generator was built without a content cache".into(),
            ));
        }

        let prompt = build_prompt(request.topic());
        let cache_key = request.cache_key();
        let mut report = GenerationReport::default();

        for index in 1..=request.count() {
            tracing::debug!(index, total = request.count(), topic = request.topic(), "generating item");
            self.reporter
                .notice(&format!("Generating {index}/{}...", request.count()));
            match self
                .generate_one(completion.as_ref(), request, &prompt, &cache_key)
                .await
            {
                Ok(record) => {
                    tracing::info!(post = %record.post.id, post_type = %record.post.post_type, "created placeholder post");
                    self.reporter.success(&format!(
                        "Created post {}: {}",
                        record.post.id.get(),
                        record.title
                    ));
                    report = report.with_created(record);
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(index, error = %e, "skipping item");
                    self.reporter
                        .warning(&format!("Skipping item {index}: {e}"));
                    report = report.with_skipped(index, e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        self.reporter.success(&report.summary());
        Ok(report)
    }

    async fn generate_one(
        &mut self,
        completion: &dyn CompletionClient,
        request: &GenerationRequest,
        prompt: &str,
        cache_key: &str,
    ) -> Result<CreatedRecord, GenerateError> {
        let text = completion.complete(request.api_key(), prompt).await?;
        let content = GeneratedContent::from_model_text(&text)?;

        if let Some(cache) = self.cache.as_mut() {
            cache.put(cache_key, content.clone());
            cache.persist()?;
        }

        let published_at = self.random_publish_date();
        let post = NewPost::published(&content, request.target_type(), published_at);
        let post_ref = self.storage.create_post(&post).await?;

        let featured_media = self.attach_random_image(&post_ref).await;

        if let Err(e) = self
            .storage
            .set_marker(&post_ref, GENERATED_MARKER, true)
            .await
        {
            // マーカーなしの投稿は cleanup で消せないため、作成した投稿を消してから返す
            if let Err(delete_err) = self.storage.delete_permanently(&post_ref).await {
                tracing::error!(post = %post_ref.id, error = %delete_err, "failed to remove unmarked post");
                self.reporter.warning(&format!(
                    "Post {} was created but could not be marked or removed: {delete_err}",
                    post_ref.id.get()
                ));
            }
            return Err(e.into());
        }

        Ok(CreatedRecord {
            post: post_ref,
            title: content.title,
            published_at,
            featured_media,
        })
    }

    /// [now - 6 か月, now] から一様に選んだ時刻（秒精度）
    fn random_publish_date(&mut self) -> DateTime<Utc> {
        let now = self.clock.now();
        let start = now
            .checked_sub_months(Months::new(PUBLISH_WINDOW_MONTHS))
            .unwrap_or(now);
        let secs = self.rng.gen_range(start.timestamp()..=now.timestamp());
        DateTime::from_timestamp(secs, 0).unwrap_or(now)
    }

    /// 候補画像から 1 枚をランダムに選んでアイキャッチに設定
    ///
    /// 候補がない・取得や設定に失敗した場合は None（アイテム自体は続行）。
    async fn attach_random_image(&mut self, post: &PostRef) -> Option<MediaId> {
        let media = self.media.clone()?;
        let candidates = match media.image_candidates(IMAGE_CANDIDATE_LIMIT).await {
            Ok(candidates) => candidates,
            Err(e) => {
                self.reporter
                    .warning(&format!("Could not list images for post {}: {e}", post.id.get()));
                return None;
            }
        };

        let chosen = *candidates.choose(&mut self.rng)?;
        match self.storage.set_featured_image(post, chosen).await {
            Ok(()) => Some(chosen),
            Err(e) => {
                self.reporter.warning(&format!(
                    "Could not attach image {} to post {}: {e}",
                    chosen.get(),
                    post.id.get()
                ));
                None
            }
        }
    }

    /// `generated=true` の投稿をすべて完全削除し、削除件数を返す
    pub async fn cleanup(&self) -> Result<usize, GenerateError> {
        let marked = self.storage.find_marked(GENERATED_MARKER).await?;
        tracing::debug!(count = marked.len(), "found generated posts");

        for post in &marked {
            self.storage.delete_permanently(post).await?;
            tracing::info!(post = %post.id, post_type = %post.post_type, "deleted placeholder post");
        }

        self.reporter
            .success(&format!("Deleted {} placeholder post(s).", marked.len()));
        Ok(marked.len())
    }

    /// topic に対応するキャッシュエントリ
    pub fn cached(&self, topic: &str) -> Option<GeneratedContent> {
        self.cache.as_ref()?.get(&topic_hash(topic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::GeneratorBuilder;
    use crate::impls::{InMemoryStorage, JsonFileCache, RecordingReporter, ScriptedCompletion};
    use crate::ports::{CompletionError, FixedClock};
    use chrono::TimeZone;
    use rstest::rstest;
    use tempfile::TempDir;

    const GOOD: &str = r#"{"title":"Hello","excerpt":"Short","content":"<p>Body</p>"}"#;

    struct Harness {
        storage: Arc<InMemoryStorage>,
        completion: Arc<ScriptedCompletion>,
        reporter: Arc<RecordingReporter>,
        dir: TempDir,
    }

    impl Harness {
        fn cache_path(&self) -> std::path::PathBuf {
            self.dir.path().join("uploads").join("cache.json")
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    fn harness(
        completion: ScriptedCompletion,
        images: Vec<MediaId>,
    ) -> (Harness, PlaceholderGenerator) {
        let dir = tempfile::tempdir().unwrap();
        let h = Harness {
            storage: Arc::new(InMemoryStorage::with_images(images)),
            completion: Arc::new(completion),
            reporter: Arc::new(RecordingReporter::new()),
            dir,
        };
        let generator = GeneratorBuilder::new()
            .completion(h.completion.clone())
            .storage(h.storage.clone())
            .media(h.storage.clone())
            .cache(JsonFileCache::open(h.cache_path()).unwrap())
            .reporter(h.reporter.clone())
            .clock(FixedClock::new(now()))
            .rng_seed(7)
            .build()
            .unwrap();
        (h, generator)
    }

    fn request(topic: &str, count: u32) -> GenerationRequest {
        GenerationRequest::new(topic, count, "post", "sk-test")
    }

    #[tokio::test]
    async fn zero_count_creates_nothing_and_calls_nothing() {
        let (h, mut generator) = harness(ScriptedCompletion::new().then_text(GOOD), vec![]);

        let report = generator.generate(&request("rust", 0)).await.unwrap();

        assert_eq!(report.created_count(), 0);
        assert_eq!(h.completion.calls(), 0);
        assert_eq!(h.storage.post_count().await, 0);
    }

    #[rstest]
    #[case::empty_topic("", "sk-test")]
    #[case::empty_api_key("rust", "")]
    #[tokio::test]
    async fn missing_input_fails_before_any_call(#[case] topic: &str, #[case] api_key: &str) {
        let (h, mut generator) = harness(ScriptedCompletion::new().then_text(GOOD), vec![]);

        let err = generator
            .generate(&GenerationRequest::new(topic, 3, "post", api_key))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerateError::Configuration(_)));
        assert_eq!(h.completion.calls(), 0);
    }

    #[tokio::test]
    async fn valid_response_creates_marked_post_and_cache_entry() {
        let (h, mut generator) = harness(ScriptedCompletion::new().then_text(GOOD), vec![]);

        let report = generator.generate(&request("rust", 1)).await.unwrap();

        assert_eq!(report.created_count(), 1);
        let record = &report.created[0];
        let stored = h.storage.get(record.post.id).await.unwrap();
        assert_eq!(stored.post.title, "Hello");
        assert_eq!(stored.post.excerpt, "Short");
        assert_eq!(stored.post.content, "<p>Body</p>");
        assert_eq!(stored.post.post_type, "post");
        assert_eq!(stored.post.status, crate::domain::PostStatus::Publish);
        assert_eq!(stored.markers.get(GENERATED_MARKER), Some(&true));

        let cached = generator.cached("rust").unwrap();
        assert_eq!(cached.title, "Hello");

        let on_disk = JsonFileCache::open(h.cache_path()).unwrap();
        assert_eq!(on_disk.get(&topic_hash("rust")), Some(cached));
        assert!(h.completion.prompts()[0].contains("\"rust\""));
        assert_eq!(
            h.reporter.lines()[0],
            crate::impls::ReportLine::Notice("Generating 1/1...".to_string())
        );
    }

    #[tokio::test]
    async fn fenced_response_is_accepted() {
        let fenced = format!("```json\n{GOOD}\n```");
        let (_h, mut generator) = harness(ScriptedCompletion::new().then_text(fenced), vec![]);

        let report = generator.generate(&request("rust", 1)).await.unwrap();
        assert_eq!(report.created_count(), 1);
        assert_eq!(report.created[0].title, "Hello");
    }

    #[tokio::test]
    async fn same_topic_overwrites_cache_entry() {
        let second = r#"{"title":"Again","excerpt":"S","content":"B"}"#;
        let (h, mut generator) = harness(
            ScriptedCompletion::new().then_text(GOOD).then_text(second),
            vec![],
        );

        generator.generate(&request("rust", 1)).await.unwrap();
        generator.generate(&request("rust", 1)).await.unwrap();

        let on_disk = JsonFileCache::open(h.cache_path()).unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk.get(&topic_hash("rust")).unwrap().title, "Again");
        assert_eq!(h.storage.post_count().await, 2);
    }

    #[tokio::test]
    async fn missing_key_skips_item_and_continues() {
        let bad = r#"{"title":"No body","excerpt":"E"}"#;
        let (h, mut generator) = harness(
            ScriptedCompletion::new().then_text(bad).then_text(GOOD),
            vec![],
        );

        let report = generator.generate(&request("rust", 2)).await.unwrap();

        assert_eq!(report.created_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(h.completion.calls(), 2);
        assert_eq!(h.storage.post_count().await, 1);
        assert_eq!(h.reporter.warnings().len(), 1);
        assert!(h.reporter.warnings()[0].contains("content"));
    }

    #[tokio::test]
    async fn skipped_item_does_not_touch_cache() {
        let (h, mut generator) =
            harness(ScriptedCompletion::new().then_text("not json at all"), vec![]);

        let report = generator.generate(&request("rust", 1)).await.unwrap();

        assert_eq!(report.created_count(), 0);
        assert!(!h.cache_path().exists());
        assert!(generator.cached("rust").is_none());
    }

    #[tokio::test]
    async fn network_failure_aborts_remaining_items() {
        let (h, mut generator) = harness(
            ScriptedCompletion::new()
                .then_text(GOOD)
                .then_error(CompletionError::Network("connection reset".into()))
                .then_text(GOOD),
            vec![],
        );

        let err = generator.generate(&request("rust", 3)).await.unwrap_err();

        assert!(matches!(err, GenerateError::Network(_)));
        assert_eq!(h.completion.calls(), 2);
        // 中断前に作成した投稿は残る
        assert_eq!(h.storage.post_count().await, 1);
    }

    #[tokio::test]
    async fn upstream_failure_aborts_run() {
        let (h, mut generator) = harness(
            ScriptedCompletion::new()
                .then_error(CompletionError::Upstream("no content".into()))
                .then_text(GOOD),
            vec![],
        );

        let err = generator.generate(&request("rust", 2)).await.unwrap_err();

        assert!(matches!(err, GenerateError::Upstream(_)));
        assert_eq!(h.completion.calls(), 1);
        assert_eq!(h.storage.post_count().await, 0);
    }

    #[tokio::test]
    async fn publish_dates_fall_inside_six_month_window() {
        let mut script = ScriptedCompletion::new();
        for _ in 0..20 {
            script = script.then_text(GOOD);
        }
        let (_h, mut generator) = harness(script, vec![]);

        let report = generator.generate(&request("rust", 20)).await.unwrap();

        let start = now().checked_sub_months(Months::new(6)).unwrap();
        for record in &report.created {
            assert!(record.published_at >= start, "{} too early", record.published_at);
            assert!(record.published_at <= now(), "{} in the future", record.published_at);
        }
    }

    #[tokio::test]
    async fn featured_image_is_chosen_from_candidates() {
        let images = vec![MediaId::new(10), MediaId::new(11), MediaId::new(12)];
        let (h, mut generator) =
            harness(ScriptedCompletion::new().then_text(GOOD), images.clone());

        let report = generator.generate(&request("rust", 1)).await.unwrap();

        let chosen = report.created[0].featured_media.unwrap();
        assert!(images.contains(&chosen));
        let stored = h.storage.get(report.created[0].post.id).await.unwrap();
        assert_eq!(stored.featured_media, Some(chosen));
    }

    #[tokio::test]
    async fn no_images_means_no_featured_image() {
        let (h, mut generator) = harness(ScriptedCompletion::new().then_text(GOOD), vec![]);

        let report = generator.generate(&request("rust", 1)).await.unwrap();

        assert_eq!(report.created[0].featured_media, None);
        assert!(h.reporter.warnings().is_empty());
    }

    #[tokio::test]
    async fn image_listing_failure_keeps_post_without_image() {
        let (h, mut generator) =
            harness(ScriptedCompletion::new().then_text(GOOD), vec![MediaId::new(10)]);
        h.storage.fail_image_listing(true).await;

        let report = generator.generate(&request("rust", 1)).await.unwrap();

        assert_eq!(report.created_count(), 1);
        assert_eq!(report.created[0].featured_media, None);
        let stored = h.storage.get(report.created[0].post.id).await.unwrap();
        assert_eq!(stored.featured_media, None);
        assert_eq!(stored.markers.get(GENERATED_MARKER), Some(&true));
        let warnings = h.reporter.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Could not list images"));
    }

    #[tokio::test]
    async fn featured_image_failure_keeps_post_without_image() {
        let (h, mut generator) =
            harness(ScriptedCompletion::new().then_text(GOOD), vec![MediaId::new(10)]);
        h.storage.fail_featured_images(true).await;

        let report = generator.generate(&request("rust", 1)).await.unwrap();

        assert_eq!(report.created_count(), 1);
        assert_eq!(report.created[0].featured_media, None);
        let stored = h.storage.get(report.created[0].post.id).await.unwrap();
        assert_eq!(stored.featured_media, None);
        assert_eq!(stored.markers.get(GENERATED_MARKER), Some(&true));
        let warnings = h.reporter.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Could not attach image 10"));
    }

    #[tokio::test]
    async fn marker_failure_removes_the_created_post() {
        let (h, mut generator) = harness(ScriptedCompletion::new().then_text(GOOD), vec![]);
        h.storage.fail_markers(true).await;

        let err = generator.generate(&request("rust", 1)).await.unwrap_err();

        assert!(matches!(err, GenerateError::Storage(_)));
        assert_eq!(h.storage.post_count().await, 0);
    }

    #[tokio::test]
    async fn cleanup_deletes_every_generated_post_once() {
        let mut script = ScriptedCompletion::new();
        for _ in 0..3 {
            script = script.then_text(GOOD);
        }
        let (h, mut generator) = harness(script, vec![]);
        generator.generate(&request("rust", 3)).await.unwrap();
        let hand_written = h
            .storage
            .insert_unmarked(NewPost::published(
                &GeneratedContent::from_model_text(GOOD).unwrap(),
                "page",
                now(),
            ))
            .await;

        assert_eq!(generator.cleanup().await.unwrap(), 3);
        assert_eq!(generator.cleanup().await.unwrap(), 0);
        assert_eq!(h.storage.post_count().await, 1);
        assert!(h.storage.get(hand_written.id).await.is_some());
    }

    #[tokio::test]
    async fn cleanup_only_generator_refuses_to_generate() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut generator = GeneratorBuilder::new()
            .storage(storage)
            .reporter(Arc::new(RecordingReporter::new()))
            .build()
            .unwrap();

        assert_eq!(generator.cleanup().await.unwrap(), 0);
        let err = generator.generate(&request("rust", 1)).await.unwrap_err();
        assert!(matches!(err, GenerateError::Configuration(_)));
    }
}
