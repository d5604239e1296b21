//! GeneratorBuilder - ports のワイヤリング
//!
//! # 起動時検証（Fail-fast）
//! - storage は必須（generate / cleanup の両方が使う）
//! - completion / cache は generate にだけ必要。なしで構築した generator は cleanup 専用になり、
//!   generate は `Configuration` エラーを返す
//! - media を渡さなければアイキャッチは設定しない

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::generator::PlaceholderGenerator;
use crate::impls::ConsoleReporter;
use crate::ports::{
    Clock, CompletionClient, ContentCache, MediaRepository, Reporter, StorageRepository,
    SystemClock,
};

/// GeneratorBuilder は PlaceholderGenerator を構築
///
/// # 使用例
/// ```ignore
/// let generator = GeneratorBuilder::new()
///     .completion(Arc::new(OpenAiCompletionClient::new(OpenAiConfig::default())?))
///     .storage(wp.clone())
///     .media(wp)
///     .cache(JsonFileCache::open(path)?)
///     .build()?;
/// ```
#[derive(Default)]
pub struct GeneratorBuilder {
    completion: Option<Arc<dyn CompletionClient>>,
    storage: Option<Arc<dyn StorageRepository>>,
    media: Option<Arc<dyn MediaRepository>>,
    cache: Option<Box<dyn ContentCache>>,
    reporter: Option<Arc<dyn Reporter>>,
    clock: Option<Arc<dyn Clock>>,
    rng_seed: Option<u64>,
}

/// BuildError は generator 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing collaborators: {0:?}. These ports are required but were not provided.")]
    MissingPorts(Vec<&'static str>),
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completion<C: CompletionClient + 'static>(mut self, completion: Arc<C>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn storage<S: StorageRepository + 'static>(mut self, storage: Arc<S>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn media<M: MediaRepository + 'static>(mut self, media: Arc<M>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn cache<K: ContentCache + 'static>(mut self, cache: K) -> Self {
        self.cache = Some(Box::new(cache));
        self
    }

    /// 省略時は ConsoleReporter
    pub fn reporter<R: Reporter + 'static>(mut self, reporter: Arc<R>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// 省略時は SystemClock
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// 乱数の seed を固定する（省略時は OS のエントロピー）
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<PlaceholderGenerator, BuildError> {
        let Some(storage) = self.storage else {
            return Err(BuildError::MissingPorts(vec!["storage"]));
        };

        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(PlaceholderGenerator {
            completion: self.completion,
            storage,
            media: self.media,
            cache: self.cache,
            reporter: self.reporter.unwrap_or_else(|| Arc::new(ConsoleReporter)),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            rng,
        })
    }
}
