//! pressfill-core
//!
//! Core building blocks for the pressfill placeholder-post generator.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（request, content, ids, record, outcome, errors）
//! - **ports**: 抽象化レイヤー（CompletionClient, StorageRepository, MediaRepository, ContentCache, Reporter, Clock）
//! - **impls**: 実装（OpenAI 互換 API, WordPress REST, JSON ファイルキャッシュ, InMemory など）
//! - **app**: アプリケーションロジック（prompt, generator, builder）

pub mod domain;
pub mod ports;
pub mod impls;
pub mod app;

pub use app::{GeneratorBuilder, PlaceholderGenerator};
pub use domain::{GenerateError, GeneratedContent, GenerationReport, GenerationRequest};
