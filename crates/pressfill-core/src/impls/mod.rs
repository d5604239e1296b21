//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **OpenAiCompletionClient**: OpenAI 互換の chat completions API
//! - **WpRestStorage**: WordPress REST API（StorageRepository + MediaRepository）
//! - **JsonFileCache**: 1 ファイルの JSON キャッシュ
//! - **ConsoleReporter**: WP-CLI 風のコンソール出力
//!
//! # 開発用・テスト用
//! - **InMemoryStorage**: 投稿とメディアをメモリ上に保持
//! - **ScriptedCompletion**: 事前に積んだ応答を順番に返す
//! - **RecordingReporter**: 出力を記録する

pub mod openai;
pub mod wp_rest;
pub mod json_cache;
pub mod console_reporter;
pub mod inmem_storage;
pub mod scripted;

// 主要な型を再エクスポート
pub use self::openai::{OpenAiCompletionClient, OpenAiConfig};
pub use self::wp_rest::{WpRestConfig, WpRestStorage};
pub use self::json_cache::JsonFileCache;
pub use self::console_reporter::{ConsoleReporter, RecordingReporter, ReportLine};
pub use self::inmem_storage::InMemoryStorage;
pub use self::scripted::ScriptedCompletion;
