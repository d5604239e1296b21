//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（completion API, WordPress, ファイルシステム, 端末）への
//! インターフェースを提供し、generator をホスト環境なしでテスト可能にします。

pub mod completion;
pub mod storage;
pub mod media;
pub mod cache;
pub mod reporter;
pub mod clock;

// 主要な trait を再エクスポート
pub use self::completion::{CompletionClient, CompletionError};
pub use self::storage::{StorageError, StorageRepository};
pub use self::media::MediaRepository;
pub use self::cache::{CacheError, ContentCache};
pub use self::reporter::Reporter;
pub use self::clock::{Clock, FixedClock, SystemClock};
