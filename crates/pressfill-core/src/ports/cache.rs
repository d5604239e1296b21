//! ContentCache port - topic ハッシュ → 生成コンテンツの key-value ストア
//!
//! ファイル形式の詳細は実装側（JsonFileCache）に閉じ込めます。

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::GeneratedContent;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cannot access cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache file {path} is not valid JSON: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// ContentCache は生成コンテンツを topic ハッシュごとに 1 件保持する
///
/// # 設計原則
/// - 同じキーへの put は上書き（last-write-wins）
/// - put はメモリ上の更新のみ、persist で保存先を読み直して全体を書き出す
pub trait ContentCache: Send {
    fn get(&self, key: &str) -> Option<GeneratedContent>;

    fn put(&mut self, key: &str, content: GeneratedContent);

    fn persist(&mut self) -> Result<(), CacheError>;
}
