//! JsonFileCache - 1 つの JSON ドキュメントとして保存するキャッシュ
//!
//! ファイル形式:
//! ```text
//! {
//!   "<md5(topic)>": { "title": "...", "excerpt": "...", "content": "..." },
//!   ...
//! }
//! ```
//!
//! persist のたびにファイルを読み直し、未保存の put を反映してから全体を書き直す
//! （read-modify-write、追記なし、ロックなし）。

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::GeneratedContent;
use crate::ports::{CacheError, ContentCache};

/// キャッシュファイル名の既定値（アップロードディレクトリ直下に置く）
pub const DEFAULT_CACHE_FILE_NAME: &str = "pressfill-cache.json";

pub struct JsonFileCache {
    path: PathBuf,
    entries: BTreeMap<String, GeneratedContent>,
    /// 前回の persist 以降に put されたキー
    dirty: BTreeSet<String>,
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, GeneratedContent>, CacheError> {
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(text) => serde_json::from_str(&text).map_err(|source| CacheError::Format {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(source) => Err(CacheError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl JsonFileCache {
    /// 既存ファイルを読み込んで開く（ファイルがなければ空）
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened content cache");
        Ok(Self {
            path,
            entries,
            dirty: BTreeSet::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentCache for JsonFileCache {
    fn get(&self, key: &str) -> Option<GeneratedContent> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, content: GeneratedContent) {
        self.entries.insert(key.to_string(), content);
        self.dirty.insert(key.to_string());
    }

    fn persist(&mut self) -> Result<(), CacheError> {
        // 他の実行が書いたエントリを消さないよう、ディスクの最新内容に未保存分だけを重ねる
        let mut merged = read_entries(&self.path)?;
        for key in &self.dirty {
            if let Some(content) = self.entries.get(key) {
                merged.insert(key.clone(), content.clone());
            }
        }

        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(&merged).map_err(|source| {
            CacheError::Format {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), entries = merged.len(), "persisted content cache");

        self.entries = merged;
        self.dirty.clear();
        Ok(())
    }
}
