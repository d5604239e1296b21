//! Outcome model: 1 回の `generate` 実行の結果
//!
//! 致命的エラーで中断した場合はこの型ではなく `GenerateError` が返る。
//! それまでに作成された投稿はロールバックしない（Reporter には都度通知済み）。

use serde::{Deserialize, Serialize};

use super::record::CreatedRecord;

/// パース失敗でスキップしたアイテム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedItem {
    /// 1 始まりのアイテム番号
    pub index: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created: Vec<CreatedRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedItem>,
}

impl GenerationReport {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn with_created(mut self, record: CreatedRecord) -> Self {
        self.created.push(record);
        self
    }

    pub fn with_skipped(mut self, index: u32, reason: impl Into<String>) -> Self {
        self.skipped.push(SkippedItem {
            index,
            reason: reason.into(),
        });
        self
    }

    /// 最終サマリー（CLI の Success 行に使う）
    pub fn summary(&self) -> String {
        match self.skipped.len() {
            0 => format!("Created {} placeholder post(s).", self.created.len()),
            n => format!(
                "Created {} placeholder post(s), skipped {} unparseable response(s).",
                self.created.len(),
                n
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_summary() {
        let report = GenerationReport::default();
        assert_eq!(report.created_count(), 0);
        assert_eq!(report.summary(), "Created 0 placeholder post(s).");
    }

    #[test]
    fn summary_mentions_skipped_items() {
        let report = GenerationReport::default()
            .with_skipped(2, "missing key")
            .with_skipped(3, "malformed");
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(
            report.summary(),
            "Created 0 placeholder post(s), skipped 2 unparseable response(s)."
        );
    }
}
