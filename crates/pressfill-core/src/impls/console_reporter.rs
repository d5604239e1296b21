//! ConsoleReporter / RecordingReporter
//!
//! ConsoleReporter は WP-CLI と同じ体裁で出力する：
//! - notice: そのまま stdout
//! - warning: `Warning: ...` を stderr
//! - success: `Success: ...` を stdout

use std::sync::Mutex;

use crate::ports::Reporter;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn notice(&self, message: &str) {
        println!("{message}");
    }

    fn warning(&self, message: &str) {
        eprintln!("Warning: {message}");
    }

    fn success(&self, message: &str) {
        println!("Success: {message}");
    }
}

/// 記録された 1 行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Notice(String),
    Warning(String),
    Success(String),
}

/// 出力を記録するだけの Reporter（テスト用）
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<ReportLine>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<ReportLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|line| match line {
                ReportLine::Warning(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    fn push(&self, line: ReportLine) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl Reporter for RecordingReporter {
    fn notice(&self, message: &str) {
        self.push(ReportLine::Notice(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.push(ReportLine::Warning(message.to_string()));
    }

    fn success(&self, message: &str) {
        self.push(ReportLine::Success(message.to_string()));
    }
}
