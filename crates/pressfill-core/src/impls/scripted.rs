//! ScriptedCompletion - 事前に積んだ応答を順番に返す CompletionClient
//!
//! generator のテストで、ネットワークなしに completion API の振る舞いを再現するために使う。

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::ports::{CompletionClient, CompletionError};

#[derive(Debug, Default)]
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// 成功応答を積む
    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.then(Ok(text.into()))
    }

    /// エラー応答を積む
    pub fn then_error(self, err: CompletionError) -> Self {
        self.then(Err(err))
    }

    fn then(self, response: Result<String, CompletionError>) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
        self
    }

    /// complete が呼ばれた回数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, _api_key: &str, prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| Err(CompletionError::Upstream("script exhausted".to_string())))
    }
}
