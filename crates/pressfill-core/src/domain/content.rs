//! GeneratedContent - completion API が返したテキストから取り出す投稿本体
//!
//! モデルは "strict JSON" を指示されても ```json フェンスで包んで返すことがあるため、
//! パース前にフェンスを剥がします。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 1 回の completion 呼び出しで得られる投稿内容
///
/// シリアライズ時のキーは `title` / `excerpt` / `content`（キャッシュファイルと同じ形）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    pub excerpt: String,
    #[serde(rename = "content")]
    pub body: String,
}

/// モデル出力のパースエラー（アイテム単位で回復可能）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    Malformed(String),

    #[error("response JSON is not an object")]
    NotAnObject,

    #[error("response is missing required key `{0}`")]
    MissingKey(&'static str),
}

impl GeneratedContent {
    pub const REQUIRED_KEYS: [&'static str; 3] = ["title", "excerpt", "content"];

    /// モデル出力テキストをパースする
    ///
    /// # 手順
    /// 1. フェンスを剥がす（`strip_code_fence`）
    /// 2. JSON としてパース
    /// 3. `title` / `excerpt` / `content` が空でない文字列であることを確認
    pub fn from_model_text(text: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(strip_code_fence(text))
            .map_err(|e| ParseError::Malformed(e.to_string()))?;
        let object = value.as_object().ok_or(ParseError::NotAnObject)?;

        let field = |key: &'static str| -> Result<String, ParseError> {
            match object.get(key).and_then(Value::as_str) {
                Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
                _ => Err(ParseError::MissingKey(key)),
            }
        };

        Ok(Self {
            title: field("title")?,
            excerpt: field("excerpt")?,
            body: field("content")?,
        })
    }
}

/// Markdown のコードフェンス（```json ... ``` / ``` ... ```）を剥がす
///
/// フェンスがなければ前後の空白を除いたテキストをそのまま返す。
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // 開始フェンス行の言語タグ（json など）を捨てる
    let rest = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PLAIN: &str = r#"{"title":"T","excerpt":"E","content":"<p>B</p>"}"#;

    #[test]
    fn parses_plain_json() {
        let c = GeneratedContent::from_model_text(PLAIN).unwrap();
        assert_eq!(c.title, "T");
        assert_eq!(c.excerpt, "E");
        assert_eq!(c.body, "<p>B</p>");
    }

    #[rstest]
    #[case::json_fence("```json\n{body}\n```")]
    #[case::bare_fence("```\n{body}\n```")]
    #[case::single_line("```json{body}```")]
    #[case::brace_on_fence_line("```{body}\n```")]
    #[case::surrounding_whitespace("\n\n  ```json\n{body}\n```  \n")]
    fn fenced_text_parses_like_unwrapped(#[case] template: &str) {
        let wrapped = template.replace("{body}", PLAIN);
        assert_eq!(
            GeneratedContent::from_model_text(&wrapped).unwrap(),
            GeneratedContent::from_model_text(PLAIN).unwrap()
        );
    }

    #[test]
    fn strip_leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[rstest]
    #[case::no_title(r#"{"excerpt":"E","content":"B"}"#, "title")]
    #[case::no_excerpt(r#"{"title":"T","content":"B"}"#, "excerpt")]
    #[case::no_content(r#"{"title":"T","excerpt":"E"}"#, "content")]
    #[case::empty_title(r#"{"title":"  ","excerpt":"E","content":"B"}"#, "title")]
    #[case::non_string(r#"{"title":"T","excerpt":5,"content":"B"}"#, "excerpt")]
    fn missing_key_is_reported(#[case] text: &str, #[case] key: &'static str) {
        assert_eq!(
            GeneratedContent::from_model_text(text),
            Err(ParseError::MissingKey(key))
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = GeneratedContent::from_model_text("Sure! Here is your post:").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn array_is_not_an_object() {
        assert_eq!(
            GeneratedContent::from_model_text("[1,2]"),
            Err(ParseError::NotAnObject)
        );
    }

    #[test]
    fn serializes_body_as_content_key() {
        let c = GeneratedContent::from_model_text(PLAIN).unwrap();
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["content"], "<p>B</p>");
        assert!(v.get("body").is_none());
    }
}
