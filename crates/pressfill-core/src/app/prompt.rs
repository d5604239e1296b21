//! Prompt template.
//!
//! 置換するのは topic だけ。テンプレート自体は設定できない。

const TEMPLATE: &str = "Write a blog post about \"{topic}\". \
Respond with strict JSON only, with no markdown and no commentary, using exactly these keys: \
\"title\" (a short headline), \
\"excerpt\" (one or two sentences summarizing the post), \
\"content\" (the full post body as HTML paragraphs).";

pub fn build_prompt(topic: &str) -> String {
    TEMPLATE.replace("{topic}", topic)
}
