//! App - アプリケーションロジック
//!
//! - **prompt**: completion API に送るプロンプト
//! - **generator**: generate / cleanup のワークフロー
//! - **builder**: ports を組み立てて generator を作る

pub mod prompt;
pub mod generator;
pub mod builder;

pub use self::builder::{BuildError, GeneratorBuilder};
pub use self::generator::{IMAGE_CANDIDATE_LIMIT, PUBLISH_WINDOW_MONTHS, PlaceholderGenerator};
pub use self::prompt::build_prompt;
