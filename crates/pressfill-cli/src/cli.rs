//! コマンドライン引数と設定の解決
//!
//! 優先順位: コマンドライン引数 > 環境変数 > 既定値

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pressfill_core::impls::json_cache::DEFAULT_CACHE_FILE_NAME;
use pressfill_core::impls::openai::{DEFAULT_API_URL, DEFAULT_MODEL};
use pressfill_core::impls::{OpenAiConfig, WpRestConfig};

#[derive(Debug, Parser)]
#[command(name = "pressfill")]
#[command(about = "Generate placeholder WordPress posts with a language model", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Cache file for generated content
    #[arg(long, global = true, env = "PRESSFILL_CACHE_FILE", default_value_os_t = default_cache_file())]
    pub cache_file: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct SiteArgs {
    /// WordPress site root URL
    #[arg(long, global = true, env = "PRESSFILL_SITE_URL", default_value = "")]
    pub site_url: String,

    /// WordPress user that owns the application password
    #[arg(long, global = true, env = "PRESSFILL_USERNAME", default_value = "")]
    pub username: String,

    /// Application password for the user
    #[arg(
        long,
        global = true,
        env = "PRESSFILL_APP_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    pub app_password: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate placeholder posts
    Create(CreateArgs),

    /// Permanently delete every generated post
    Cleanup,

    /// Show the cached content for a topic
    Cache {
        #[arg(long)]
        topic: String,
    },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Post type to create
    #[arg(long = "post_type", visible_alias = "post-type", default_value = "post")]
    pub post_type: String,

    /// Number of posts to generate
    #[arg(long, default_value_t = 1)]
    pub count: u32,

    /// Topic the posts are about
    #[arg(long, default_value = "")]
    pub topic: String,

    /// Completion API key
    #[arg(
        long = "api_key",
        visible_alias = "api-key",
        env = "OPENAI_API_KEY",
        default_value = "",
        hide_env_values = true
    )]
    pub api_key: String,

    /// Model name sent to the completion API
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Chat completions endpoint
    #[arg(long, env = "PRESSFILL_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("wp-content/uploads").join(DEFAULT_CACHE_FILE_NAME)
}

impl SiteArgs {
    /// サイト接続設定（URL・ユーザー・パスワードのどれかが空なら None）
    pub fn to_config(&self) -> Option<WpRestConfig> {
        if [&self.site_url, &self.username, &self.app_password]
            .iter()
            .any(|v| v.trim().is_empty())
        {
            return None;
        }
        Some(WpRestConfig::new(
            self.site_url.trim(),
            self.username.trim(),
            &self.app_password,
        ))
    }
}

impl CreateArgs {
    pub fn to_openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_url: self.api_url.clone(),
            model: self.model.clone(),
            ..OpenAiConfig::default()
        }
    }
}
