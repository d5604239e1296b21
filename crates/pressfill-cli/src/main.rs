use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pressfill_core::domain::{GenerateError, topic_hash};
use pressfill_core::impls::{
    ConsoleReporter, JsonFileCache, OpenAiCompletionClient, WpRestStorage,
};
use pressfill_core::ports::{ContentCache, Reporter};
use pressfill_core::{GenerationRequest, GeneratorBuilder};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command, CreateArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// RUST_LOG があればそれを使い、なければ --verbose で debug / warn を切り替える
fn init_tracing(verbose: bool) {
    let default = if verbose { "pressfill_core=debug,pressfill=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), GenerateError> {
    match cli.command {
        Command::Create(ref args) => create(&cli, args).await,
        Command::Cleanup => cleanup(&cli).await,
        Command::Cache { ref topic } => show_cache(&cli, topic),
    }
}

fn site_storage(cli: &Cli) -> Result<Arc<WpRestStorage>, GenerateError> {
    let config = cli.site.to_config().ok_or_else(|| {
        GenerateError::Configuration(
            "--site-url, --username and --app-password are required".to_string(),
        )
    })?;
    tracing::debug!(site = %config.site_url, user = %config.username, "using WordPress REST storage");
    Ok(Arc::new(WpRestStorage::new(config)?))
}

async fn create(cli: &Cli, args: &CreateArgs) -> Result<(), GenerateError> {
    let request = GenerationRequest::new(&args.topic, args.count, &args.post_type, &args.api_key);
    // サイトに触れる前に入力を検証する
    request.validate()?;

    let storage = site_storage(cli)?;
    let completion = OpenAiCompletionClient::new(args.to_openai_config())?;
    let cache = JsonFileCache::open(&cli.cache_file)?;

    let mut generator = GeneratorBuilder::new()
        .completion(Arc::new(completion))
        .storage(storage.clone())
        .media(storage)
        .cache(cache)
        .reporter(Arc::new(ConsoleReporter))
        .build()
        .map_err(|e| GenerateError::Configuration(e.to_string()))?;

    generator.generate(&request).await?;
    Ok(())
}

async fn cleanup(cli: &Cli) -> Result<(), GenerateError> {
    let generator = GeneratorBuilder::new()
        .storage(site_storage(cli)?)
        .reporter(Arc::new(ConsoleReporter))
        .build()
        .map_err(|e| GenerateError::Configuration(e.to_string()))?;

    generator.cleanup().await?;
    Ok(())
}

fn show_cache(cli: &Cli, topic: &str) -> Result<(), GenerateError> {
    let cache = JsonFileCache::open(&cli.cache_file)?;

    match cache.get(&topic_hash(topic)) {
        Some(content) => {
            let json = serde_json::to_string_pretty(&content)
                .map_err(|e| GenerateError::Configuration(e.to_string()))?;
            println!("{json}");
        }
        None => ConsoleReporter.warning(&format!("No cached content for topic \"{topic}\".")),
    }
    Ok(())
}
