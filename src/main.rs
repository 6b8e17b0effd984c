//! MangaDex Extension CLI
//!
//! Runs one extension operation and prints its result as JSON.

use mangadex_extension::core::config::{CliArgs, Command};
use mangadex_extension::core::{self, ErrorResponse, ExtensionError};
use mangadex_extension::extension::{
    ChapterOptions, Extension, ExplorerOptions, MangaDexExtension, SearchOptions, SortOrder,
};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load(&cli_args) {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!(base_url = %config.api.base_url, "Configuration loaded");

    let extension = MangaDexExtension::from_config(&config.api)
        .context("Failed to create the MangaDex extension")?;

    info!(
        id = %extension.metadata().id,
        version = %extension.metadata().version,
        "Extension ready"
    );

    match run(&extension, cli_args.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", serde_json::to_string_pretty(&ErrorResponse::from_error(&e))?);
            // Flush pending log lines before exiting
            drop(logger);
            std::process::exit(1);
        }
    }
}

async fn run(extension: &MangaDexExtension, command: Command) -> Result<Value, ExtensionError> {
    let output = match command {
        Command::Search { query, limit, safe, order } => {
            let order = match order {
                Some(spec) => spec.parse::<SortOrder>().map_err(ExtensionError::ConfigError)?,
                None => SortOrder::default(),
            };
            let options = SearchOptions {
                limit,
                mature_content: !safe,
                order,
            };
            serde_json::to_value(extension.search(&query, &options).await?)?
        }
        Command::Explorer { limit, safe } => {
            let options = ExplorerOptions {
                limit,
                mature_content: !safe,
            };
            serde_json::to_value(extension.explorer(&options).await)?
        }
        Command::Info { manga_id } => serde_json::to_value(extension.informations(&manga_id).await?)?,
        Command::Chapters { manga_id, language, page, limit } => {
            let options = ChapterOptions { language, page, limit };
            serde_json::to_value(extension.chapters(&manga_id, &options).await?)?
        }
        Command::Reader { chapter_id } => serde_json::to_value(extension.reader(&chapter_id).await?)?,
        Command::RateLimit => serde_json::json!({ "rateLimited": extension.is_api_rate_limited() }),
    };

    Ok(output)
}
