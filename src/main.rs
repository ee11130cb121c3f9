//! MangaDex chapter downloader.
//!
//! Code structure:
//! - `base_system`: config/logging/path infrastructure
//! - `mangadex`: API models and the blocking HTTP client
//! - `catalog`: pagination, translation selection, chapter-selection parsing
//! - `download`: bounded page-download pool and progress
//! - `book_builder`: image normalization and PDF assembly
//! - `ui`: the interactive CLI flow

use std::path::Path;

use anyhow::{Result, anyhow};
use clap::Parser;

mod base_system;
mod book_builder;
mod catalog;
mod download;
mod mangadex;
mod ui;

use base_system::config::load_or_create;
use base_system::context::Config;
use base_system::logging::{LogOptions, LogSystem};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "mangadex-downloader")]
#[command(about = "Download MangaDex chapters as PDFs")]
struct Cli {
    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Show version information and exit
    #[arg(long, default_value_t = false)]
    version: bool,

    /// Data directory for config.yml and logs (useful for containers)
    #[arg(long)]
    data_dir: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("mangadex-downloader v{VERSION}");
        return Ok(());
    }

    let data_dir = cli.data_dir.as_deref().map(Path::new);
    let _log = LogSystem::init(
        LogOptions {
            debug: cli.debug,
            console: false,
        },
        data_dir,
    )
    .map_err(|e| anyhow!(e))?;

    let config: Config = load_or_create(data_dir).map_err(|e| anyhow!(e.to_string()))?;
    ui::noui::run(&config)
}
