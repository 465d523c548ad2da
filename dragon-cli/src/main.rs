//! dragon CLI
//!
//! Crawls monthly viewership statistics into per-game JSON documents and
//! loads those documents into a database.

mod cli_types;
mod commands;
mod error;
mod settings;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use cli_types::{CacheAction, Cli, Commands};
use error::CliError;
use settings::Settings;

/// Environment variable holding the log filter, e.g. `debug` or
/// `dragon_scraper=trace`.
const LOG_ENV: &str = "LOGLEVEL";

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli) {
        log::error!(
            "{} {}",
            "\u{2718}".if_supports_color(Stderr, |t| t.red()),
            e
        );
        std::process::exit(e.exit_code());
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "info"))
        .format_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Crawl {
            source,
            game_id,
            company,
            skip_existing,
            until,
        } => commands::crawl::run_crawl(
            &settings,
            commands::crawl::CrawlArgs {
                game: source.game,
                catalog: source.catalog,
                game_id,
                company,
                skip_existing,
                until,
            },
        ),
        Commands::Fetch { url } => commands::fetch::run_fetch(&settings, &url),
        Commands::Normalize { names } => commands::normalize::run_normalize(&settings, &names),
        Commands::Load { dir } => commands::load::run_load(&settings, dir),
        Commands::Cache { action } => match action {
            CacheAction::Stats => commands::cache::run_cache_stats(&settings),
            CacheAction::Clear => commands::cache::run_cache_clear(&settings),
        },
    }
}
