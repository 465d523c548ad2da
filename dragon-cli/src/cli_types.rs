//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use dragon_core::YearMonth;

#[derive(Parser)]
#[command(name = "dragon")]
#[command(about = "Harvest monthly game viewership statistics", long_about = None)]
pub(crate) struct Cli {
    /// Settings file (defaults to ~/.config/dragon/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which games to crawl.
#[derive(Args, Clone)]
#[group(required = true, multiple = false)]
pub(crate) struct GameSource {
    /// A single game, by its catalog name
    #[arg(long)]
    pub game: Option<String>,

    /// JSON file listing games as {name, game_id, company_id} objects
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Crawl monthly statistics and write one document per game
    Crawl {
        #[command(flatten)]
        source: GameSource,

        /// Catalog identifier stored with a single --game
        #[arg(long, requires = "game")]
        game_id: Option<String>,

        /// Only crawl catalog games listed under this company
        #[arg(long, requires = "catalog")]
        company: Option<String>,

        /// Skip games whose document exists and has no error entry
        #[arg(long)]
        skip_existing: bool,

        /// Last month to crawl, YYYY-MM (defaults to the last complete month)
        #[arg(long, value_parser = parse_until)]
        until: Option<YearMonth>,
    },

    /// Fetch one page through the cache and show the extracted values
    Fetch {
        /// Page URL
        url: String,
    },

    /// Show the slug each name maps to
    Normalize {
        /// Catalog names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Upsert all stored documents into the database
    Load {
        /// Document directory (defaults to the configured output directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Inspect or empty the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum CacheAction {
    /// Show entry count and size
    Stats,

    /// Remove all cached responses
    Clear,
}

/// `--until` value; the series starts at [`YearMonth::epoch`], so anything
/// earlier would leave nothing to crawl.
fn parse_until(s: &str) -> Result<YearMonth, String> {
    let month: YearMonth = s.parse().map_err(|e| format!("{e}"))?;
    let first = YearMonth::epoch();
    if month < first {
        return Err(format!("{month} is before the first available month {first}"));
    }
    Ok(month)
}
