use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use dragon_core::{CatalogGame, YearMonth, filter_by_company};
use dragon_scraper::{
    CachedFetcher, CrawlOutcome, Crawler, HttpTransport, Normalizer, ResponseCache,
};
use dragon_store::DocumentStore;

use crate::error::CliError;
use crate::settings::Settings;

pub(crate) struct CrawlArgs {
    pub game: Option<String>,
    pub catalog: Option<PathBuf>,
    pub game_id: Option<String>,
    pub company: Option<String>,
    pub skip_existing: bool,
    pub until: Option<YearMonth>,
}

#[derive(Debug, Default)]
struct Tally {
    complete: usize,
    aborted: usize,
    skipped: usize,
    failed: usize,
}

/// HTTP fetcher over the configured cache, paced by the configured delay.
pub(crate) fn build_fetcher(
    settings: &Settings,
) -> Result<CachedFetcher<HttpTransport>, CliError> {
    let transport = HttpTransport::new(&settings.scraper.user_agent)?;
    let cache = ResponseCache::new(&settings.scraper.cache_dir);
    Ok(CachedFetcher::new(transport, cache).with_delay(settings.scraper.request_delay()?))
}

/// Read a catalog file: a JSON array of `{name, game_id?, company_id?}`.
pub(crate) fn read_catalog(path: &Path) -> Result<Vec<CatalogGame>, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::catalog(path, e))?;
    serde_json::from_str(&contents).map_err(|e| CliError::catalog(path, e))
}

pub(crate) fn run_crawl(settings: &Settings, args: CrawlArgs) -> Result<(), CliError> {
    // A bad override table must stop the run before any request is made.
    let overrides = settings.normalizer.load_overrides()?;
    let locators = settings.locators.page_locators()?;

    let games = match (&args.game, &args.catalog) {
        (Some(name), _) => {
            let mut game = CatalogGame::named(name);
            game.game_id = args.game_id.clone();
            vec![game]
        }
        (None, Some(path)) => {
            let all = read_catalog(path)?;
            let total = all.len();
            let games = filter_by_company(all, args.company.as_deref());
            if let Some(company) = &args.company {
                log::info!("{} of {total} catalog games belong to company {company}", games.len());
            }
            games
        }
        (None, None) => Vec::new(),
    };

    if games.is_empty() {
        log::warn!("No games to crawl");
        return Ok(());
    }

    let mut crawler = Crawler::new(
        build_fetcher(settings)?,
        Normalizer::new(overrides),
        DocumentStore::new(&settings.store.output_dir),
    )
    .base_url(&settings.scraper.base_url)
    .locators(locators);
    if let Some(until) = args.until {
        crawler = crawler.until(until);
    }

    let pb = if games.len() > 1 {
        let pb = ProgressBar::new(games.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("  [{bar:30.cyan/dim}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb.enable_steady_tick(Duration::from_millis(200));
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut tally = Tally::default();
    for game in &games {
        pb.set_message(game.name.clone());
        match crawler.crawl_game(game, args.skip_existing) {
            Ok(CrawlOutcome::Complete { months }) => {
                tally.complete += 1;
                pb.suspend(|| {
                    log::info!(
                        "{} {} ({months} months)",
                        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                        game.name,
                    )
                });
            }
            Ok(CrawlOutcome::Aborted {
                months,
                failed_at,
                reason,
            }) => {
                tally.aborted += 1;
                pb.suspend(|| {
                    log::warn!(
                        "{} {} stopped at {failed_at} after {months} months: {reason}",
                        "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                        game.name,
                    )
                });
            }
            Ok(CrawlOutcome::Skipped) => tally.skipped += 1,
            Err(e) => {
                tally.failed += 1;
                pb.suspend(|| {
                    log::error!(
                        "{} {}: {e}",
                        "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                        game.name,
                    )
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let stats = crawler.fetcher().stats();
    log::info!(
        "{} complete, {} aborted, {} skipped, {} failed ({} fetched, {} from cache)",
        tally.complete.if_supports_color(Stdout, |t| t.green()),
        tally.aborted.if_supports_color(Stdout, |t| t.yellow()),
        tally.skipped.if_supports_color(Stdout, |t| t.dimmed()),
        tally.failed.if_supports_color(Stdout, |t| t.red()),
        stats.misses,
        stats.hits,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_file_accepts_numeric_ids() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"name": "Doom", "game_id": 77, "company_id": "3"},
                {"name": "Quake"}]"#,
        )
        .unwrap();
        let games = read_catalog(&path).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_id.as_deref(), Some("77"));
        assert!(games[1].company_id.is_none());
    }

    #[test]
    fn catalog_file_must_be_a_list() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(&path, r#"{"name": "Doom"}"#).unwrap();
        assert!(matches!(read_catalog(&path), Err(CliError::Catalog(_))));
    }
}
