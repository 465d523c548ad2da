use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use dragon_core::util::format_bytes_approx;
use dragon_scraper::ResponseCache;

use crate::error::CliError;
use crate::settings::Settings;

/// Show how many responses are cached and their size.
pub(crate) fn run_cache_stats(settings: &Settings) -> Result<(), CliError> {
    let cache = ResponseCache::new(&settings.scraper.cache_dir);
    let stats = cache.stats()?;
    if stats.entries == 0 {
        log::info!(
            "{}",
            "No cached responses.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }
    log::info!(
        "{} {} responses, {}",
        cache.dir().display().if_supports_color(Stdout, |t| t.bold()),
        stats.entries,
        format_bytes_approx(stats.total_bytes),
    );
    Ok(())
}

/// Remove all cached responses.
pub(crate) fn run_cache_clear(settings: &Settings) -> Result<(), CliError> {
    let cache = ResponseCache::new(&settings.scraper.cache_dir);
    let freed = cache.clear()?;
    log::info!(
        "{} Cleared response cache ({} freed)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        format_bytes_approx(freed),
    );
    Ok(())
}
