use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use dragon_scraper::{extract, parse_page};

use crate::commands::crawl::build_fetcher;
use crate::error::CliError;
use crate::settings::Settings;

/// Fetch one page and print each located value, or why it is missing.
pub(crate) fn run_fetch(settings: &Settings, url: &str) -> Result<(), CliError> {
    let locators = settings.locators.page_locators()?;
    let mut fetcher = build_fetcher(settings)?;
    let page = fetcher.fetch(url)?;

    println!(
        "{} {} ({} bytes{})",
        "Status:".if_supports_color(Stdout, |t| t.bold()),
        page.status,
        page.body.len(),
        if page.from_cache { ", cached" } else { "" },
    );

    let Some(doc) = parse_page(&page.body) else {
        println!(
            "{}",
            "Body could not be parsed as HTML".if_supports_color(Stdout, |t| t.red())
        );
        return Ok(());
    };

    for (label, locator) in [
        ("average_viewers", &locators.viewers),
        ("average_channels", &locators.channels),
        ("peak_viewers", &locators.peak),
    ] {
        match extract(&doc, locator) {
            Ok(value) => println!(
                "  {label:<17} {}",
                value.if_supports_color(Stdout, |t| t.green())
            ),
            Err(reason) => println!(
                "  {label:<17} {} ({locator})",
                reason.if_supports_color(Stdout, |t| t.red())
            ),
        }
    }
    Ok(())
}
