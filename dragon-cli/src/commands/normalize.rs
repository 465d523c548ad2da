use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use dragon_scraper::Normalizer;

use crate::error::CliError;
use crate::settings::Settings;

/// Print the slug for each name.
pub(crate) fn run_normalize(settings: &Settings, names: &[String]) -> Result<(), CliError> {
    let overrides = settings.normalizer.load_overrides()?;
    let normalizer = Normalizer::new(overrides);
    for name in names {
        let slug = normalizer.normalize(name);
        let marker = if normalizer.overrides().get(name).is_some() {
            " (override)"
        } else {
            ""
        };
        println!(
            "{name} -> {}{}",
            slug.if_supports_color(Stdout, |t| t.bold()),
            marker.if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}
