use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use dragon_db::{DatabaseSettings, fact_stats, load_all};
use dragon_store::DocumentStore;

use crate::error::CliError;
use crate::settings::Settings;

/// Upsert every stored document into the configured database.
pub(crate) fn run_load(settings: &Settings, dir: Option<PathBuf>) -> Result<(), CliError> {
    let db = DatabaseSettings::from_env()?;
    let store = DocumentStore::new(dir.unwrap_or_else(|| settings.store.output_dir.clone()));

    let mut conn = db.connect()?;
    log::info!(
        "Loading {} into {}",
        store.dir().display(),
        db.database_path().display()
    );
    let report = load_all(&store, &mut conn)?;
    let totals = fact_stats(&conn)?;

    log::info!(
        "{} {} records upserted from {} documents",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.records_upserted.if_supports_color(Stdout, |t| t.bold()),
        report.documents_seen - report.documents_skipped,
    );
    if report.documents_skipped > 0 || report.entries_skipped > 0 {
        log::warn!(
            "{} documents and {} entries skipped",
            report.documents_skipped.if_supports_color(Stdout, |t| t.yellow()),
            report.entries_skipped.if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    log::info!(
        "Table now holds {} records for {} games",
        totals.records,
        totals.games
    );
    Ok(())
}
