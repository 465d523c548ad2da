//! Month-by-month harvesting of one game's viewership series.

use chrono::{Local, NaiveDate};
use dragon_core::{
    CatalogGame, GameDocument, GameMeta, MonthRange, MonthlyEntry, PARSE_ERROR, YearMonth,
    crawl_cutoff,
};
use dragon_store::DocumentStore;

use crate::error::CrawlError;
use crate::extract::{PageLocators, read_metrics};
use crate::fetch::{CachedFetcher, Transport};
use crate::normalize::Normalizer;

/// Analytics site root.
pub const DEFAULT_BASE_URL: &str = "https://sullygnome.com";

/// What happened to one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// An error-free document already existed; nothing was fetched.
    Skipped,
    /// Every month in range was recorded.
    Complete { months: usize },
    /// Extraction failed at `failed_at`; `months` entries were recorded
    /// before it.
    Aborted {
        months: usize,
        failed_at: YearMonth,
        reason: String,
    },
}

pub struct Crawler<T: Transport> {
    fetcher: CachedFetcher<T>,
    normalizer: Normalizer,
    store: DocumentStore,
    locators: PageLocators,
    base_url: String,
    today: NaiveDate,
    until: Option<YearMonth>,
}

impl<T: Transport> Crawler<T> {
    pub fn new(fetcher: CachedFetcher<T>, normalizer: Normalizer, store: DocumentStore) -> Self {
        Self {
            fetcher,
            normalizer,
            store,
            locators: PageLocators::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            today: Local::now().date_naive(),
            until: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn locators(mut self, locators: PageLocators) -> Self {
        self.locators = locators;
        self
    }

    /// Crawl as if the current date were `today`.
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Stop after `last`, inclusive. Never extends past the last complete
    /// month for the crawler's `today`.
    pub fn until(mut self, last: YearMonth) -> Self {
        self.until = Some(last);
        self
    }

    /// Exclusive bound on the first day of crawled months.
    fn cutoff(&self) -> NaiveDate {
        let complete = crawl_cutoff(self.today);
        match self.until.and_then(|last| last.next()) {
            Some(after) => complete.min(after.first_day()),
            None => complete,
        }
    }

    pub fn fetcher(&self) -> &CachedFetcher<T> {
        &self.fetcher
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Months this crawler visits, oldest first.
    pub fn months(&self) -> MonthRange {
        MonthRange::new(YearMonth::epoch(), self.cutoff())
    }

    /// Page URL for `slug` in `month`, e.g. `.../game/Rocket_League/2021march`.
    pub fn month_url(&self, slug: &str, month: YearMonth) -> String {
        format!("{}/game/{slug}/{}", self.base_url, month.url_segment())
    }

    /// Crawl every month for `game` and write its document.
    ///
    /// A network error returns `Err` before anything is written. Extraction
    /// failures do not: the failing month is recorded as an error entry, the
    /// crawl stops there, and the partial document is written.
    pub fn crawl_game(
        &mut self,
        game: &CatalogGame,
        skip_existing: bool,
    ) -> Result<CrawlOutcome, CrawlError> {
        let slug = self.normalizer.normalize(&game.name);
        self.store.path_for(&slug)?;

        let epoch = YearMonth::epoch();
        if self.cutoff() <= epoch.first_day() {
            return Err(CrawlError::NoMonths {
                first: epoch,
                cutoff: self.cutoff(),
            });
        }

        if skip_existing {
            match self.store.read(&slug) {
                Ok(Some(doc)) if doc.is_complete() => {
                    log::info!("{}: complete document exists, skipping", game.name);
                    return Ok(CrawlOutcome::Skipped);
                }
                Ok(_) => {}
                Err(e) => log::warn!("{}: existing document unusable, recrawling: {e}", game.name),
            }
        }

        let mut doc = GameDocument::new(GameMeta {
            source_name: game.name.clone(),
            canonical_name: slug.clone(),
            game_id: game.game_id.clone(),
        });
        let mut failure = None;

        for month in self.months() {
            let url = self.month_url(&slug, month);
            let page = self.fetcher.fetch(&url)?;

            match read_metrics(&page.body, &self.locators) {
                Ok(metrics) => doc.entries.push(MonthlyEntry::recorded(month, metrics)),
                Err(e) => {
                    if page.is_server_error() {
                        log::error!("{} {month}: server returned {}", game.name, page.status);
                    } else {
                        log::error!("{} {month}: {e}", game.name);
                    }
                    doc.entries.push(MonthlyEntry::failed(month, PARSE_ERROR));
                    failure = Some((month, e.to_string()));
                    break;
                }
            }
        }

        let path = self.store.write(&slug, &doc)?;
        log::info!("{}: wrote {}", game.name, path.display());

        Ok(match failure {
            None => CrawlOutcome::Complete {
                months: doc.entries.len(),
            },
            Some((failed_at, reason)) => CrawlOutcome::Aborted {
                months: doc.entries.len() - 1,
                failed_at,
                reason,
            },
        })
    }
}
