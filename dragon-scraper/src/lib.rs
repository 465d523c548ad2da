//! Harvesting monthly viewership figures from the analytics site.
//!
//! The pipeline for one game is: [`Normalizer`] turns the catalog name into a
//! site slug, [`Crawler`] walks the months, [`CachedFetcher`] retrieves each
//! page through the on-disk [`ResponseCache`], and [`read_metrics`] pulls the
//! three figures out of the page.

pub mod cache;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;

pub use cache::{CacheStats, DEFAULT_CACHE_DIR, ResponseCache};
pub use crawl::{CrawlOutcome, Crawler, DEFAULT_BASE_URL};
pub use error::{CrawlError, FetchError, OverrideError};
pub use extract::{
    Locator, LocatorError, MetricFailure, Missing, PageLocators, extract, parse_page,
    read_metrics,
};
pub use fetch::{
    CachedFetcher, DEFAULT_REQUEST_DELAY, DEFAULT_USER_AGENT, FetchStats, Fetched,
    HttpTransport, RawResponse, Transport,
};
pub use normalize::{Normalizer, OverrideTable, slugify};
