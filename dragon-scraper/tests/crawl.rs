use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use dragon_core::{CatalogGame, PARSE_ERROR, YearMonth};
use dragon_scraper::{
    CachedFetcher, CrawlError, CrawlOutcome, Crawler, FetchError, Normalizer, OverrideTable,
    RawResponse, ResponseCache, Transport,
};
use dragon_store::{DocumentStore, StoreError};
use tempfile::TempDir;

const BASE: &str = "https://stats.test";

fn page(viewers: u64, peak: u64, channels: u64) -> Vec<u8> {
    let card = |label: &str, value: u64| {
        format!("<div><div><div><div>{label}</div><div><div>{value}</div></div></div></div></div>")
    };
    format!(
        "<html><head></head><body><div>nav</div><div><div>header</div><div>\
         <div></div><div></div><div></div>\
         <div><div><div>a</div><div>b</div>{}{}{}</div></div>\
         </div></div></body></html>",
        card("Average viewers", viewers),
        card("Peak viewers", peak),
        card("Average channels", channels),
    )
    .into_bytes()
}

/// Serves scripted responses by URL; unknown URLs get a page of zeros.
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, (u16, Vec<u8>)>,
    offline: Vec<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeSite {
    fn with(mut self, url: String, status: u16, body: Vec<u8>) -> Self {
        self.pages.insert(url, (status, body));
        self
    }

    fn offline_at(mut self, url: String) -> Self {
        self.offline.push(url);
        self
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for FakeSite {
    fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        self.calls.borrow_mut().push(url.to_string());
        if self.offline.iter().any(|u| u == url) {
            return Err(FetchError::transport("connection reset"));
        }
        let (status, body) = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| (200, page(100, 200, 3)));
        Ok(RawResponse { status, body })
    }
}

fn url(slug: &str, y: i32, m: u32) -> String {
    format!(
        "{BASE}/game/{slug}/{}",
        YearMonth::new(y, m).unwrap().url_segment()
    )
}

fn crawler(site: FakeSite, tmp: &TempDir, today: NaiveDate) -> Crawler<FakeSite> {
    let fetcher = CachedFetcher::new(site, ResponseCache::new(tmp.path().join("cache")))
        .with_delay(Duration::ZERO);
    Crawler::new(
        fetcher,
        Normalizer::new(OverrideTable::empty()),
        DocumentStore::new(tmp.path().join("output/games")),
    )
    .base_url(BASE)
    .today(today)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn crawls_every_complete_month() {
    let tmp = TempDir::new().unwrap();
    let mut c = crawler(FakeSite::default(), &tmp, date(2016, 1, 1));
    let game = CatalogGame::named("Rocket League").with_game_id("30921");

    let outcome = c.crawl_game(&game, false).unwrap();
    // 2015-08 through 2015-11; December 1st is not before the 2015-12-01 cutoff.
    assert_eq!(outcome, CrawlOutcome::Complete { months: 4 });

    let doc = c.store().read("Rocket_League").unwrap().unwrap();
    assert_eq!(doc.meta.source_name, "Rocket League");
    assert_eq!(doc.meta.game_id.as_deref(), Some("30921"));
    assert_eq!(doc.entries.len(), 4);
    assert_eq!(doc.entries[0].date.to_string(), "2015-08");
    assert_eq!(doc.entries[3].date.to_string(), "2015-11");
    assert!(doc.is_complete());
    assert_eq!(c.fetcher().transport().call_count(), 4);
}

#[test]
fn requests_the_month_url_scheme() {
    let tmp = TempDir::new().unwrap();
    let mut c = crawler(FakeSite::default(), &tmp, date(2015, 10, 1));
    c.crawl_game(&CatalogGame::named("Dota 2"), false).unwrap();
    let calls = c.fetcher().transport().calls.borrow().clone();
    assert_eq!(calls, vec![format!("{BASE}/game/Dota_2/2015august")]);
}

#[test]
fn aborts_at_first_unparseable_month() {
    let tmp = TempDir::new().unwrap();
    let site = FakeSite::default().with(url("Doom", 2015, 9), 200, b"<html><body></body></html>".to_vec());
    let mut c = crawler(site, &tmp, date(2016, 6, 1));

    let outcome = c.crawl_game(&CatalogGame::named("Doom"), false).unwrap();
    match outcome {
        CrawlOutcome::Aborted { months, failed_at, .. } => {
            assert_eq!(months, 1);
            assert_eq!(failed_at, YearMonth::new(2015, 9).unwrap());
        }
        other => panic!("expected abort, got {other:?}"),
    }
    assert_eq!(c.fetcher().transport().call_count(), 2);

    let doc = c.store().read("Doom").unwrap().unwrap();
    assert_eq!(doc.entries.len(), 2);
    let last = doc.entries.last().unwrap();
    assert_eq!(last.error(), Some(PARSE_ERROR));
    assert!(doc.entries[..1].iter().all(|e| !e.is_error()));
}

#[test]
fn server_error_is_recorded_as_parse_error() {
    let tmp = TempDir::new().unwrap();
    let site = FakeSite::default().with(url("Doom", 2015, 8), 503, b"Service Unavailable".to_vec());
    let mut c = crawler(site, &tmp, date(2016, 6, 1));

    let outcome = c.crawl_game(&CatalogGame::named("Doom"), false).unwrap();
    assert!(matches!(outcome, CrawlOutcome::Aborted { months: 0, .. }));

    let text = std::fs::read_to_string(tmp.path().join("output/games/Doom.json")).unwrap();
    assert!(text.contains("\"error\": \"HTML Parse Error\""));
    assert!(c.fetcher().cache().stats().unwrap().entries == 1);
}

#[test]
fn recorded_values_come_from_the_page() {
    let tmp = TempDir::new().unwrap();
    let site = FakeSite::default().with(url("Doom", 2015, 8), 200, page(12345, 20000, 87));
    let mut c = crawler(site, &tmp, date(2015, 10, 1));
    c.crawl_game(&CatalogGame::named("Doom"), false).unwrap();

    let text = std::fs::read_to_string(tmp.path().join("output/games/Doom.json")).unwrap();
    assert!(text.contains("\"average_viewers\": 12345"));
    assert!(text.contains("\"average_channels\": 87"));
    assert!(text.contains("\"peak_viewers\": 20000"));
}

#[test]
fn skip_existing_complete_document_makes_no_requests() {
    let tmp = TempDir::new().unwrap();
    let game = CatalogGame::named("Rocket League");

    let mut first = crawler(FakeSite::default(), &tmp, date(2016, 1, 1));
    first.crawl_game(&game, true).unwrap();

    let mut second = crawler(FakeSite::default(), &tmp, date(2016, 1, 1));
    assert_eq!(second.crawl_game(&game, true).unwrap(), CrawlOutcome::Skipped);
    assert_eq!(second.fetcher().transport().call_count(), 0);
}

#[test]
fn skip_existing_recrawls_aborted_document() {
    let tmp = TempDir::new().unwrap();
    let broken = FakeSite::default().with(url("Doom", 2015, 9), 200, Vec::new());
    let mut first = crawler(broken, &tmp, date(2016, 1, 1));
    first.crawl_game(&CatalogGame::named("Doom"), true).unwrap();

    // The bad page is cached, so clear it to simulate the site recovering.
    first.fetcher().cache().clear().unwrap();

    let mut second = crawler(FakeSite::default(), &tmp, date(2016, 1, 1));
    let outcome = second.crawl_game(&CatalogGame::named("Doom"), true).unwrap();
    assert_eq!(outcome, CrawlOutcome::Complete { months: 4 });
    assert!(second.store().read("Doom").unwrap().unwrap().is_complete());
}

#[test]
fn skip_existing_recrawls_malformed_document() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("output/games");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("Doom.json"), "{ not json").unwrap();

    let mut c = crawler(FakeSite::default(), &tmp, date(2015, 10, 1));
    let outcome = c.crawl_game(&CatalogGame::named("Doom"), true).unwrap();
    assert_eq!(outcome, CrawlOutcome::Complete { months: 1 });
}

#[test]
fn second_run_is_served_from_cache() {
    let tmp = TempDir::new().unwrap();
    let game = CatalogGame::named("Rocket League");

    let mut first = crawler(FakeSite::default(), &tmp, date(2016, 1, 1));
    first.crawl_game(&game, false).unwrap();

    let mut second = crawler(FakeSite::default(), &tmp, date(2016, 1, 1));
    second.crawl_game(&game, false).unwrap();
    assert_eq!(second.fetcher().transport().call_count(), 0);
    assert_eq!(second.fetcher().stats().hits, 4);
}

#[test]
fn network_error_aborts_without_writing() {
    let tmp = TempDir::new().unwrap();
    let site = FakeSite::default().offline_at(url("Doom", 2015, 10));
    let mut c = crawler(site, &tmp, date(2016, 6, 1));

    assert!(c.crawl_game(&CatalogGame::named("Doom"), false).is_err());
    assert!(c.store().read("Doom").unwrap().is_none());
}

#[test]
fn overrides_choose_the_slug() {
    let tmp = TempDir::new().unwrap();
    let fetcher = CachedFetcher::new(FakeSite::default(), ResponseCache::new(tmp.path().join("cache")))
        .with_delay(Duration::ZERO);
    let mut c = Crawler::new(
        fetcher,
        Normalizer::new(OverrideTable::from_pairs([("PUBG", "PLAYERUNKNOWNS_BATTLEGROUNDS")])),
        DocumentStore::new(tmp.path().join("out")),
    )
    .base_url(BASE)
    .today(date(2015, 10, 1));

    c.crawl_game(&CatalogGame::named("PUBG"), false).unwrap();
    let doc = c.store().read("PLAYERUNKNOWNS_BATTLEGROUNDS").unwrap().unwrap();
    assert_eq!(doc.meta.source_name, "PUBG");
    assert_eq!(doc.meta.canonical_name, "PLAYERUNKNOWNS_BATTLEGROUNDS");
}

#[test]
fn until_bounds_the_range_inclusively() {
    let tmp = TempDir::new().unwrap();
    let mut c = crawler(FakeSite::default(), &tmp, date(2020, 1, 1))
        .until(YearMonth::new(2015, 10).unwrap());
    let outcome = c.crawl_game(&CatalogGame::named("Doom"), false).unwrap();
    assert_eq!(outcome, CrawlOutcome::Complete { months: 3 });
}

#[test]
fn until_past_today_is_clamped_to_complete_months() {
    let tmp = TempDir::new().unwrap();
    let last = YearMonth::new(2016, 3).unwrap();
    let today = date(2016, 1, 15);

    for c in [
        crawler(FakeSite::default(), &tmp, today).until(last),
        crawler(FakeSite::default(), &tmp, today).until(last).today(today),
    ] {
        let months: Vec<_> = c.months().collect();
        assert_eq!(months.len(), 5);
        assert_eq!(months.last().unwrap().to_string(), "2015-12");
    }

    let mut c = crawler(FakeSite::default(), &tmp, today).until(last);
    c.crawl_game(&CatalogGame::named("Doom"), false).unwrap();
    let calls = c.fetcher().transport().calls.borrow().clone();
    assert!(!calls.contains(&url("Doom", 2016, 1)));
    assert_eq!(calls.last(), Some(&url("Doom", 2015, 12)));
}

#[test]
fn until_before_first_month_is_refused_without_writing() {
    let tmp = TempDir::new().unwrap();
    let mut c = crawler(FakeSite::default(), &tmp, date(2020, 1, 1))
        .until(YearMonth::new(2015, 7).unwrap());
    assert_eq!(c.months().count(), 0);

    let err = c.crawl_game(&CatalogGame::named("Doom"), false).unwrap_err();
    assert!(matches!(err, CrawlError::NoMonths { .. }));
    assert_eq!(c.fetcher().transport().call_count(), 0);
    assert!(c.store().read("Doom").unwrap().is_none());
}

#[test]
fn empty_slug_fails_before_any_request() {
    let tmp = TempDir::new().unwrap();
    let mut c = crawler(FakeSite::default(), &tmp, date(2016, 1, 1));

    let err = c.crawl_game(&CatalogGame::named("?!"), false).unwrap_err();
    assert!(matches!(err, CrawlError::Store(StoreError::InvalidSlug(_))));
    assert_eq!(c.fetcher().transport().call_count(), 0);
}

#[test]
fn non_latin_name_crawls_under_a_transliterated_slug() {
    let tmp = TempDir::new().unwrap();
    let mut c = crawler(FakeSite::default(), &tmp, date(2015, 10, 1));

    c.crawl_game(&CatalogGame::named("Мор. Утопия"), false).unwrap();
    let calls = c.fetcher().transport().calls.borrow().clone();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].is_ascii());
    assert!(calls[0].starts_with(&format!("{BASE}/game/Mor._Utopi")), "{}", calls[0]);
    assert!(!calls[0].contains("//2015"));
}
