use std::thread;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::error::FetchError;

/// Browser-like User-Agent the analytics site accepts.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/41.0.2228.0 Safari/537.36";

/// Pause after every request that actually went to the network.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(5);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and body of a response as received from the network.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Performs a single GET. Implemented over HTTP in production and by
/// scripted fakes in tests.
pub trait Transport {
    fn get(&self, url: &str) -> Result<RawResponse, FetchError>;
}

/// Blocking reqwest transport with a fixed User-Agent.
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let resp = self.http.get(url).send()?;
        let status = resp.status().as_u16();
        let body = resp.bytes()?.to_vec();
        Ok(RawResponse { status, body })
    }
}

/// A response returned by [`CachedFetcher::fetch`].
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: u16,
    pub body: Vec<u8>,
    pub from_cache: bool,
}

impl Fetched {
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// Hit/miss counters for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub hits: u64,
    pub misses: u64,
}

/// GET through a persistent cache, pacing real network requests.
pub struct CachedFetcher<T: Transport> {
    transport: T,
    cache: ResponseCache,
    delay: Duration,
    stats: FetchStats,
}

impl<T: Transport> CachedFetcher<T> {
    pub fn new(transport: T, cache: ResponseCache) -> Self {
        Self {
            transport,
            cache,
            delay: DEFAULT_REQUEST_DELAY,
            stats: FetchStats::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn stats(&self) -> FetchStats {
        self.stats
    }

    /// Return the body for `url`, from the cache when present.
    ///
    /// A miss is stored whatever its status code and is followed by the
    /// configured delay. Server errors are logged but not raised; the caller
    /// sees them as a page that fails to extract.
    pub fn fetch(&mut self, url: &str) -> Result<Fetched, FetchError> {
        if let Some(cached) = self.cache.get(url)? {
            log::debug!("Cache hit: {url}");
            self.stats.hits += 1;
            return Ok(Fetched {
                status: cached.status,
                body: cached.body,
                from_cache: true,
            });
        }

        log::info!("Fetching {url}");
        let resp = self.transport.get(url)?;
        self.stats.misses += 1;
        self.cache.put(url, resp.status, &resp.body)?;

        if resp.status >= 500 {
            log::warn!("Server error {} for {url}", resp.status);
        }

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        Ok(Fetched {
            status: resp.status,
            body: resp.body,
            from_cache: false,
        })
    }
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
