//! HTTP fetcher for toplist pages
//!
//! This module provides the page fetcher used by every scrape job:
//! - One shared connection pool (`reqwest::Client`)
//! - Retry with exponential backoff driven by a [`RetryPolicy`]
//! - Optional global request-rate cap with governor
//! - User-Agent rotation and browser-like headers

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client,
};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::config::Config;
use crate::crawler::url::ToplistUrlBuilder;
use crate::models::{PageResult, ScrapeJob};
use crate::parser::RecordsTableParser;
use crate::utils::error::FetchError;
use crate::utils::retry::{with_retry_if, RetryError, RetryPolicy};

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Source of toplist pages for the job executor
#[async_trait]
pub trait PageSource: Send + Sync {
    /// URL of a job's page, used for error reporting
    fn page_url(&self, job: &ScrapeJob, page: u32) -> String;

    /// Fetch and parse one page of a job's toplist
    async fn fetch_page(&self, job: &ScrapeJob, page: u32) -> Result<PageResult, FetchError>;
}

/// Toplist page fetcher
///
/// Built once per run and shared by all jobs behind an `Arc`.
pub struct ToplistFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Page URL construction
    urls: ToplistUrlBuilder,

    /// Retry behaviour for every request
    policy: RetryPolicy,

    /// Optional cap on total request frequency
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,

    /// End of the date window (`YYYY-MM-DD`), fixed for the whole run
    last_day: String,

    parser: RecordsTableParser,
}

impl ToplistFetcher {
    /// Create a fetcher from the run configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created and
    /// `FetchError::InvalidUrl` if the base URL is invalid
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Self::with_config(
            &config.scraper.base_url,
            config.retry.clone(),
            config.request_timeout(),
            config.scraper.rate_limit,
            config.scraper.accept_invalid_certs,
        )
    }

    /// Create a fetcher with explicit settings
    ///
    /// # Arguments
    ///
    /// * `base_url` - Site root the toplist paths are appended to
    /// * `policy` - Retry policy applied to every page request
    /// * `timeout` - Per-request timeout
    /// * `requests_per_second` - Global request cap, 0 for none
    /// * `accept_invalid_certs` - Skip TLS certificate verification
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        base_url: &str,
        policy: RetryPolicy,
        timeout: Duration,
        requests_per_second: u32,
        accept_invalid_certs: bool,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        let rate_limiter = NonZeroU32::new(requests_per_second)
            .map(|rate| RateLimiter::direct(Quota::per_second(rate)));

        Ok(Self {
            client,
            urls: ToplistUrlBuilder::new(base_url)?,
            policy,
            rate_limiter,
            last_day: chrono::Local::now().format("%Y-%m-%d").to_string(),
            parser: RecordsTableParser::new(),
        })
    }

    /// Override the end of the date window
    #[must_use]
    pub fn with_last_day(mut self, last_day: impl Into<String>) -> Self {
        self.last_day = last_day.into();
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch a page body with retry logic and rate limiting
    ///
    /// # Errors
    ///
    /// Returns `FetchError::RetriesExhausted` when every attempt failed with a
    /// retryable error, or the first non-retryable error
    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let retryable = &self.policy.retryable_statuses;

        with_retry_if(
            &self.policy,
            || self.fetch_once(url),
            |e: &FetchError| e.is_retryable(retryable),
        )
        .await
        .map_err(|e| match e {
            RetryError::Exhausted { attempts, last } => FetchError::RetriesExhausted {
                attempts,
                last: Box::new(last),
            },
            RetryError::Aborted(e) => e,
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        tracing::trace!(url = %url, "Fetching URL");

        let response = self
            .client
            .get(url)
            .headers(self.build_headers())
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(Self::classify)
    }

    fn classify(err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Http(err)
        }
    }

    /// Build browser-like request headers
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(self.random_user_agent()));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        headers
    }

    /// Get a random user agent from the pool
    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
    }
}

#[async_trait]
impl PageSource for ToplistFetcher {
    fn page_url(&self, job: &ScrapeJob, page: u32) -> String {
        self.urls.page_url(job, page, &self.last_day)
    }

    async fn fetch_page(&self, job: &ScrapeJob, page: u32) -> Result<PageResult, FetchError> {
        let url = self.page_url(job, page);
        let html = self.fetch_html(&url).await?;
        Ok(self.parser.parse_page(&html, job))
    }
}
